// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Triad table: every chord that appears in a key palette, with its notes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::note::contains_note;

/// Triad quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Major,
    Minor,
    Diminished,
}

impl Quality {
    /// Derive the quality from a chord name suffix ("Bdim", "F#m", "Eb")
    pub fn from_name(name: &str) -> Self {
        if name.ends_with("dim") {
            Quality::Diminished
        } else if name.ends_with('m') {
            Quality::Minor
        } else {
            Quality::Major
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Quality::Major => "major",
            Quality::Minor => "minor",
            Quality::Diminished => "diminished",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named triad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub name: &'static str,
    /// Root, third, fifth
    pub notes: [&'static str; 3],
}

impl Chord {
    pub fn quality(&self) -> Quality {
        Quality::from_name(self.name)
    }

    /// Check whether the chord holds a note, matching enharmonics
    pub fn contains(&self, note: &str) -> bool {
        contains_note(&self.notes, note)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

const fn triad(name: &'static str, notes: [&'static str; 3]) -> Chord {
    Chord { name, notes }
}

static CHORDS: [Chord; 51] = [
    // Major
    triad("C", ["C", "E", "G"]),
    triad("C#", ["C#", "E#", "G#"]),
    triad("D", ["D", "F#", "A"]),
    triad("D#", ["D#", "F##", "A#"]),
    triad("E", ["E", "G#", "B"]),
    triad("E#", ["E#", "G##", "B#"]),
    triad("F", ["F", "A", "C"]),
    triad("F#", ["F#", "A#", "C#"]),
    triad("G", ["G", "B", "D"]),
    triad("G#", ["G#", "B#", "D#"]),
    triad("A", ["A", "C#", "E"]),
    triad("A#", ["A#", "C##", "E#"]),
    triad("B", ["B", "D#", "F#"]),
    triad("Bb", ["Bb", "D", "F"]),
    triad("Eb", ["Eb", "G", "Bb"]),
    triad("Ab", ["Ab", "C", "Eb"]),
    triad("Db", ["Db", "F", "Ab"]),
    // Minor
    triad("Cm", ["C", "Eb", "G"]),
    triad("C#m", ["C#", "E", "G#"]),
    triad("Dm", ["D", "F", "A"]),
    triad("D#m", ["D#", "F#", "A#"]),
    triad("Em", ["E", "G", "B"]),
    triad("E#m", ["E#", "G#", "B#"]),
    triad("Fm", ["F", "Ab", "C"]),
    triad("F#m", ["F#", "A", "C#"]),
    triad("F##m", ["F##", "A#", "C##"]),
    triad("Gm", ["G", "Bb", "D"]),
    triad("G#m", ["G#", "B", "D#"]),
    triad("Am", ["A", "C", "E"]),
    triad("A#m", ["A#", "C#", "E#"]),
    triad("Bm", ["B", "D", "F#"]),
    triad("B#m", ["B#", "D#", "F##"]),
    triad("Bbm", ["Bb", "Db", "F"]),
    triad("Ebm", ["Eb", "Gb", "Bb"]),
    triad("Abm", ["Ab", "Cb", "Eb"]),
    triad("C##m", ["C##", "E#", "G##"]),
    // Diminished
    triad("Bdim", ["B", "D", "F"]),
    triad("B#dim", ["B#", "D#", "F#"]),
    triad("C#dim", ["C#", "E", "G"]),
    triad("C##dim", ["C##", "E#", "G#"]),
    triad("Ddim", ["D", "F", "Ab"]),
    triad("D#dim", ["D#", "F#", "A"]),
    triad("Edim", ["E", "G", "Bb"]),
    triad("E#dim", ["E#", "G#", "B"]),
    triad("F#dim", ["F#", "A", "C"]),
    triad("F##dim", ["F##", "A#", "C#"]),
    triad("Gdim", ["G", "Bb", "Db"]),
    triad("G#dim", ["G#", "B", "D"]),
    triad("G##dim", ["G##", "B#", "D#"]),
    triad("Adim", ["A", "C", "Eb"]),
    triad("A#dim", ["A#", "C#", "E"]),
];

/// Look up a chord by exact name
pub fn chord(name: &str) -> Option<&'static Chord> {
    CHORDS.iter().find(|c| c.name == name)
}

/// Notes of a chord, empty when the name is unknown
pub fn chord_notes(name: &str) -> &'static [&'static str] {
    chord(name).map(|c| &c.notes[..]).unwrap_or(&[])
}

/// Check whether a named chord holds a note; unknown chords hold nothing
pub fn chord_contains(name: &str, note: &str) -> bool {
    chord(name).is_some_and(|c| c.contains(note))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::scale::KeyId;

    #[test]
    fn test_quality_from_name() {
        assert_eq!(Quality::from_name("C"), Quality::Major);
        assert_eq!(Quality::from_name("Bb"), Quality::Major);
        assert_eq!(Quality::from_name("F#m"), Quality::Minor);
        assert_eq!(Quality::from_name("F##m"), Quality::Minor);
        assert_eq!(Quality::from_name("Bdim"), Quality::Diminished);
        assert_eq!(Quality::from_name("C##dim"), Quality::Diminished);
    }

    #[test]
    fn test_names_are_unique() {
        for (i, a) in CHORDS.iter().enumerate() {
            for b in &CHORDS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_every_palette_chord_is_known() {
        for key in KeyId::ALL {
            for name in key.palette() {
                assert!(chord(name).is_some(), "{} missing ({})", name, key);
            }
        }
    }

    #[test]
    fn test_palette_chords_are_built_from_their_scale() {
        for key in KeyId::ALL {
            for name in key.palette() {
                let c = chord(name).unwrap();
                for note in c.notes {
                    assert!(key.degree_of(note).is_some(), "{} of {} not in {}", note, name, key);
                }
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(chord_notes("Am"), &["A", "C", "E"]);
        assert!(chord_notes("Cmaj7").is_empty());
        assert_eq!(chord("G").unwrap().notes[0], "G");
        assert_eq!(chord("Edim").unwrap().quality(), Quality::Diminished);
    }

    #[test]
    fn test_contains_with_enharmonics() {
        assert!(chord_contains("A", "C#"));
        assert!(chord_contains("A", "Db4"));
        assert!(chord_contains("Db", "C#"));
        assert!(chord_contains("C#", "F"));
        assert!(!chord_contains("C", "C#"));
        assert!(!chord_contains("Cmaj7", "C"));
    }
}
