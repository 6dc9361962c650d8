// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note token normalization and enharmonic matching.
//!
//! Melody notes arrive as spelled tokens such as `"C4"`, `"F#"` or `"Db5"`.
//! Every theory operation works on the spelling alone, so the octave digits
//! are stripped first. Spellings are never rewritten for display; the
//! enharmonic table is only consulted when matching a note against a scale
//! or a chord.

/// Sharp spellings of the 12 pitch classes, indexed by chromatic position (C = 0)
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Registered enharmonic partners. Each spelling appears at most once, so
/// the lookup is an involution.
const ENHARMONIC_PAIRS: [(&str, &str); 9] = [
    ("C#", "Db"),
    ("D#", "Eb"),
    ("E#", "F"),
    ("Fb", "E"),
    ("F#", "Gb"),
    ("G#", "Ab"),
    ("A#", "Bb"),
    ("B#", "C"),
    ("Cb", "B"),
];

/// Remove trailing octave digits from a note token (`"C4"` -> `"C"`)
pub fn strip_octave(token: &str) -> &str {
    token.trim().trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Get the enharmonic partner of a note, or the note itself when it has none
///
/// ```
/// use vibe::music::note::enharmonic_equivalent;
///
/// assert_eq!(enharmonic_equivalent("C#"), "Db");
/// assert_eq!(enharmonic_equivalent("E#4"), "F");
/// assert_eq!(enharmonic_equivalent("F##"), "F##");
/// ```
pub fn enharmonic_equivalent(note: &str) -> &str {
    let note = strip_octave(note);
    ENHARMONIC_PAIRS
        .iter()
        .find_map(|&(a, b)| {
            if a == note {
                Some(b)
            } else if b == note {
                Some(a)
            } else {
                None
            }
        })
        .unwrap_or(note)
}

/// Find a note within a list of spellings.
///
/// The exact spelling is searched across the whole list first; only when it
/// is absent is the enharmonic partner tried.
pub fn position_in(note: &str, notes: &[&str]) -> Option<usize> {
    let note = strip_octave(note);
    if note.is_empty() {
        return None;
    }

    notes.iter().position(|&n| n == note).or_else(|| {
        let equivalent = enharmonic_equivalent(note);
        if equivalent == note {
            None
        } else {
            notes.iter().position(|&n| n == equivalent)
        }
    })
}

/// Check whether a note (or its enharmonic partner) is in a list of spellings
pub fn contains_note(notes: &[&str], note: &str) -> bool {
    position_in(note, notes).is_some()
}

/// Chromatic index (0 = C) of a note token, if its spelling resolves
pub fn pitch_class_index(token: &str) -> Option<usize> {
    position_in(token, &PITCH_CLASSES)
}

/// Chromatic index used as an HMM observation.
///
/// Tokens that do not resolve to one of the 12 pitch classes (double sharps,
/// typos) are observed as C rather than rejected.
pub fn observation_index(token: &str) -> usize {
    pitch_class_index(token).unwrap_or_else(|| {
        tracing::warn!(token, "unresolvable note token, observing it as C");
        0
    })
}
