// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The 24 keys and their diatonic vocabulary.
//!
//! Each key carries its spelled 7-note scale, the 7 triads built on those
//! degrees and the harmonic function of every degree. The tables are static
//! and never change at runtime. Spellings keep double sharps (`F##`, `C##`)
//! so that every scale uses each letter exactly once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::note::position_in;
use crate::error::TheoryError;

/// Number of keys in the table
pub const KEY_COUNT: usize = 24;

/// Number of degrees in a diatonic scale
pub const DEGREES: usize = 7;

/// Circle of fifths as chromatic indices: C, G, D, A, E, B, F#, C#, G#, D#, A#, F
const CIRCLE_OF_FIFTHS: [usize; 12] = [0, 7, 2, 9, 4, 11, 6, 1, 8, 3, 10, 5];

/// Key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    NaturalMinor,
}

impl Mode {
    /// Mode word used in key names
    pub fn name(self) -> &'static str {
        match self {
            Mode::Major => "Majeur",
            Mode::NaturalMinor => "Mineur",
        }
    }

    /// Harmonic function of each degree (index 0 = degree 1)
    pub fn functions(self) -> &'static [Function; DEGREES] {
        match self {
            Mode::Major => &MAJOR_FUNCTIONS,
            Mode::NaturalMinor => &MINOR_FUNCTIONS,
        }
    }

    /// The other mode
    pub fn opposite(self) -> Self {
        match self {
            Mode::Major => Mode::NaturalMinor,
            Mode::NaturalMinor => Mode::Major,
        }
    }
}

/// Harmonic function of a scale degree or chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Tonic,
    Subdominant,
    Dominant,
}

impl Function {
    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Function::Tonic => "Tonic",
            Function::Subdominant => "Subdominant",
            Function::Dominant => "Dominant",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

const MAJOR_FUNCTIONS: [Function; DEGREES] = [
    Function::Tonic,
    Function::Subdominant,
    Function::Tonic,
    Function::Subdominant,
    Function::Dominant,
    Function::Tonic,
    Function::Dominant,
];

// Degree 6 is subdominant in minor (VI leans towards iv)
const MINOR_FUNCTIONS: [Function; DEGREES] = [
    Function::Tonic,
    Function::Subdominant,
    Function::Tonic,
    Function::Subdominant,
    Function::Dominant,
    Function::Subdominant,
    Function::Dominant,
];

/// Static description of one key
#[derive(Debug)]
pub struct KeyInfo {
    /// Display name, e.g. "Sol Majeur"
    pub name: &'static str,
    /// Chromatic index of the tonic (0 = C)
    pub tonic: usize,
    pub mode: Mode,
    /// Spelled scale, degree 1 first
    pub scale: [&'static str; DEGREES],
    /// Diatonic triads aligned with `scale`
    pub palette: [&'static str; DEGREES],
}

const fn key(
    name: &'static str,
    tonic: usize,
    mode: Mode,
    scale: [&'static str; DEGREES],
    palette: [&'static str; DEGREES],
) -> KeyInfo {
    KeyInfo {
        name,
        tonic,
        mode,
        scale,
        palette,
    }
}

use Mode::{Major, NaturalMinor};

/// Key table. Order matters: it is the tie-break order for every ranking.
#[rustfmt::skip]
static KEYS: [KeyInfo; KEY_COUNT] = [
    // Major: I ii iii IV V vi vii°
    key("Do Majeur", 0, Major,
        ["C", "D", "E", "F", "G", "A", "B"],
        ["C", "Dm", "Em", "F", "G", "Am", "Bdim"]),
    key("Do# Majeur", 1, Major,
        ["C#", "D#", "E#", "F#", "G#", "A#", "B#"],
        ["C#", "D#m", "E#m", "F#", "G#", "A#m", "B#dim"]),
    key("Ré Majeur", 2, Major,
        ["D", "E", "F#", "G", "A", "B", "C#"],
        ["D", "Em", "F#m", "G", "A", "Bm", "C#dim"]),
    key("Ré# Majeur", 3, Major,
        ["D#", "E#", "F##", "G#", "A#", "B#", "C##"],
        ["D#", "E#m", "F##m", "G#", "A#", "B#m", "C##dim"]),
    key("Mi Majeur", 4, Major,
        ["E", "F#", "G#", "A", "B", "C#", "D#"],
        ["E", "F#m", "G#m", "A", "B", "C#m", "D#dim"]),
    key("Fa Majeur", 5, Major,
        ["F", "G", "A", "Bb", "C", "D", "E"],
        ["F", "Gm", "Am", "Bb", "C", "Dm", "Edim"]),
    key("Fa# Majeur", 6, Major,
        ["F#", "G#", "A#", "B", "C#", "D#", "E#"],
        ["F#", "G#m", "A#m", "B", "C#", "D#m", "E#dim"]),
    key("Sol Majeur", 7, Major,
        ["G", "A", "B", "C", "D", "E", "F#"],
        ["G", "Am", "Bm", "C", "D", "Em", "F#dim"]),
    key("Sol# Majeur", 8, Major,
        ["G#", "A#", "B#", "C#", "D#", "E#", "F##"],
        ["G#", "A#m", "B#m", "C#", "D#", "E#m", "F##dim"]),
    key("La Majeur", 9, Major,
        ["A", "B", "C#", "D", "E", "F#", "G#"],
        ["A", "Bm", "C#m", "D", "E", "F#m", "G#dim"]),
    key("La# Majeur", 10, Major,
        ["A#", "B#", "C##", "D#", "E#", "F##", "G##"],
        ["A#", "B#m", "C##m", "D#", "E#", "F##m", "G##dim"]),
    key("Si Majeur", 11, Major,
        ["B", "C#", "D#", "E", "F#", "G#", "A#"],
        ["B", "C#m", "D#m", "E", "F#", "G#m", "A#dim"]),
    // Natural minor: i ii° III iv v VI VII
    key("Do Mineur", 0, NaturalMinor,
        ["C", "D", "Eb", "F", "G", "Ab", "Bb"],
        ["Cm", "Ddim", "Eb", "Fm", "Gm", "Ab", "Bb"]),
    key("Do# Mineur", 1, NaturalMinor,
        ["C#", "D#", "E", "F#", "G#", "A", "B"],
        ["C#m", "D#dim", "E", "F#m", "G#m", "A", "B"]),
    key("Ré Mineur", 2, NaturalMinor,
        ["D", "E", "F", "G", "A", "Bb", "C"],
        ["Dm", "Edim", "F", "Gm", "Am", "Bb", "C"]),
    key("Ré# Mineur", 3, NaturalMinor,
        ["D#", "E#", "F#", "G#", "A#", "B", "C#"],
        ["D#m", "E#dim", "F#", "G#m", "A#m", "B", "C#"]),
    key("Mi Mineur", 4, NaturalMinor,
        ["E", "F#", "G", "A", "B", "C", "D"],
        ["Em", "F#dim", "G", "Am", "Bm", "C", "D"]),
    key("Fa Mineur", 5, NaturalMinor,
        ["F", "G", "Ab", "Bb", "C", "Db", "Eb"],
        ["Fm", "Gdim", "Ab", "Bbm", "Cm", "Db", "Eb"]),
    key("Fa# Mineur", 6, NaturalMinor,
        ["F#", "G#", "A", "B", "C#", "D", "E"],
        ["F#m", "G#dim", "A", "Bm", "C#m", "D", "E"]),
    key("Sol Mineur", 7, NaturalMinor,
        ["G", "A", "Bb", "C", "D", "Eb", "F"],
        ["Gm", "Adim", "Bb", "Cm", "Dm", "Eb", "F"]),
    key("Sol# Mineur", 8, NaturalMinor,
        ["G#", "A#", "B", "C#", "D#", "E", "F#"],
        ["G#m", "A#dim", "B", "C#m", "D#m", "E", "F#"]),
    key("La Mineur", 9, NaturalMinor,
        ["A", "B", "C", "D", "E", "F", "G"],
        ["Am", "Bdim", "C", "Dm", "Em", "F", "G"]),
    key("La# Mineur", 10, NaturalMinor,
        ["A#", "B#", "C#", "D#", "E#", "F#", "G#"],
        ["A#m", "B#dim", "C#", "D#m", "E#m", "F#", "G#"]),
    key("Si Mineur", 11, NaturalMinor,
        ["B", "C#", "D", "E", "F#", "G", "A"],
        ["Bm", "C#dim", "D", "Em", "F#m", "G", "A"]),
];

/// One of the 24 keys, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyId {
    CMajor,
    CSharpMajor,
    DMajor,
    DSharpMajor,
    EMajor,
    FMajor,
    FSharpMajor,
    GMajor,
    GSharpMajor,
    AMajor,
    ASharpMajor,
    BMajor,
    CMinor,
    CSharpMinor,
    DMinor,
    DSharpMinor,
    EMinor,
    FMinor,
    FSharpMinor,
    GMinor,
    GSharpMinor,
    AMinor,
    ASharpMinor,
    BMinor,
}

impl KeyId {
    /// All keys in table order
    pub const ALL: [KeyId; KEY_COUNT] = [
        KeyId::CMajor,
        KeyId::CSharpMajor,
        KeyId::DMajor,
        KeyId::DSharpMajor,
        KeyId::EMajor,
        KeyId::FMajor,
        KeyId::FSharpMajor,
        KeyId::GMajor,
        KeyId::GSharpMajor,
        KeyId::AMajor,
        KeyId::ASharpMajor,
        KeyId::BMajor,
        KeyId::CMinor,
        KeyId::CSharpMinor,
        KeyId::DMinor,
        KeyId::DSharpMinor,
        KeyId::EMinor,
        KeyId::FMinor,
        KeyId::FSharpMinor,
        KeyId::GMinor,
        KeyId::GSharpMinor,
        KeyId::AMinor,
        KeyId::ASharpMinor,
        KeyId::BMinor,
    ];

    /// Position in the key table
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key at a table position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Key with the given tonic (chromatic index) and mode
    pub fn from_parts(tonic: usize, mode: Mode) -> Self {
        let offset = match mode {
            Mode::Major => 0,
            Mode::NaturalMinor => 12,
        };
        Self::ALL[offset + tonic % 12]
    }

    /// Static table entry for this key
    pub fn info(self) -> &'static KeyInfo {
        &KEYS[self.index()]
    }

    /// Display name, e.g. "La Mineur"
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Chromatic index of the tonic
    pub fn tonic(self) -> usize {
        self.info().tonic
    }

    pub fn mode(self) -> Mode {
        self.info().mode
    }

    pub fn scale(self) -> &'static [&'static str] {
        &self.info().scale
    }

    pub fn palette(self) -> &'static [&'static str] {
        &self.info().palette
    }

    /// Scale degree (1-based) of a note, matching enharmonics
    pub fn degree_of(self, note: &str) -> Option<usize> {
        position_in(note, self.scale()).map(|i| i + 1)
    }

    /// Palette degree (1-based) of a chord, by exact name
    pub fn degree_of_chord(self, chord: &str) -> Option<usize> {
        self.palette().iter().position(|&c| c == chord).map(|i| i + 1)
    }

    /// Chord built on a scale degree (1-based)
    pub fn chord_at(self, degree: usize) -> Option<&'static str> {
        if degree == 0 {
            return None;
        }
        self.palette().get(degree - 1).copied()
    }

    /// Harmonic function of a scale degree (1-based)
    pub fn function(self, degree: usize) -> Option<Function> {
        if degree == 0 {
            return None;
        }
        self.mode().functions().get(degree - 1).copied()
    }

    /// Palette chords with a given function, as (degree, chord) in degree order
    pub fn chords_with_function(
        self,
        function: Function,
    ) -> impl Iterator<Item = (usize, &'static str)> {
        let functions = self.mode().functions();
        self.palette()
            .iter()
            .enumerate()
            .filter(move |(i, _)| functions[*i] == function)
            .map(|(i, &chord)| (i + 1, chord))
    }

    /// Relative key (C major <-> A minor)
    pub fn relative(self) -> Self {
        match self.mode() {
            Mode::Major => Self::from_parts(self.tonic() + 9, Mode::NaturalMinor),
            Mode::NaturalMinor => Self::from_parts(self.tonic() + 3, Mode::Major),
        }
    }

    /// Parallel key (C major <-> C minor)
    pub fn parallel(self) -> Self {
        Self::from_parts(self.tonic(), self.mode().opposite())
    }

    /// Key a fifth above, same mode
    pub fn dominant(self) -> Self {
        Self::from_parts(self.tonic() + 7, self.mode())
    }

    /// Key a fifth below, same mode
    pub fn subdominant(self) -> Self {
        Self::from_parts(self.tonic() + 5, self.mode())
    }
}

impl Default for KeyId {
    fn default() -> Self {
        KeyId::CMajor
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Fold case and the accent of "Ré" so "re majeur" matches "Ré Majeur"
fn fold_key_name(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace('é', "e")
}

impl FromStr for KeyId {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = fold_key_name(s);
        KeyId::ALL
            .iter()
            .copied()
            .find(|k| fold_key_name(k.name()) == wanted)
            .ok_or_else(|| TheoryError::UnknownKey(s.trim().to_string()))
    }
}

impl Serialize for KeyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for KeyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Steps between two tonics on the circle of fifths (0..=6)
pub fn fifths_distance(a: usize, b: usize) -> usize {
    let pos_a = CIRCLE_OF_FIFTHS.iter().position(|&pc| pc == a % 12).unwrap_or(0);
    let pos_b = CIRCLE_OF_FIFTHS.iter().position(|&pc| pc == b % 12).unwrap_or(0);
    let dist = pos_a.abs_diff(pos_b);
    dist.min(12 - dist)
}

/// Check whether two keys are relative major/minor of each other
pub fn is_relative(a: KeyId, b: KeyId) -> bool {
    a.mode() != b.mode() && a.relative() == b
}
