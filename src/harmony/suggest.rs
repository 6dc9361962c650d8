// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Priority-ranked chord suggestions for a single melody note.

use std::fmt;

use serde::Serialize;

use crate::music::{chord_contains, Function, KeyId};

/// How relevant a suggestion is; lower ranks come first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Chord built on the note's own scale degree
    Degree = 1,
    /// Another chord with the same harmonic function
    SameFunction = 2,
    /// Tonic chord resolving a preceding dominant
    Resolution = 3,
    /// Any other palette chord holding the note
    Compatible = 4,
}

impl Priority {
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// Why a chord was suggested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionReason {
    ScaleDegree { degree: usize, function: Function },
    SharedFunction(Function),
    Resolution,
    ContainsNote,
    OffScale,
}

impl fmt::Display for SuggestionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionReason::ScaleDegree { degree, function } => {
                write!(f, "chord of scale degree {} ({})", degree, function)
            }
            SuggestionReason::SharedFunction(function) => {
                write!(f, "another {} chord", function)
            }
            SuggestionReason::Resolution => write!(f, "resolution from Dominant to Tonic"),
            SuggestionReason::ContainsNote => write!(f, "contains this note"),
            SuggestionReason::OffScale => write!(f, "off-scale note contained in this chord"),
        }
    }
}

/// A suggested chord for one note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub chord: &'static str,
    pub priority: Priority,
    pub reason: SuggestionReason,
}

/// Suggestions in insertion order, each chord kept once at its first priority
#[derive(Default)]
struct SuggestionList(Vec<Suggestion>);

impl SuggestionList {
    fn push(&mut self, chord: &'static str, priority: Priority, reason: SuggestionReason) {
        if self.0.iter().all(|s| s.chord != chord) {
            self.0.push(Suggestion {
                chord,
                priority,
                reason,
            });
        }
    }

    fn into_sorted(mut self) -> Vec<Suggestion> {
        self.0.sort_by_key(|s| s.priority);
        self.0
    }
}

/// Suggest chords for a note in a key.
///
/// Results are ordered by priority:
/// 1. the chord on the note's scale degree;
/// 2. other chords sharing that degree's function;
/// 3. tonic chords holding the note, when `previous` is a dominant chord of the key;
/// 4. any remaining palette chord holding the note.
///
/// A note outside the scale only gets the palette chords that hold it. A
/// previous chord outside the palette is ignored.
pub fn suggest_chords(note: &str, key: KeyId, previous: Option<&str>) -> Vec<Suggestion> {
    let mut list = SuggestionList::default();

    let Some(degree) = key.degree_of(note) else {
        for &chord in key.palette() {
            if chord_contains(chord, note) {
                list.push(chord, Priority::Compatible, SuggestionReason::OffScale);
            }
        }
        tracing::trace!(note, key = %key, found = list.0.len(), "off-scale note");
        return list.into_sorted();
    };

    // degree_of only returns 1..=7, which always has a chord and function
    if let (Some(chord), Some(function)) = (key.chord_at(degree), key.function(degree)) {
        list.push(
            chord,
            Priority::Degree,
            SuggestionReason::ScaleDegree { degree, function },
        );

        for (_, other) in key.chords_with_function(function) {
            list.push(
                other,
                Priority::SameFunction,
                SuggestionReason::SharedFunction(function),
            );
        }
    }

    let follows_dominant = previous
        .and_then(|prev| key.degree_of_chord(prev))
        .and_then(|d| key.function(d))
        == Some(Function::Dominant);
    if follows_dominant {
        for (_, tonic) in key.chords_with_function(Function::Tonic) {
            if chord_contains(tonic, note) {
                list.push(tonic, Priority::Resolution, SuggestionReason::Resolution);
            }
        }
    }

    for &chord in key.palette() {
        if chord_contains(chord, note) {
            list.push(chord, Priority::Compatible, SuggestionReason::ContainsNote);
        }
    }

    list.into_sorted()
}

/// Like [`suggest_chords`], with the key given by display name.
/// An unknown key name yields no suggestions.
pub fn suggest_chords_by_name(
    note: &str,
    key_name: &str,
    previous: Option<&str>,
) -> Vec<Suggestion> {
    match key_name.parse::<KeyId>() {
        Ok(key) => suggest_chords(note, key, previous),
        Err(e) => {
            tracing::debug!(error = %e, "no suggestions");
            Vec::new()
        }
    }
}
