// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Whole-melody analysis: key detection followed by per-note suggestions.

use serde::Serialize;

use super::suggest::{suggest_chords, Suggestion};
use crate::config::AnalysisConfig;
use crate::detect::{Algorithm, KeyCandidate};
use crate::music::{chord_notes, KeyId, Quality};

/// A suggested chord with its notes, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordOption {
    pub name: &'static str,
    pub notes: Vec<&'static str>,
    pub quality: Quality,
    pub reason: String,
}

impl From<&Suggestion> for ChordOption {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            name: suggestion.chord,
            notes: chord_notes(suggestion.chord).to_vec(),
            quality: Quality::from_name(suggestion.chord),
            reason: suggestion.reason.to_string(),
        }
    }
}

/// Analysis of one melody note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteAnalysis {
    /// Note token as given
    pub note: String,
    pub chord_options: Vec<ChordOption>,
    /// Key the suggestions were computed in
    pub detected_key: KeyId,
    /// Local alternatives at this note. With the HMM these are the best
    /// states of the Viterbi trellis column, not the decoded path, so the
    /// first one can differ from `detected_key`.
    pub key_candidates: Vec<KeyCandidate>,
}

/// Analysis of a whole melody
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MelodyAnalysis {
    pub detected_keys: Vec<KeyCandidate>,
    pub chosen_key: KeyId,
    pub suggestions: Vec<NoteAnalysis>,
}

/// Detect keys for a melody and suggest chords for each note.
///
/// An explicit `chosen_key` is used for every note's suggestions; detected
/// keys are still reported. Each note's top suggestion becomes the previous
/// chord for the next note. An empty melody yields an empty analysis in the
/// default key.
pub fn analyze_melody<S: AsRef<str>>(
    melody: &[S],
    chosen_key: Option<KeyId>,
    config: &AnalysisConfig,
) -> MelodyAnalysis {
    let notes: Vec<&str> = melody.iter().map(|n| n.as_ref()).collect();

    let detector = config.algorithm.detector(config.precision);
    let window = match config.algorithm {
        Algorithm::Scoring => Some(config.window_size),
        Algorithm::Hmm => None,
    };
    let detection = detector.detect(&notes, window);

    let fallback = detection.best().unwrap_or_else(|| {
        tracing::debug!(key = %config.default_key, "no key detected, using default");
        config.default_key
    });

    tracing::debug!(
        notes = notes.len(),
        algorithm = detector.name(),
        chosen = ?chosen_key,
        detected = %fallback,
        "analyzing melody"
    );

    let mut previous: Option<&'static str> = None;
    let suggestions = notes
        .iter()
        .zip(detection.per_note)
        .map(|(&note, local)| {
            let key = chosen_key.or(local.key).unwrap_or(fallback);
            let ranked = suggest_chords(note, key, previous);
            if let Some(top) = ranked.first() {
                previous = Some(top.chord);
            }

            NoteAnalysis {
                note: note.to_string(),
                chord_options: ranked
                    .iter()
                    .take(config.chord_options)
                    .map(ChordOption::from)
                    .collect(),
                detected_key: key,
                key_candidates: local.candidates,
            }
        })
        .collect();

    MelodyAnalysis {
        chosen_key: chosen_key.unwrap_or(fallback),
        detected_keys: detection.candidates,
        suggestions,
    }
}
