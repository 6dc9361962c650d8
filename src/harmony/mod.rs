// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord suggestion engine and melody analysis.

pub mod analysis;
pub mod suggest;

pub use analysis::{analyze_melody, ChordOption, MelodyAnalysis, NoteAnalysis};
pub use suggest::{suggest_chords, suggest_chords_by_name, Priority, Suggestion, SuggestionReason};
