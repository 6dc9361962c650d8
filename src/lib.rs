// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! VIBE - melodic key inference and chord suggestion.
//!
//! A melody (a list of spelled note tokens such as `"C4"` or `"F#"`) is
//! mapped to the keys it most likely belongs to, either with a
//! degree-weighted scoring heuristic or with a hidden Markov model decoded
//! by Viterbi. For each note, the chord engine then ranks the diatonic
//! chords of its key by harmonic relevance.
//!
//! ```
//! use vibe::{analyze_melody, AnalysisConfig, KeyId};
//!
//! let analysis = analyze_melody(&["C4", "E4", "G4"], None, &AnalysisConfig::default());
//! assert_eq!(analysis.chosen_key, KeyId::CMajor);
//! assert_eq!(analysis.suggestions[0].chord_options[0].name, "C");
//! ```

pub mod config;
pub mod detect;
pub mod error;
pub mod harmony;
pub mod music;

pub use config::AnalysisConfig;
pub use detect::{
    detect_keys_hmm, detect_keys_scoring, Algorithm, HmmDetector, KeyCandidate, KeyDetection,
    KeyDetector, Precision, Score, ScoringDetector,
};
pub use error::{TheoryError, TheoryResult};
pub use harmony::{
    analyze_melody, suggest_chords, suggest_chords_by_name, ChordOption, MelodyAnalysis,
    NoteAnalysis, Priority, Suggestion, SuggestionReason,
};
pub use music::{Chord, Function, KeyId, Mode, Quality};
