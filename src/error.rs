// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for parsing keys, algorithms and settings at the crate boundary.
//!
//! The theory functions themselves never fail: unknown notes, chords or keys
//! degrade to empty results.

use thiserror::Error;

/// Errors raised when external input names something outside the closed vocabulary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TheoryError {
    /// Key name not in the 24-key table
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Detection algorithm selector not recognized
    #[error("Unknown algorithm: {0} (expected \"scoring\" or \"hmm\")")]
    UnknownAlgorithm(String),

    /// Viterbi precision selector not recognized
    #[error("Unknown precision: {0} (expected \"linear\" or \"log\")")]
    UnknownPrecision(String),

    /// Window sizes must be positive
    #[error("Window size must be positive, got {0}")]
    InvalidWindow(usize),
}

/// Result type for boundary parsing
pub type TheoryResult<T> = Result<T, TheoryError>;
