// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Key detection strategies.
//!
//! Two detectors share one contract: given a melody, assign a key to every
//! note and rank global key candidates. The scoring detector re-evaluates a
//! degree-weighted heuristic on each prefix; the HMM detector decodes the
//! whole melody with Viterbi.

pub mod hmm;
pub mod scoring;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;
use crate::music::KeyId;

pub use hmm::{detect_keys_hmm, DecodedStep, HmmDetector, HmmModel, Precision};
pub use scoring::{detect_keys_scoring, ScoringDetector};

/// Number of key candidates reported by the detectors
pub const TOP_KEYS: usize = 3;

/// Score attached to a key candidate; its meaning depends on the detector.
/// Serializes as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Score {
    /// Degree-weighted points from the scoring heuristic
    Points(u32),
    /// Number of notes decoded to this key
    Count(u32),
    /// Natural log of a Viterbi path probability
    LogProbability(f64),
}

impl Score {
    /// Numeric value, for comparisons across candidates of the same kind
    pub fn value(&self) -> f64 {
        match *self {
            Score::Points(p) => p as f64,
            Score::Count(c) => c as f64,
            Score::LogProbability(lp) => lp,
        }
    }
}

/// A ranked key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyCandidate {
    pub key: KeyId,
    pub score: Score,
}

impl KeyCandidate {
    pub fn new(key: KeyId, score: Score) -> Self {
        Self { key, score }
    }
}

/// Key assigned to one note of a melody
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoteKey {
    /// Detected key, if the detector produced one
    pub key: Option<KeyId>,
    /// Locally ranked alternatives, best first. For the HMM these are the
    /// most probable states of the trellis column at this note, which need
    /// not start with the key on the decoded path.
    pub candidates: Vec<KeyCandidate>,
}

/// Result of running a detector over a melody
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyDetection {
    /// One entry per input note
    pub per_note: Vec<NoteKey>,
    /// Melody-wide candidates, best first
    pub candidates: Vec<KeyCandidate>,
}

impl KeyDetection {
    /// Best melody-wide key
    pub fn best(&self) -> Option<KeyId> {
        self.candidates.first().map(|c| c.key)
    }
}

/// Trait for key detection strategies
pub trait KeyDetector: Send + Sync {
    /// Assign a key to each note and rank melody-wide candidates.
    ///
    /// `window` restricts each local evaluation to the trailing `window`
    /// notes; every evaluation is a fresh pass over its slice.
    fn detect(&self, notes: &[&str], window: Option<usize>) -> KeyDetection;

    /// Strategy name
    fn name(&self) -> &'static str;
}

/// Detection algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Scoring,
    #[default]
    Hmm,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Scoring => "scoring",
            Algorithm::Hmm => "hmm",
        }
    }

    /// Build the detector for this algorithm
    pub fn detector(self, precision: Precision) -> Box<dyn KeyDetector> {
        match self {
            Algorithm::Scoring => Box::new(ScoringDetector::new()),
            Algorithm::Hmm => Box::new(HmmDetector::new(precision)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scoring" => Ok(Algorithm::Scoring),
            "hmm" => Ok(Algorithm::Hmm),
            _ => Err(TheoryError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Restrict notes to the trailing window, if one is given
pub(crate) fn trailing_window<'a, T>(notes: &'a [T], window: Option<usize>) -> &'a [T] {
    match window {
        Some(n) if n > 0 && n < notes.len() => &notes[notes.len() - n..],
        _ => notes,
    }
}

/// Rank keys by descending score, keeping table order among ties
pub(crate) fn rank_descending<S: Copy + PartialOrd>(scores: &mut [(KeyId, S)]) {
    // sort_by is stable, so equal scores stay in key-table order
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}
