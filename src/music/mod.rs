// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory model.
//!
//! This module provides the static key table (scales, diatonic palettes and
//! harmonic functions), the triad table, and note normalization utilities.

pub mod chord;
pub mod note;
pub mod scale;

pub use chord::{chord, chord_contains, chord_notes, Chord, Quality};
pub use note::{enharmonic_equivalent, strip_octave};
pub use scale::{fifths_distance, is_relative, Function, KeyId, Mode};
