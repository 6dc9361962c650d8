// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Hidden Markov model key tracking.
//!
//! Hidden states are the 24 keys, observations the 12 pitch classes. The
//! transition matrix strongly favours staying in the same key and otherwise
//! prefers nearby keys on the circle of fifths. The emission matrix weights
//! the tonic, dominant and leading tone above the other scale degrees and
//! leaves a small floor for chromatic notes. Viterbi finds the most probable
//! key for every note.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::{
    rank_descending, trailing_window, KeyCandidate, KeyDetection, KeyDetector, NoteKey, Score,
    TOP_KEYS,
};
use crate::error::TheoryError;
use crate::music::note::{observation_index, strip_octave, PITCH_CLASSES};
use crate::music::scale::KEY_COUNT;
use crate::music::{fifths_distance, is_relative, KeyId};

/// Number of observable pitch classes
pub const OBSERVATIONS: usize = 12;

const SELF_TRANSITION: f64 = 0.90;
const RELATIVE_TRANSITION: f64 = 0.02;
const FIFTH_TRANSITION: f64 = 0.03;
const SECOND_FIFTH_TRANSITION: f64 = 0.005;
const TRITONE_TRANSITION: f64 = 0.0001;
const DISTANT_TRANSITION: f64 = 0.001;

const OFF_SCALE_EMISSION: f64 = 0.01;
const TONIC_EMISSION: f64 = 0.25;
const DOMINANT_EMISSION: f64 = 0.20;
const LEADING_TONE_EMISSION: f64 = 0.15;
const SCALE_EMISSION: f64 = 0.10;

/// Built on first use and shared by every detector
static MODEL: LazyLock<HmmModel> = LazyLock::new(HmmModel::build);

/// Transition, emission and initial probabilities
#[derive(Debug, Clone)]
pub struct HmmModel {
    transition: [[f64; KEY_COUNT]; KEY_COUNT],
    emission: [[f64; OBSERVATIONS]; KEY_COUNT],
    initial: [f64; KEY_COUNT],
}

impl HmmModel {
    /// Build the model from the key table
    pub fn build() -> Self {
        let mut transition = [[0.0; KEY_COUNT]; KEY_COUNT];
        for from in KeyId::ALL {
            let row = &mut transition[from.index()];
            for to in KeyId::ALL {
                row[to.index()] = transition_weight(from, to);
            }
            normalize(row);
        }

        let mut emission = [[0.0; OBSERVATIONS]; KEY_COUNT];
        for key in KeyId::ALL {
            let row = &mut emission[key.index()];
            for (observation, pitch) in PITCH_CLASSES.iter().enumerate() {
                row[observation] = emission_weight(key.degree_of(pitch));
            }
            normalize(row);
        }

        Self {
            transition,
            emission,
            initial: [1.0 / KEY_COUNT as f64; KEY_COUNT],
        }
    }

    /// Process-wide model
    pub fn shared() -> &'static HmmModel {
        &MODEL
    }

    pub fn transition(&self, from: KeyId, to: KeyId) -> f64 {
        self.transition[from.index()][to.index()]
    }

    /// Probability of observing a pitch class (0 = C) in a key
    pub fn emission(&self, key: KeyId, observation: usize) -> f64 {
        self.emission[key.index()]
            .get(observation)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn initial(&self, key: KeyId) -> f64 {
        self.initial[key.index()]
    }

    pub fn transition_row(&self, from: KeyId) -> &[f64; KEY_COUNT] {
        &self.transition[from.index()]
    }

    pub fn emission_row(&self, key: KeyId) -> &[f64; OBSERVATIONS] {
        &self.emission[key.index()]
    }
}

fn transition_weight(from: KeyId, to: KeyId) -> f64 {
    if from == to {
        return SELF_TRANSITION;
    }
    if is_relative(from, to) {
        return RELATIVE_TRANSITION;
    }
    match fifths_distance(from.tonic(), to.tonic()) {
        1 => FIFTH_TRANSITION,
        2 => SECOND_FIFTH_TRANSITION,
        6 => TRITONE_TRANSITION,
        _ => DISTANT_TRANSITION,
    }
}

fn emission_weight(degree: Option<usize>) -> f64 {
    match degree {
        None => OFF_SCALE_EMISSION,
        Some(1) => TONIC_EMISSION,
        Some(5) => DOMINANT_EMISSION,
        Some(7) => LEADING_TONE_EMISSION,
        Some(_) => SCALE_EMISSION,
    }
}

fn normalize<const N: usize>(row: &mut [f64; N]) {
    let total: f64 = row.iter().sum();
    if total > 0.0 {
        row.iter_mut().for_each(|p| *p /= total);
    }
}

/// Arithmetic used by the Viterbi recursion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Raw probability products; underflows on melodies of a few hundred notes
    #[default]
    Linear,
    /// Sums of log-probabilities
    Log,
}

impl Precision {
    pub fn name(self) -> &'static str {
        match self {
            Precision::Linear => "linear",
            Precision::Log => "log",
        }
    }

    fn lift(self, p: f64) -> f64 {
        match self {
            Precision::Linear => p,
            Precision::Log => p.ln(),
        }
    }

    fn combine(self, a: f64, b: f64, c: f64) -> f64 {
        match self {
            Precision::Linear => a * b * c,
            Precision::Log => a + b + c,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Precision {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(Precision::Linear),
            "log" => Ok(Precision::Log),
            _ => Err(TheoryError::UnknownPrecision(s.to_string())),
        }
    }
}

/// Key decoded for one note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedStep {
    pub key: KeyId,
    /// Viterbi probability of the best path ending in `key` at this note
    pub probability: f64,
}

impl DecodedStep {
    /// Natural log of the probability; zero maps to negative infinity
    pub fn log_probability(&self) -> f64 {
        if self.probability > 0.0 {
            self.probability.ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// First maximum, so ties resolve in key-table order
fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
        .0
}

/// Viterbi scores and back-pointers for one observation sequence
struct Trellis {
    precision: Precision,
    delta: Vec<[f64; KEY_COUNT]>,
    psi: Vec<[usize; KEY_COUNT]>,
}

impl Trellis {
    fn run(model: &HmmModel, observations: &[usize], precision: Precision) -> Self {
        let mut delta = Vec::with_capacity(observations.len());
        let mut psi = Vec::with_capacity(observations.len());

        let Some((&first, rest)) = observations.split_first() else {
            return Self {
                precision,
                delta,
                psi,
            };
        };

        let mut column = [0.0; KEY_COUNT];
        for key in KeyId::ALL {
            column[key.index()] = precision.combine(
                precision.lift(model.initial(key)),
                precision.lift(model.emission(key, first)),
                precision.lift(1.0),
            );
        }
        delta.push(column);
        psi.push([0; KEY_COUNT]);

        for &observation in rest {
            let previous = delta[delta.len() - 1];
            let mut column = [0.0; KEY_COUNT];
            let mut pointers = [0; KEY_COUNT];

            for to in KeyId::ALL {
                let emitted = precision.lift(model.emission(to, observation));
                let mut candidates = [0.0; KEY_COUNT];
                for from in KeyId::ALL {
                    candidates[from.index()] = precision.combine(
                        previous[from.index()],
                        precision.lift(model.transition(from, to)),
                        emitted,
                    );
                }
                let best = argmax(&candidates);
                column[to.index()] = candidates[best];
                pointers[to.index()] = best;
            }

            delta.push(column);
            psi.push(pointers);
        }

        Self {
            precision,
            delta,
            psi,
        }
    }

    fn len(&self) -> usize {
        self.delta.len()
    }

    /// Most probable state sequence
    fn path(&self) -> Vec<usize> {
        let Some(last) = self.delta.last() else {
            return Vec::new();
        };

        let mut state = argmax(last);
        let mut path = vec![state; self.len()];
        for t in (1..self.len()).rev() {
            state = self.psi[t][state];
            path[t - 1] = state;
        }
        path
    }

    fn probability(&self, t: usize, state: usize) -> f64 {
        let value = self.delta[t][state];
        match self.precision {
            Precision::Linear => value,
            Precision::Log => value.exp(),
        }
    }

    fn log_probability(&self, t: usize, state: usize) -> f64 {
        let value = self.delta[t][state];
        match self.precision {
            Precision::Linear if value > 0.0 => value.ln(),
            Precision::Linear => f64::NEG_INFINITY,
            Precision::Log => value,
        }
    }

    fn steps(&self) -> Vec<DecodedStep> {
        self.path()
            .into_iter()
            .enumerate()
            .map(|(t, state)| DecodedStep {
                key: KeyId::ALL[state],
                probability: self.probability(t, state),
            })
            .collect()
    }

    /// Most probable keys at one note, scored by log-probability
    fn ranked(&self, t: usize) -> Vec<KeyCandidate> {
        let mut column: Vec<(KeyId, f64)> = KeyId::ALL
            .iter()
            .map(|&key| (key, self.log_probability(t, key.index())))
            .collect();
        rank_descending(&mut column);
        column
            .into_iter()
            .take(TOP_KEYS)
            .map(|(key, lp)| KeyCandidate::new(key, Score::LogProbability(lp)))
            .collect()
    }
}

/// Rank keys by how many notes were decoded to them
pub fn frequency_candidates(path: &[KeyId]) -> Vec<KeyCandidate> {
    let mut counts = [0u32; KEY_COUNT];
    for key in path {
        counts[key.index()] += 1;
    }

    let mut ranked: Vec<(KeyId, u32)> = KeyId::ALL
        .iter()
        .map(|&key| (key, counts[key.index()]))
        .filter(|&(_, count)| count > 0)
        .collect();
    rank_descending(&mut ranked);

    ranked
        .into_iter()
        .take(TOP_KEYS)
        .map(|(key, count)| KeyCandidate::new(key, Score::Count(count)))
        .collect()
}

/// Viterbi key detector over the shared model
#[derive(Debug, Clone, Copy)]
pub struct HmmDetector {
    model: &'static HmmModel,
    precision: Precision,
}

impl Default for HmmDetector {
    fn default() -> Self {
        Self::new(Precision::default())
    }
}

impl HmmDetector {
    pub fn new(precision: Precision) -> Self {
        Self {
            model: HmmModel::shared(),
            precision,
        }
    }

    fn trellis<S: AsRef<str>>(&self, notes: &[S]) -> Trellis {
        let observations: Vec<usize> = notes
            .iter()
            .map(|note| observation_index(note.as_ref()))
            .collect();
        Trellis::run(self.model, &observations, self.precision)
    }

    /// Decode the most probable key for every note
    pub fn decode<S: AsRef<str>>(&self, notes: &[S]) -> Vec<DecodedStep> {
        let steps = self.trellis(notes).steps();
        tracing::debug!(
            notes = notes.len(),
            precision = %self.precision,
            last = ?steps.last().map(|s| s.key),
            "viterbi decode"
        );
        steps
    }

    /// Decode only the trailing `window` notes and report the key of the last one
    pub fn decode_window<S: AsRef<str>>(&self, notes: &[S], window: usize) -> Option<DecodedStep> {
        self.trellis(trailing_window(notes, Some(window)))
            .steps()
            .pop()
    }

    /// Decoded keys paired with their note tokens
    pub fn decode_sequence<S: AsRef<str>>(&self, notes: &[S]) -> Vec<(String, KeyId, f64)> {
        notes
            .iter()
            .zip(self.decode(notes))
            .map(|(note, step)| {
                let note = strip_octave(note.as_ref()).to_string();
                (note, step.key, step.probability)
            })
            .collect()
    }
}

impl KeyDetector for HmmDetector {
    fn detect(&self, notes: &[&str], window: Option<usize>) -> KeyDetection {
        let per_note: Vec<NoteKey> = match window {
            None => {
                let trellis = self.trellis(notes);
                trellis
                    .path()
                    .into_iter()
                    .enumerate()
                    .map(|(t, state)| NoteKey {
                        key: Some(KeyId::ALL[state]),
                        candidates: trellis.ranked(t),
                    })
                    .collect()
            }
            Some(size) => (1..=notes.len())
                .map(|end| {
                    let trellis = self.trellis(trailing_window(&notes[..end], Some(size)));
                    let last = trellis.len().saturating_sub(1);
                    NoteKey {
                        key: trellis.path().last().map(|&state| KeyId::ALL[state]),
                        candidates: trellis.ranked(last),
                    }
                })
                .collect(),
        };

        let path: Vec<KeyId> = per_note.iter().filter_map(|n| n.key).collect();
        let candidates = frequency_candidates(&path);

        tracing::debug!(
            notes = notes.len(),
            window = ?window,
            best = ?candidates.first().map(|c| c.key),
            "hmm detection"
        );

        KeyDetection {
            per_note,
            candidates,
        }
    }

    fn name(&self) -> &'static str {
        "hmm"
    }
}

/// Detect keys with the default-precision Viterbi decoder.
///
/// Without a window, keys are ranked by how many notes decode to them. With
/// `Some(n)`, only the trailing `n` notes are decoded and the key of the
/// last note is returned as the single candidate, scored by log-probability.
pub fn detect_keys_hmm<S: AsRef<str>>(notes: &[S], window: Option<usize>) -> Vec<KeyCandidate> {
    let detector = HmmDetector::default();
    match window {
        Some(size) => detector
            .decode_window(notes, size)
            .map(|step| KeyCandidate::new(step.key, Score::LogProbability(step.log_probability())))
            .into_iter()
            .collect(),
        None => {
            let path: Vec<KeyId> = detector.decode(notes).into_iter().map(|s| s.key).collect();
            frequency_candidates(&path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULATING: [&str; 8] = ["C", "E", "G", "C", "D", "F#", "A", "D"];

    fn keys(steps: &[DecodedStep]) -> Vec<KeyId> {
        steps.iter().map(|s| s.key).collect()
    }

    #[test]
    fn test_matrices_are_row_stochastic() {
        let model = HmmModel::shared();
        for key in KeyId::ALL {
            let t: f64 = model.transition_row(key).iter().sum();
            let e: f64 = model.emission_row(key).iter().sum();
            assert!((t - 1.0).abs() < 1e-9, "transition row {} sums to {}", key, t);
            assert!((e - 1.0).abs() < 1e-9, "emission row {} sums to {}", key, e);
            assert!((model.initial(key) - 1.0 / 24.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_transition_priors() {
        let model = HmmModel::build();
        let stay = model.transition(KeyId::CMajor, KeyId::CMajor);
        let ratio = |to: KeyId| model.transition(KeyId::CMajor, to) / stay;

        assert!((ratio(KeyId::AMinor) - 0.02 / 0.90).abs() < 1e-12);
        assert!((ratio(KeyId::GMajor) - 0.03 / 0.90).abs() < 1e-12);
        assert!((ratio(KeyId::FMajor) - 0.03 / 0.90).abs() < 1e-12);
        assert!((ratio(KeyId::DMajor) - 0.005 / 0.90).abs() < 1e-12);
        assert!((ratio(KeyId::FSharpMajor) - 0.0001 / 0.90).abs() < 1e-12);
        assert!((ratio(KeyId::CMinor) - 0.001 / 0.90).abs() < 1e-12);
        assert!((ratio(KeyId::EMajor) - 0.001 / 0.90).abs() < 1e-12);
    }

    #[test]
    fn test_emission_priors() {
        let model = HmmModel::build();
        let c = KeyId::CMajor;
        let base = model.emission(c, 2); // D, degree 2
        assert!((model.emission(c, 0) / base - 2.5).abs() < 1e-12);
        assert!((model.emission(c, 7) / base - 2.0).abs() < 1e-12);
        assert!((model.emission(c, 11) / base - 1.5).abs() < 1e-12);
        assert!((model.emission(c, 1) / base - 0.1).abs() < 1e-12);
        assert_eq!(model.emission(c, 12), 0.0);

        // Enharmonic spellings in the scale still emit as in-scale
        let c_sharp = KeyId::CSharpMajor;
        assert!(model.emission(c_sharp, 5) > model.emission(c_sharp, 7)); // E# vs G
    }

    #[test]
    fn test_decode_is_deterministic() {
        let detector = HmmDetector::default();
        assert_eq!(detector.decode(&MODULATING), detector.decode(&MODULATING));
    }

    #[test]
    fn test_decode_triad() {
        let steps = HmmDetector::default().decode(&["C4", "E4", "G4"]);
        assert_eq!(keys(&steps), vec![KeyId::CMajor; 3]);
        assert!((steps[2].probability - 1.268e-4).abs() < 1e-6);
        assert!(steps[0].probability > steps[1].probability);
    }

    #[test]
    fn test_decode_modulating_melody() {
        let steps = HmmDetector::default().decode(&MODULATING);
        assert_eq!(steps.len(), 8);

        for step in &steps[..4] {
            for note in ["C", "E", "G"] {
                assert!(step.key.degree_of(note).is_some(), "{} not in {}", note, step.key);
            }
        }
        for step in &steps[4..] {
            for note in ["D", "F#", "A"] {
                assert!(step.key.degree_of(note).is_some(), "{} not in {}", note, step.key);
            }
        }
        // Staying put beats two modulations over eight notes
        assert_eq!(steps[7].key, KeyId::GMajor);
    }

    #[test]
    fn test_window_decodes_trailing_notes_only() {
        let melody = ["C", "E", "G", "C", "E", "G", "D", "F#", "A", "D", "F#", "A"];
        let detector = HmmDetector::default();

        assert_eq!(detector.decode(&melody)[11].key, KeyId::GMajor);
        assert_eq!(detector.decode_window(&melody, 3).map(|s| s.key), Some(KeyId::DMajor));
        assert_eq!(detector.decode_window::<&str>(&[], 3), None);

        let windowed = detect_keys_hmm(&melody, Some(3));
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].key, KeyId::DMajor);
        match windowed[0].score {
            Score::LogProbability(lp) => assert!(lp.is_finite() && lp < 0.0),
            other => panic!("unexpected score {:?}", other),
        }
    }

    #[test]
    fn test_precisions_agree() {
        let linear = HmmDetector::new(Precision::Linear);
        let log = HmmDetector::new(Precision::Log);

        let doubled: Vec<&str> = MODULATING.iter().chain(MODULATING.iter()).copied().collect();
        let melodies = [
            &doubled[..],
            &["A", "C#", "E"][..],
            &["C", "E", "G", "C", "G", "E", "C"][..],
        ];
        for melody in melodies {
            let a = linear.decode(melody);
            let b = log.decode(melody);
            assert_eq!(keys(&a), keys(&b));
            for (x, y) in a.iter().zip(&b) {
                assert!((x.probability - y.probability).abs() <= 1e-9 * x.probability);
            }
        }
    }

    #[test]
    fn test_unresolvable_tokens_observe_c() {
        let detector = HmmDetector::default();
        assert_eq!(detector.decode(&["X", "E", "G"]), detector.decode(&["C", "E", "G"]));
    }

    #[test]
    fn test_log_probability_of_zero() {
        let step = DecodedStep {
            key: KeyId::CMajor,
            probability: 0.0,
        };
        assert_eq!(step.log_probability(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_frequency_candidates() {
        let path = [
            KeyId::DMajor,
            KeyId::GMajor,
            KeyId::GMajor,
            KeyId::DMajor,
            KeyId::AMinor,
            KeyId::CMajor,
        ];
        assert_eq!(
            frequency_candidates(&path),
            vec![
                KeyCandidate::new(KeyId::DMajor, Score::Count(2)),
                KeyCandidate::new(KeyId::GMajor, Score::Count(2)),
                KeyCandidate::new(KeyId::CMajor, Score::Count(1)),
            ]
        );
        assert!(frequency_candidates(&[]).is_empty());
    }

    #[test]
    fn test_detect_keys_hmm_global() {
        assert_eq!(
            detect_keys_hmm(&MODULATING, None),
            vec![KeyCandidate::new(KeyId::GMajor, Score::Count(8))]
        );
        assert!(detect_keys_hmm::<&str>(&[], None).is_empty());
    }

    #[test]
    fn test_detector_reports_trellis_candidates() {
        let detection = HmmDetector::default().detect(&["C", "E", "G"], None);
        assert_eq!(detection.per_note.len(), 3);
        assert_eq!(detection.best(), Some(KeyId::CMajor));

        let last = &detection.per_note[2];
        assert_eq!(last.key, Some(KeyId::CMajor));
        assert_eq!(last.candidates.len(), 3);
        assert_eq!(last.candidates[0].key, KeyId::CMajor);
        let scores: Vec<f64> = last.candidates.iter().map(|c| c.score.value()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_per_note_candidates_are_trellis_columns() {
        let detector = HmmDetector::default();
        let detection = detector.detect(&MODULATING, None);

        // The decoded path stays in G major, but C alone favours its own tonic
        let first = &detection.per_note[0];
        assert_eq!(first.key, Some(KeyId::GMajor));
        assert_ne!(first.candidates[0].key, KeyId::GMajor);

        // A column depends only on the notes up to it
        for t in 0..MODULATING.len() {
            let prefix = detector.detect(&MODULATING[..=t], None);
            assert_eq!(detection.per_note[t].candidates, prefix.per_note[t].candidates);
        }

        let last = detection.per_note.last().unwrap();
        assert_eq!(Some(last.candidates[0].key), last.key);
    }

    #[test]
    fn test_detector_windowed() {
        let melody = ["C", "E", "G", "D", "F#", "A"];
        let detection = HmmDetector::default().detect(&melody, Some(3));
        assert_eq!(detection.per_note.len(), 6);
        assert_eq!(detection.per_note[2].key, Some(KeyId::CMajor));
        assert_eq!(detection.per_note[5].key, Some(KeyId::DMajor));
    }

    #[test]
    fn test_decode_sequence_strips_octaves() {
        let sequence = HmmDetector::new(Precision::Log).decode_sequence(&["A4", "C#5", "E4"]);
        let notes: Vec<&str> = sequence.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(notes, vec!["A", "C#", "E"]);
        assert!(sequence.iter().all(|(_, key, _)| *key == KeyId::AMajor));
    }

    #[test]
    fn test_precision_from_str() {
        assert_eq!("LOG".parse::<Precision>(), Ok(Precision::Log));
        assert_eq!("linear".parse::<Precision>(), Ok(Precision::Linear));
        assert!("float".parse::<Precision>().is_err());
    }
}
