// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Degree-weighted key scoring.
//!
//! Every key earns points for each note of the melody that belongs to its
//! scale: 3 for the tonic, 2 for the dominant and the leading tone, 1 for
//! any other degree. Repeated notes count once per occurrence.

use std::collections::HashMap;

use super::{
    rank_descending, trailing_window, KeyCandidate, KeyDetection, KeyDetector, NoteKey, Score,
    TOP_KEYS,
};
use crate::music::note::strip_octave;
use crate::music::KeyId;

/// Points earned by a note on a given scale degree (1-based)
pub fn degree_points(degree: usize) -> u32 {
    match degree {
        1 => 3,
        5 | 7 => 2,
        _ => 1,
    }
}

/// Score all 24 keys against a melody, in key-table order
pub fn score_keys<S: AsRef<str>>(notes: &[S]) -> Vec<(KeyId, u32)> {
    let mut frequencies: HashMap<&str, u32> = HashMap::new();
    for note in notes {
        *frequencies.entry(strip_octave(note.as_ref())).or_insert(0) += 1;
    }

    KeyId::ALL
        .iter()
        .map(|&key| {
            let points: u32 = frequencies
                .iter()
                .filter_map(|(note, count)| key.degree_of(note).map(|d| degree_points(d) * count))
                .sum();
            (key, points)
        })
        .collect()
}

/// Rank keys for a melody, best first.
///
/// With `window = Some(n)` only the last `n` notes are scored. Returns at
/// most three candidates; ties keep key-table order, so a melody with no
/// scale notes at all still yields the first keys of the table.
pub fn detect_keys_scoring<S: AsRef<str>>(notes: &[S], window: Option<usize>) -> Vec<KeyCandidate> {
    let notes = trailing_window(notes, window);
    if notes.is_empty() {
        return Vec::new();
    }

    let mut scores = score_keys(notes);
    rank_descending(&mut scores);

    tracing::trace!(
        notes = notes.len(),
        top = %scores[0].0,
        points = scores[0].1,
        "scored keys"
    );

    scores
        .into_iter()
        .take(TOP_KEYS)
        .map(|(key, points)| KeyCandidate::new(key, Score::Points(points)))
        .collect()
}

/// Key detector re-scoring each prefix of the melody
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringDetector;

impl ScoringDetector {
    pub fn new() -> Self {
        Self
    }
}

impl KeyDetector for ScoringDetector {
    fn detect(&self, notes: &[&str], window: Option<usize>) -> KeyDetection {
        let candidates = detect_keys_scoring(notes, None);

        let per_note = (1..=notes.len())
            .map(|end| {
                let local = detect_keys_scoring(&notes[..end], window);
                NoteKey {
                    key: local.first().map(|c| c.key),
                    candidates: local,
                }
            })
            .collect();

        KeyDetection {
            per_note,
            candidates,
        }
    }

    fn name(&self) -> &'static str {
        "scoring"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(candidates: &[KeyCandidate]) -> Vec<KeyId> {
        candidates.iter().map(|c| c.key).collect()
    }

    #[test]
    fn test_c_major_triad() {
        let result = detect_keys_scoring(&["C4", "E4", "G4"], None);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0], KeyCandidate::new(KeyId::CMajor, Score::Points(6)));
        // F major, G major and C minor all score 5; table order decides
        assert_eq!(keys(&result), vec![KeyId::CMajor, KeyId::FMajor, KeyId::GMajor]);
        assert_eq!(result[1].score, Score::Points(5));
    }

    #[test]
    fn test_empty_melody() {
        assert!(detect_keys_scoring::<&str>(&[], None).is_empty());
        assert!(detect_keys_scoring::<&str>(&[], Some(4)).is_empty());
    }

    #[test]
    fn test_window_keeps_trailing_notes() {
        let notes = ["D", "F#", "A", "D", "C", "E", "G"];
        assert_eq!(detect_keys_scoring(&notes, Some(3))[0].key, KeyId::CMajor);
        assert_eq!(detect_keys_scoring(&notes[..3], None)[0].key, KeyId::DMajor);
        // A zero window means no window
        assert_eq!(
            detect_keys_scoring(&notes, Some(0)),
            detect_keys_scoring(&notes, None)
        );
    }

    #[test]
    fn test_repeated_notes_multiply_points() {
        let result = detect_keys_scoring(&["C", "C4"], None);
        assert_eq!(result[0], KeyCandidate::new(KeyId::CMajor, Score::Points(6)));
        assert_eq!(result[1], KeyCandidate::new(KeyId::CMinor, Score::Points(6)));
    }

    #[test]
    fn test_no_scale_notes_falls_back_to_table_order() {
        let result = detect_keys_scoring(&["H", "X9"], None);
        assert_eq!(
            keys(&result),
            vec![KeyId::CMajor, KeyId::CSharpMajor, KeyId::DMajor]
        );
        assert!(result.iter().all(|c| c.score == Score::Points(0)));
    }

    #[test]
    fn test_tonic_dominant_leading_tone_raise_score() {
        let base = ["E", "A", "C#"];
        let before = score_keys(&base);

        for key in KeyId::ALL {
            let scale = key.scale();
            let mut notes: Vec<&str> = base.to_vec();
            notes.extend([scale[0], scale[4], scale[6]]);
            let after = score_keys(&notes);
            assert_eq!(after[key.index()].1, before[key.index()].1 + 7, "{}", key);
        }
    }

    #[test]
    fn test_tonic_dominant_leading_tone_outscore_distant_keys() {
        for key in KeyId::ALL {
            let scale = key.scale();
            let notes = [scale[0], scale[4], scale[6]];
            let scores = score_keys(&notes);

            let mut distant = 0;
            for other in KeyId::ALL {
                let shared = notes.iter().filter(|n| other.degree_of(n).is_some()).count();
                if shared <= 1 {
                    distant += 1;
                    assert!(
                        scores[key.index()].1 > scores[other.index()].1,
                        "{} vs {}",
                        key,
                        other
                    );
                }
            }
            assert!(distant > 0, "{}", key);
        }
    }

    #[test]
    fn test_enharmonic_spelling_scores_alike() {
        let sharp = score_keys(&["C#", "F", "G#"]);
        let flat = score_keys(&["Db", "E#", "Ab"]);
        assert_eq!(sharp, flat);
    }

    #[test]
    fn test_detector_scores_each_prefix() {
        let notes = ["C", "E", "G", "D", "F#", "A"];
        let detection = ScoringDetector::new().detect(&notes, Some(3));

        assert_eq!(detection.per_note.len(), notes.len());
        assert_eq!(detection.per_note[2].key, Some(KeyId::CMajor));
        assert_eq!(detection.per_note[5].key, Some(KeyId::DMajor));
        assert_eq!(detection.per_note[5].candidates.len(), 3);
        assert_eq!(
            detection.candidates,
            detect_keys_scoring(&notes, None)
        );
    }
}
