use crate::backend::{OutputVector, dequantize};
use crate::labels::LabelVocabulary;
use common::span_debug;
use schema::DetectionResult;
use std::cmp::Reverse;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcessor {
    pub confidence_threshold: f32,
    pub top_k: usize,
}

impl PostProcessor {
    pub fn new(confidence_threshold: f32, top_k: usize) -> Self {
        Self {
            confidence_threshold,
            top_k,
        }
    }

    pub fn decode(&self, output: &OutputVector, labels: &LabelVocabulary) -> Vec<DetectionResult> {
        decode(
            output.as_slice(),
            labels,
            self.confidence_threshold,
            self.top_k,
        )
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_TOP_K)
    }
}

/// Turn quantized scores into at most `top_k` results, best first.
///
/// A class is kept when `score / 255 > threshold` (strict) and the index has
/// a label. Ranking compares the raw bytes, which orders identically to the
/// dequantized values; the sort is stable so equal scores keep output order.
pub fn decode(
    output: &[u8],
    labels: &LabelVocabulary,
    threshold: f32,
    top_k: usize,
) -> Vec<DetectionResult> {
    let _s = span_debug!("decode");

    let mut candidates: Vec<(usize, u8)> = output
        .iter()
        .copied()
        .enumerate()
        .take(labels.len())
        .filter(|&(_, score)| dequantize(score) > threshold)
        .collect();

    candidates.sort_by_key(|&(_, score)| Reverse(score));
    candidates.truncate(top_k);

    candidates
        .into_iter()
        .filter_map(|(index, score)| {
            labels
                .get(index)
                .map(|label| DetectionResult::new(label, dequantize(score)))
        })
        .collect()
}
