use std::cmp::Ordering;

use crate::errors::{RecognitionError, RecognitionResult};
use crate::labels::LabelTable;

/// Per-class scores, positionally aligned with a [`LabelTable`].
pub type ScoreVector = Vec<f32>;

/// Winning class of a score vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub index: usize,
    pub score: f32,
    pub label: String,
}

/// Index and value of the highest score. The earliest index wins ties.
///
/// NaN scores never displace the running best.
pub fn argmax(scores: &[f32]) -> RecognitionResult<(usize, f32)> {
    let (first, rest) = scores.split_first().ok_or(RecognitionError::EmptyInput)?;
    let mut best = (0, *first);
    for (ix, &score) in rest.iter().enumerate() {
        if score > best.1 || (best.1.is_nan() && !score.is_nan()) {
            best = (ix + 1, score);
        }
    }
    Ok(best)
}

/// Resolve the best scoring class to its label.
pub fn decode(scores: &[f32], labels: &LabelTable) -> RecognitionResult<Prediction> {
    let (index, score) = argmax(scores)?;
    let label = labels
        .get(index)
        .ok_or(RecognitionError::IndexOutOfRange { index, len: labels.len() })?;
    Ok(Prediction { index, score, label: label.to_string() })
}

/// The `k` best classes, highest first. Equal scores keep their index order
/// and NaN ranks last, so the head always agrees with [`argmax`].
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
    });
    ranked.truncate(k);
    ranked
}
