//! Precision, recall and F1 from confusion counts.

use serde::{Deserialize, Serialize};

/// Container for precision, recall and F1 along with the counts they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecall {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

/// Calculate precision as TP / (TP + FP), 0.0 when nothing was predicted.
pub fn calculate_precision(tp: u64, fp: u64) -> f64 {
    let denominator = tp + fp;
    if denominator == 0 {
        return 0.0;
    }
    tp as f64 / denominator as f64
}

/// Calculate recall as TP / (TP + FN), 0.0 when there was nothing to find.
pub fn calculate_recall(tp: u64, fn_: u64) -> f64 {
    let denominator = tp + fn_;
    if denominator == 0 {
        return 0.0;
    }
    tp as f64 / denominator as f64
}

/// Calculate F1 score from precision and recall.
///
/// F1 score is the harmonic mean of precision and recall:
/// F1 = 2 × (Precision × Recall) / (Precision + Recall)
///
/// # Example
///
/// ```
/// use confusion_sweep::metrics::precision_recall::calculate_f1_score;
///
/// let f1 = calculate_f1_score(0.8, 0.6);
/// assert!((f1 - 0.6857).abs() < 0.001);
/// ```
pub fn calculate_f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        return 0.0;
    }

    2.0 * (precision * recall) / (precision + recall)
}

/// Calculate precision, recall and F1 from TP, FP, and FN counts.
///
/// # Example
///
/// ```
/// use confusion_sweep::metrics::precision_recall::calculate_precision_recall;
///
/// let pr = calculate_precision_recall(8, 2, 3);
/// assert_eq!(pr.precision, 0.8); // 8 / (8 + 2)
/// assert!((pr.recall - 0.7272).abs() < 0.001); // 8 / (8 + 3)
/// ```
pub fn calculate_precision_recall(
    true_positives: u64,
    false_positives: u64,
    false_negatives: u64,
) -> PrecisionRecall {
    let precision = calculate_precision(true_positives, false_positives);
    let recall = calculate_recall(true_positives, false_negatives);

    PrecisionRecall {
        precision,
        recall,
        f1: calculate_f1_score(precision, recall),
        true_positives,
        false_positives,
        false_negatives,
    }
}
