//! Confidence threshold sweeps over accumulated match records.

use crate::accumulator::MatchAccumulator;
use crate::error::{ConfusionError, Result};
use serde::{Deserialize, Serialize};

/// Pooled scores of one confusion matrix query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPoint {
    pub threshold: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

/// Generate a range of threshold values for evaluation.
///
/// # Arguments
///
/// * `start` - Starting threshold value (inclusive)
/// * `end` - Ending threshold value (inclusive)
/// * `steps` - Number of threshold values to generate
///
/// # Example
///
/// ```
/// use confusion_sweep::threshold::generate_threshold_range;
///
/// let thresholds = generate_threshold_range(0.0, 1.0, 11).unwrap();
/// assert_eq!(thresholds.len(), 11);
/// assert_eq!(thresholds[0], 0.0);
/// assert_eq!(thresholds[10], 1.0);
/// ```
pub fn generate_threshold_range(start: f64, end: f64, steps: usize) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(ConfusionError::InvalidThreshold(
            "Number of steps must be greater than 0".to_string()
        ));
    }

    validate_threshold(start)?;
    validate_threshold(end)?;

    if start > end {
        return Err(ConfusionError::InvalidThreshold(
            format!("Start threshold ({}) must be <= end threshold ({})", start, end)
        ));
    }

    if steps == 1 {
        return Ok(vec![start]);
    }

    let step_size = (end - start) / (steps - 1) as f64;
    Ok((0..steps)
        .map(|i| if i == steps - 1 { end } else { start + step_size * i as f64 })
        .collect())
}

/// Compute pooled precision, recall and F1 at each threshold.
///
/// Geometry is not recomputed; every point replays the accumulator's stored records.
/// Points come back in the order of `thresholds`.
pub fn sweep(accumulator: &MatchAccumulator, thresholds: &[f64]) -> Result<Vec<ThresholdPoint>> {
    let matrices = accumulator.compute_many(thresholds)?;

    Ok(thresholds
        .iter()
        .zip(matrices)
        .map(|(&threshold, matrix)| {
            let pooled = matrix.micro_metrics();
            ThresholdPoint {
                threshold,
                precision: pooled.precision,
                recall: pooled.recall,
                f1: pooled.f1,
                true_positives: pooled.true_positives,
                false_positives: pooled.false_positives,
                false_negatives: pooled.false_negatives,
            }
        })
        .collect())
}

/// Find the point with the highest F1 score.
///
/// Ties keep the lowest threshold. Returns `None` for an empty slice.
pub fn find_best_threshold(points: &[ThresholdPoint]) -> Option<&ThresholdPoint> {
    points.iter().fold(None, |best: Option<&ThresholdPoint>, point| match best {
        Some(current) if current.f1 >= point.f1 => Some(current),
        _ => Some(point),
    })
}

/// Validate that a threshold is in the valid range [0.0, 1.0].
pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfusionError::InvalidThreshold(
            format!("Threshold must be between 0.0 and 1.0, got {}", threshold)
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalConfig;
    use crate::types::{AxisBox, BoxKind, Detection, GroundTruth, ImageSample};

    fn point(threshold: f64, f1: f64) -> ThresholdPoint {
        ThresholdPoint {
            threshold,
            precision: 0.0,
            recall: 0.0,
            f1,
            true_positives: 0,
            false_positives: 0,
            false_negatives: 0,
        }
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(validate_threshold(1.5).is_err());
        assert!(validate_threshold(-0.1).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
    }

    #[test]
    fn test_generate_threshold_range() {
        let thresholds = generate_threshold_range(0.0, 1.0, 11).unwrap();
        assert_eq!(thresholds.len(), 11);
        assert!((thresholds[0] - 0.0).abs() < 1e-10);
        assert!((thresholds[10] - 1.0).abs() < 1e-10);
        assert!((thresholds[5] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_generate_threshold_range_errors() {
        assert!(generate_threshold_range(0.0, 1.0, 0).is_err());
        assert!(generate_threshold_range(0.8, 0.2, 5).is_err());
        assert!(generate_threshold_range(0.0, 1.2, 5).is_err());
        assert_eq!(generate_threshold_range(0.3, 0.9, 1).unwrap(), vec![0.3]);
    }

    #[test]
    fn test_find_best_threshold() {
        let points = vec![point(0.1, 0.4), point(0.5, 0.8), point(0.9, 0.8)];
        let best = find_best_threshold(&points).unwrap();
        assert_eq!(best.threshold, 0.5);
        assert!(find_best_threshold(&[]).is_none());
    }

    #[test]
    fn test_sweep_trades_recall_for_precision() {
        let mut accumulator = MatchAccumulator::new(EvalConfig::new(1)).unwrap();
        let sample = ImageSample::new("img", BoxKind::AxisAligned)
            .with_ground_truth(GroundTruth::new(AxisBox::new(0.0, 0.0, 10.0, 10.0), 0))
            .with_ground_truth(GroundTruth::new(AxisBox::new(20.0, 20.0, 30.0, 30.0), 0))
            .with_detection(Detection::new(AxisBox::new(0.0, 0.0, 10.0, 10.0), 0.9, 0))
            .with_detection(Detection::new(AxisBox::new(20.0, 20.0, 30.0, 30.0), 0.4, 0))
            .with_detection(Detection::new(AxisBox::new(60.0, 60.0, 70.0, 70.0), 0.3, 0));
        accumulator.accumulate(&sample).unwrap();

        let points = sweep(&accumulator, &[0.2, 0.5]).unwrap();
        assert_eq!(points.len(), 2);

        // 0.2: two TP, one FP
        assert_eq!(points[0].true_positives, 2);
        assert_eq!(points[0].false_positives, 1);
        assert_eq!(points[0].recall, 1.0);

        // 0.5: one TP, one FN
        assert_eq!(points[1].true_positives, 1);
        assert_eq!(points[1].false_positives, 0);
        assert_eq!(points[1].false_negatives, 1);
        assert_eq!(points[1].precision, 1.0);
        assert_eq!(points[1].recall, 0.5);
    }
}
