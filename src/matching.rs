//! Confidence-independent matching of detections to ground truths within one image.

use crate::config::EvalConfig;
use crate::error::{ConfusionError, Result};
use crate::metrics::iou::calculate_iou_matrix;
use crate::types::{ImageSample, Region};
use serde::Serialize;
use std::collections::HashSet;

/// A ground-truth/detection pair whose IoU is above the match threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub gt_index: usize,
    pub det_index: usize,
    pub iou: f64,
}

/// Everything needed to replay one image at any confidence threshold.
///
/// Class and confidence vectors are index-aligned with the image's original
/// ground-truth and detection order. Candidates form a partial one-to-one matching.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    image_id: String,
    gt_classes: Vec<usize>,
    det_classes: Vec<usize>,
    det_confidences: Vec<f64>,
    candidates: Vec<MatchCandidate>,
}

impl MatchRecord {
    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn gt_classes(&self) -> &[usize] {
        &self.gt_classes
    }

    pub fn det_classes(&self) -> &[usize] {
        &self.det_classes
    }

    pub fn det_confidences(&self) -> &[f64] {
        &self.det_confidences
    }

    /// Surviving candidates, highest IoU first.
    pub fn candidates(&self) -> &[MatchCandidate] {
        &self.candidates
    }
}

/// Match one image's detections against its ground truths.
///
/// Images without ground truths or without detections store their data with no
/// candidates. Otherwise every pair with IoU strictly above `config.iou_threshold`
/// becomes a candidate and is reduced by [`greedy_reduce`].
///
/// # Errors
///
/// `InputShape` for mixed box kinds, non-finite or inverted boxes and confidences
/// outside [0, 1]; `Configuration` for class indices outside `[0, num_classes)`.
pub fn build_record(sample: &ImageSample, config: &EvalConfig) -> Result<MatchRecord> {
    sample.validate(config.num_classes)?;

    let candidates = if sample.ground_truths.is_empty() || sample.detections.is_empty() {
        Vec::new()
    } else {
        let gt_regions: Vec<Region> = sample.ground_truths.iter().map(|gt| gt.region).collect();
        let det_regions: Vec<Region> = sample.detections.iter().map(|det| det.region).collect();

        let ious = calculate_iou_matrix(&gt_regions, &det_regions, config.oriented_iou)
            .map_err(|err| match err {
                ConfusionError::Geometry(reason) => {
                    ConfusionError::input_shape(&sample.image_id, reason)
                }
                other => other,
            })?;
        greedy_reduce(&ious, config.iou_threshold)
    };

    Ok(MatchRecord {
        image_id: sample.image_id.clone(),
        gt_classes: sample.ground_truths.iter().map(|gt| gt.class_id).collect(),
        det_classes: sample.detections.iter().map(|det| det.class_id).collect(),
        det_confidences: sample.detections.iter().map(|det| det.confidence).collect(),
        candidates,
    })
}

/// Reduce an IoU matrix (ground truths × detections) to a partial one-to-one matching.
///
/// Pairs with IoU strictly greater than `iou_threshold` are sorted by IoU descending.
/// The highest-IoU pair of each detection is kept, then among those survivors the
/// highest-IoU pair of each ground truth. The two passes are applied in sequence, so a
/// detection whose best pair loses its ground truth in the second pass stays unmatched.
/// Exact ties resolve by row-major (ground truth, detection) index order.
///
/// # Example
///
/// ```
/// use confusion_sweep::matching::greedy_reduce;
///
/// let ious = vec![
///     vec![0.9, 0.6],
///     vec![0.1, 0.8],
/// ];
/// let matches = greedy_reduce(&ious, 0.45);
/// assert_eq!(matches.len(), 2);
/// assert_eq!((matches[0].gt_index, matches[0].det_index), (0, 0));
/// assert_eq!((matches[1].gt_index, matches[1].det_index), (1, 1));
/// ```
pub fn greedy_reduce(ious: &[Vec<f64>], iou_threshold: f64) -> Vec<MatchCandidate> {
    let mut candidates: Vec<MatchCandidate> = ious
        .iter()
        .enumerate()
        .flat_map(|(gt_index, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &iou)| iou > iou_threshold)
                .map(move |(det_index, &iou)| MatchCandidate {
                    gt_index,
                    det_index,
                    iou,
                })
        })
        .collect();

    sort_by_iou_descending(&mut candidates);
    let mut seen_detections = HashSet::new();
    candidates.retain(|c| seen_detections.insert(c.det_index));

    sort_by_iou_descending(&mut candidates);
    let mut seen_ground_truths = HashSet::new();
    candidates.retain(|c| seen_ground_truths.insert(c.gt_index));

    candidates
}

// Stable, so equal IoUs keep their index order.
fn sort_by_iou_descending(candidates: &mut [MatchCandidate]) {
    candidates.sort_by(|a, b| b.iou.total_cmp(&a.iou));
}
