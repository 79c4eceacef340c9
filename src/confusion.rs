//! Confusion matrices replayed from stored match records.

use crate::config::Task;
use crate::error::{ConfusionError, Result};
use crate::matching::MatchRecord;
use crate::metrics::precision_recall::{calculate_precision_recall, PrecisionRecall};
use serde::{Deserialize, Serialize};

/// Square count grid indexed as `[predicted][ground_truth]`.
///
/// In [`Task::Detect`] mode the last row and column stand for background: the
/// background row counts missed ground truths (FN), the background column counts
/// unmatched detections (FP). [`Task::Classify`] matrices have no background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfusionMatrix")]
pub struct ConfusionMatrix {
    num_classes: usize,
    task: Task,
    counts: Vec<u64>,
}

/// Unchecked serialized form; the grid length is validated on conversion.
#[derive(Deserialize)]
struct RawConfusionMatrix {
    num_classes: usize,
    task: Task,
    counts: Vec<u64>,
}

impl TryFrom<RawConfusionMatrix> for ConfusionMatrix {
    type Error = ConfusionError;

    fn try_from(raw: RawConfusionMatrix) -> Result<Self> {
        let matrix = Self::new(raw.num_classes, raw.task);
        if raw.counts.len() != matrix.counts.len() {
            return Err(ConfusionError::Configuration(format!(
                "{}x{} matrix needs {} counts, got {}",
                matrix.size(),
                matrix.size(),
                matrix.counts.len(),
                raw.counts.len()
            )));
        }
        Ok(Self {
            counts: raw.counts,
            ..matrix
        })
    }
}

impl ConfusionMatrix {
    /// Create an all-zero matrix.
    pub fn new(num_classes: usize, task: Task) -> Self {
        let size = match task {
            Task::Detect => num_classes + 1,
            Task::Classify => num_classes,
        };
        Self {
            num_classes,
            task,
            counts: vec![0; size * size],
        }
    }

    /// Replay `records` at `confidence_threshold`.
    ///
    /// Per image, every candidate whose detection scores at or above the threshold
    /// counts as `[predicted, true]`. Ground truths left without such a candidate go to
    /// the background row, and detections at or above the threshold that were not
    /// consumed go to the background column. Detections below the threshold count
    /// nowhere.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if a record holds a class index outside
    /// `[0, num_classes)`, i.e. it was built for more classes than requested here.
    pub fn from_records<'a, I>(
        records: I,
        num_classes: usize,
        task: Task,
        confidence_threshold: f64,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut matrix = Self::new(num_classes, task);
        for record in records {
            let out_of_range = record
                .gt_classes()
                .iter()
                .chain(record.det_classes())
                .find(|&&class_id| class_id >= num_classes);
            if let Some(class_id) = out_of_range {
                return Err(ConfusionError::Configuration(format!(
                    "image '{}' has class index {} but the matrix has {} classes",
                    record.image_id(),
                    class_id,
                    num_classes
                )));
            }
            matrix.tally(record, confidence_threshold);
        }
        Ok(matrix)
    }

    fn tally(&mut self, record: &MatchRecord, confidence_threshold: f64) {
        let gt_classes = record.gt_classes();
        let det_classes = record.det_classes();
        let det_confidences = record.det_confidences();

        let made = |det_index: usize| det_confidences[det_index] >= confidence_threshold;

        // Images without ground truths or detections carry no candidates, so the
        // loops below reduce to "all FP" and "all FN" respectively.
        let mut consumed = vec![false; det_classes.len()];
        let mut found = vec![false; gt_classes.len()];

        for candidate in record.candidates() {
            if made(candidate.det_index) {
                consumed[candidate.det_index] = true;
                found[candidate.gt_index] = true;
                self.increment(det_classes[candidate.det_index], gt_classes[candidate.gt_index]);
            }
        }

        for (gt_index, &true_class) in gt_classes.iter().enumerate() {
            if !found[gt_index] {
                if let Some(background) = self.background() {
                    self.increment(background, true_class);
                }
            }
        }

        for (det_index, &predicted_class) in det_classes.iter().enumerate() {
            if made(det_index) && !consumed[det_index] {
                if let Some(background) = self.background() {
                    self.increment(predicted_class, background);
                }
            }
        }
    }

    fn increment(&mut self, predicted: usize, truth: usize) {
        let size = self.size();
        self.counts[predicted * size + truth] += 1;
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        match self.task {
            Task::Detect => self.num_classes + 1,
            Task::Classify => self.num_classes,
        }
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn task(&self) -> Task {
        self.task
    }

    /// Index of the background row/column, if this matrix has one.
    pub fn background(&self) -> Option<usize> {
        match self.task {
            Task::Detect => Some(self.num_classes),
            Task::Classify => None,
        }
    }

    /// Count at `[predicted][ground_truth]`.
    ///
    /// # Panics
    ///
    /// Panics if either index is not below [`size`](Self::size).
    pub fn get(&self, predicted: usize, ground_truth: usize) -> u64 {
        assert!(
            predicted < self.size() && ground_truth < self.size(),
            "index ({}, {}) out of bounds for {}x{} matrix",
            predicted,
            ground_truth,
            self.size(),
            self.size()
        );
        self.counts[predicted * self.size() + ground_truth]
    }

    /// The grid as nested rows.
    pub fn rows(&self) -> Vec<Vec<u64>> {
        if self.size() == 0 {
            return Vec::new();
        }
        self.counts.chunks(self.size()).map(<[u64]>::to_vec).collect()
    }

    /// Sum of all cells.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Diagonal per class.
    pub fn true_positives(&self) -> Vec<u64> {
        (0..self.num_classes).map(|c| self.get(c, c)).collect()
    }

    /// Per class: predicted as the class but not matching it (row sum minus diagonal).
    pub fn false_positives(&self) -> Vec<u64> {
        (0..self.num_classes)
            .map(|c| (0..self.size()).map(|truth| self.get(c, truth)).sum::<u64>() - self.get(c, c))
            .collect()
    }

    /// Per class: ground truths of the class not found as it (column sum minus diagonal).
    pub fn false_negatives(&self) -> Vec<u64> {
        (0..self.num_classes)
            .map(|c| (0..self.size()).map(|pred| self.get(pred, c)).sum::<u64>() - self.get(c, c))
            .collect()
    }

    /// Cells in ground-truth class columns; equals the number of ground truths seen in detect mode.
    pub fn ground_truth_total(&self) -> u64 {
        (0..self.size())
            .flat_map(|pred| (0..self.num_classes).map(move |truth| (pred, truth)))
            .map(|(pred, truth)| self.get(pred, truth))
            .sum()
    }

    /// Cells in predicted class rows; equals the detections made at the threshold in detect mode.
    pub fn prediction_total(&self) -> u64 {
        (0..self.num_classes)
            .flat_map(|pred| (0..self.size()).map(move |truth| (pred, truth)))
            .map(|(pred, truth)| self.get(pred, truth))
            .sum()
    }

    /// Column-normalized fractions: each ground-truth column divided by its sum.
    pub fn normalized(&self) -> Vec<Vec<f64>> {
        let size = self.size();
        let column_sums: Vec<u64> = (0..size)
            .map(|truth| (0..size).map(|pred| self.get(pred, truth)).sum())
            .collect();

        (0..size)
            .map(|pred| {
                (0..size)
                    .map(|truth| self.get(pred, truth) as f64 / (column_sums[truth] as f64 + 1e-9))
                    .collect()
            })
            .collect()
    }

    /// Precision, recall and F1 per class.
    pub fn class_metrics(&self) -> Vec<PrecisionRecall> {
        let tp = self.true_positives();
        let fp = self.false_positives();
        let fn_ = self.false_negatives();
        (0..self.num_classes)
            .map(|c| calculate_precision_recall(tp[c], fp[c], fn_[c]))
            .collect()
    }

    /// Precision, recall and F1 over all classes pooled together.
    pub fn micro_metrics(&self) -> PrecisionRecall {
        calculate_precision_recall(
            self.true_positives().iter().sum(),
            self.false_positives().iter().sum(),
            self.false_negatives().iter().sum(),
        )
    }
}
