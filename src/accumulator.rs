//! Two-phase evaluation: accumulate match records once, then query any threshold.

use crate::config::EvalConfig;
use crate::confusion::ConfusionMatrix;
use crate::error::Result;
use crate::matching::{build_record, MatchRecord};
use crate::stats::AccumulationStats;
use crate::threshold::validate_threshold;
use crate::types::ImageSample;
use rayon::prelude::*;

/// Position of a record in ingestion order.
pub type RecordId = usize;

/// Append-only store of per-image match records.
///
/// Geometric matching runs once per image in [`accumulate`](Self::accumulate); every
/// [`compute`](Self::compute) replays the stored records without touching geometry.
/// Accumulation needs `&mut self` and queries take `&self`, so all accumulation
/// completes before queries can run, and queries may run concurrently.
#[derive(Debug, Clone)]
pub struct MatchAccumulator {
    config: EvalConfig,
    records: Vec<MatchRecord>,
}

impl MatchAccumulator {
    /// Create an empty accumulator.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if `num_classes` is 0 or the IoU threshold is
    /// outside [0, 1].
    pub fn new(config: EvalConfig) -> Result<Self> {
        config.validate()?;
        if config.oriented_iou.is_approximation() {
            log::warn!("Oriented boxes will be compared by bounding extents; IoU is approximate");
        }
        Ok(Self {
            config,
            records: Vec::new(),
        })
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Match one image and store its record.
    ///
    /// # Errors
    ///
    /// On error nothing is stored. `InputShape` errors concern only this image;
    /// `Configuration` errors (class index out of range) signal misuse.
    ///
    /// # Example
    ///
    /// ```
    /// use confusion_sweep::{AxisBox, BoxKind, Detection, EvalConfig, GroundTruth, ImageSample, MatchAccumulator};
    ///
    /// let mut accumulator = MatchAccumulator::new(EvalConfig::new(1)).unwrap();
    /// let sample = ImageSample::new("img-1", BoxKind::AxisAligned)
    ///     .with_ground_truth(GroundTruth::new(AxisBox::new(0.0, 0.0, 10.0, 10.0), 0))
    ///     .with_detection(Detection::new(AxisBox::new(0.0, 0.0, 10.0, 10.0), 0.9, 0));
    /// accumulator.accumulate(&sample).unwrap();
    ///
    /// let matrix = accumulator.compute(0.5).unwrap();
    /// assert_eq!(matrix.get(0, 0), 1);
    /// ```
    pub fn accumulate(&mut self, sample: &ImageSample) -> Result<RecordId> {
        let record = build_record(sample, &self.config).map_err(|err| {
            if err.is_recoverable() {
                log::warn!("Excluding image '{}': {}", sample.image_id, err);
            }
            err
        })?;
        Ok(self.push(record))
    }

    /// Match many images in parallel and store the records in input order.
    ///
    /// Images with malformed input are excluded and listed in the returned stats.
    ///
    /// # Errors
    ///
    /// A `Configuration` error from any image aborts the batch before anything is stored.
    pub fn accumulate_all(&mut self, samples: &[ImageSample]) -> Result<AccumulationStats> {
        let config = &self.config;
        let mut results: Vec<Result<MatchRecord>> = samples
            .par_iter()
            .map(|sample| build_record(sample, config))
            .collect();

        let fatal = results
            .iter()
            .position(|result| matches!(result, Err(err) if !err.is_recoverable()));
        if let Some(index) = fatal {
            if let Err(err) = results.swap_remove(index) {
                return Err(err);
            }
        }

        let mut stats = AccumulationStats::new();
        for (sample, result) in samples.iter().zip(results) {
            match result {
                Ok(record) => {
                    stats.record_accepted(&record);
                    self.push(record);
                }
                Err(err) => {
                    log::warn!("Excluding image '{}': {}", sample.image_id, err);
                    stats.record_rejected(&sample.image_id);
                }
            }
        }

        log::info!("{}", stats.summary_string());
        Ok(stats)
    }

    fn push(&mut self, record: MatchRecord) -> RecordId {
        log::debug!(
            "Stored record for image '{}': {} ground truths, {} detections, {} candidates",
            record.image_id(),
            record.gt_classes().len(),
            record.det_classes().len(),
            record.candidates().len()
        );
        self.records.push(record);
        self.records.len() - 1
    }

    /// Build the confusion matrix at one confidence threshold.
    ///
    /// Zero accumulated images yield an all-zero matrix.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidThreshold` error if the threshold is outside [0, 1].
    pub fn compute(&self, confidence_threshold: f64) -> Result<ConfusionMatrix> {
        validate_threshold(confidence_threshold)?;
        log::trace!(
            "Replaying {} records at confidence {}",
            self.records.len(),
            confidence_threshold
        );
        ConfusionMatrix::from_records(
            &self.records,
            self.config.num_classes,
            self.config.task,
            confidence_threshold,
        )
    }

    /// Build one matrix per threshold, in parallel, in the order given.
    pub fn compute_many(&self, confidence_thresholds: &[f64]) -> Result<Vec<ConfusionMatrix>> {
        confidence_thresholds
            .par_iter()
            .map(|&threshold| self.compute(threshold))
            .collect()
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&MatchRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ground truths across all stored records.
    pub fn total_ground_truths(&self) -> usize {
        self.records.iter().map(|r| r.gt_classes().len()).sum()
    }

    /// Detections scoring at or above `confidence_threshold` across all stored records.
    pub fn detections_at_or_above(&self, confidence_threshold: f64) -> usize {
        self.records
            .iter()
            .flat_map(|r| r.det_confidences().iter())
            .filter(|&&confidence| confidence >= confidence_threshold)
            .count()
    }
}
