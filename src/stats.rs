//! Statistics tracking for batch accumulation.
//!
//! Records how many images were matched or excluded and how much data they carried.

use crate::matching::MatchRecord;
use serde::{Deserialize, Serialize};

/// Statistics collected while accumulating a batch of images.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccumulationStats {
    /// Number of images whose match record was stored
    pub images_accepted: usize,

    /// Ids of images excluded because of malformed input, in input order
    pub rejected_image_ids: Vec<String>,

    /// Ground truths carried by accepted images
    pub ground_truths: usize,

    /// Detections carried by accepted images, regardless of confidence
    pub detections: usize,

    /// Match candidates stored after greedy reduction
    pub candidates: usize,
}

impl AccumulationStats {
    /// Create a new `AccumulationStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a stored record
    pub fn record_accepted(&mut self, record: &MatchRecord) {
        self.images_accepted += 1;
        self.ground_truths += record.gt_classes().len();
        self.detections += record.det_classes().len();
        self.candidates += record.candidates().len();
    }

    /// Count an excluded image
    pub fn record_rejected(&mut self, image_id: &str) {
        self.rejected_image_ids.push(image_id.to_string());
    }

    pub fn images_rejected(&self) -> usize {
        self.rejected_image_ids.len()
    }

    /// Accepted plus rejected images
    pub fn total_images(&self) -> usize {
        self.images_accepted + self.images_rejected()
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "AccumulationStats {{ images: {}, accepted: {}, rejected: {}, ground_truths: {}, detections: {}, candidates: {} }}",
            self.total_images(),
            self.images_accepted,
            self.images_rejected(),
            self.ground_truths,
            self.detections,
            self.candidates
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_are_zero() {
        let stats = AccumulationStats::new();
        assert_eq!(stats.total_images(), 0);
        assert_eq!(stats.images_rejected(), 0);
        assert_eq!(stats.candidates, 0);
    }

    #[test]
    fn test_rejections() {
        let mut stats = AccumulationStats::new();
        stats.record_rejected("a.jpg");
        stats.record_rejected("b.jpg");
        assert_eq!(stats.images_rejected(), 2);
        assert_eq!(stats.total_images(), 2);
        assert_eq!(stats.rejected_image_ids, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_summary_string() {
        let mut stats = AccumulationStats::new();
        stats.images_accepted = 10;
        stats.detections = 50;

        let summary = stats.summary_string();
        assert!(summary.contains("accepted: 10"));
        assert!(summary.contains("detections: 50"));
    }
}
