//! # confusion-sweep
//!
//! Object detection confusion matrices whose confidence threshold can be changed
//! after the expensive matching step has run.
//!
//! Evaluation is split into two phases:
//! - **Accumulate**: each image's detections are matched to its ground truths once,
//!   using IoU and a greedy one-to-one rule. The result is a confidence-independent
//!   [`MatchRecord`].
//! - **Query**: [`MatchAccumulator::compute`] replays every stored record at any
//!   confidence threshold and returns a fresh [`ConfusionMatrix`]. Geometry is never
//!   recomputed, so sweeping many thresholds for precision/recall curves is cheap.
//!
//! ## Features
//!
//! - Axis-aligned and oriented (rotated) box IoU
//! - (C+1)×(C+1) detection matrices with a background row and column, or C×C
//!   classification matrices
//! - Parallel batch accumulation and threshold sweeps
//! - Per-class and pooled precision, recall and F1
//!
//! ## Quick Start
//!
//! ```rust
//! use confusion_sweep::{
//!     AxisBox, BoxKind, Detection, EvalConfig, GroundTruth, ImageSample, MatchAccumulator,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut accumulator = MatchAccumulator::new(EvalConfig::new(2).with_iou_threshold(0.45))?;
//!
//! let sample = ImageSample::new("frame-0001", BoxKind::AxisAligned)
//!     .with_ground_truth(GroundTruth::new(AxisBox::new(0.0, 0.0, 10.0, 10.0), 0))
//!     .with_detection(Detection::new(AxisBox::new(0.0, 0.0, 10.0, 10.0), 0.3, 0));
//! accumulator.accumulate(&sample)?;
//!
//! // The same records, two thresholds
//! let loose = accumulator.compute(0.25)?;
//! let strict = accumulator.compute(0.5)?;
//! assert_eq!(loose.get(0, 0), 1);
//! assert_eq!(strict.get(2, 0), 1); // background row: missed
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod metrics;
pub mod matching;
pub mod confusion;
pub mod stats;
pub mod accumulator;
pub mod threshold;

// Re-export commonly used types and functions
pub use error::{ConfusionError, Result};
pub use types::{AxisBox, BoxKind, Detection, GroundTruth, ImageSample, OrientedBox, Region};
pub use config::{EvalConfig, Task};
pub use matching::{MatchCandidate, MatchRecord};
pub use confusion::ConfusionMatrix;
pub use stats::AccumulationStats;
pub use accumulator::{MatchAccumulator, RecordId};
pub use threshold::{find_best_threshold, generate_threshold_range, sweep, ThresholdPoint};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_compiles() {
        // Basic smoke test to ensure the library compiles
        let bbox = AxisBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(bbox.is_valid());
    }
}
