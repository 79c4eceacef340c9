//! Evaluation configuration.

use crate::error::{ConfusionError, Result};
use crate::metrics::iou::OrientedIouMethod;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default IoU above which a detection/ground-truth pair is a match candidate.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.45;

/// Shape of the produced confusion matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    /// (C+1)×(C+1) with a background row (missed objects) and column (spurious detections).
    #[default]
    Detect,
    /// C×C with only class-to-class confusions; background increments are dropped.
    Classify,
}

/// Settings fixed for the lifetime of one accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Number of classes, not counting background
    pub num_classes: usize,
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f64,
    #[serde(default)]
    pub task: Task,
    #[serde(default)]
    pub oriented_iou: OrientedIouMethod,
}

fn default_iou_threshold() -> f64 {
    DEFAULT_IOU_THRESHOLD
}

impl EvalConfig {
    /// Create a detection config with the default IoU threshold.
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            task: Task::Detect,
            oriented_iou: OrientedIouMethod::default(),
        }
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f64) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    pub fn with_oriented_iou(mut self, method: OrientedIouMethod) -> Self {
        self.oriented_iou = method;
        self
    }

    /// Side length of the matrices this config produces.
    pub fn matrix_size(&self) -> usize {
        match self.task {
            Task::Detect => self.num_classes + 1,
            Task::Classify => self.num_classes,
        }
    }

    /// Reject a non-positive class count or an IoU threshold outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.num_classes == 0 {
            return Err(ConfusionError::Configuration(
                "num_classes must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ConfusionError::Configuration(format!(
                "iou_threshold must be between 0.0 and 1.0, got {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    ///
    /// # Example
    ///
    /// ```
    /// use confusion_sweep::config::{EvalConfig, Task};
    ///
    /// let config = EvalConfig::from_json_str(r#"{"num_classes": 3, "task": "classify"}"#).unwrap();
    /// assert_eq!(config.iou_threshold, 0.45);
    /// assert_eq!(config.task, Task::Classify);
    /// ```
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let config: EvalConfig = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: EvalConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::new(4);
        assert_eq!(config.iou_threshold, DEFAULT_IOU_THRESHOLD);
        assert_eq!(config.task, Task::Detect);
        assert_eq!(config.matrix_size(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_classify_matrix_size() {
        let config = EvalConfig::new(4).with_task(Task::Classify);
        assert_eq!(config.matrix_size(), 4);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(EvalConfig::new(0).validate().is_err());
        assert!(EvalConfig::new(2).with_iou_threshold(1.5).validate().is_err());
        assert!(EvalConfig::new(2).with_iou_threshold(-0.1).validate().is_err());
        assert!(EvalConfig::new(2).with_iou_threshold(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "num_classes": 2,
            "iou_threshold": 0.5,
            "oriented_iou": "bounding_extents"
        }"#;
        let config = EvalConfig::from_json_str(json).unwrap();
        assert_eq!(config.num_classes, 2);
        assert_eq!(config.iou_threshold, 0.5);
        assert_eq!(config.oriented_iou, OrientedIouMethod::BoundingExtents);
    }

    #[test]
    fn test_from_json_str_rejects_zero_classes() {
        let result = EvalConfig::from_json_str(r#"{"num_classes": 0}"#);
        assert!(matches!(result, Err(ConfusionError::Configuration(_))));
    }
}
