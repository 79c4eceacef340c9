//! Core data types for detections, ground truths and box geometry.

use crate::error::{ConfusionError, Result};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in corner format (x1, y1, x2, y2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl AxisBox {
    /// Create a new axis-aligned box.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Get the area of the box.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Check that all coordinates are finite, the corners are ordered and the area
    /// does not overflow.
    ///
    /// Zero-area boxes are valid; their IoU with anything is 0.
    pub fn is_valid(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
            && self.x1 <= self.x2
            && self.y1 <= self.y2
            && self.area().is_finite()
    }
}

/// Rotated rectangle given by its center, size and angle in radians (counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
}

impl OrientedBox {
    /// Create a new oriented box.
    pub fn new(cx: f64, cy: f64, width: f64, height: f64, angle: f64) -> Self {
        Self {
            cx,
            cy,
            width,
            height,
            angle,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// The four corners in counter-clockwise order.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (sin, cos) = self.angle.sin_cos();
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(dx, dy)| {
            (
                self.cx + dx * cos - dy * sin,
                self.cy + dx * sin + dy * cos,
            )
        })
    }

    /// Smallest axis-aligned box enclosing the rotated rectangle.
    pub fn bounding_extents(&self) -> AxisBox {
        let corners = self.corners();
        let mut extents = AxisBox::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for (x, y) in corners {
            extents.x1 = extents.x1.min(x);
            extents.y1 = extents.y1.min(y);
            extents.x2 = extents.x2.max(x);
            extents.y2 = extents.y2.max(y);
        }
        extents
    }

    /// Check that all fields are finite, the extents are non-negative and the area
    /// and corners do not overflow.
    pub fn is_valid(&self) -> bool {
        [self.cx, self.cy, self.width, self.height, self.angle]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
            && self.area().is_finite()
            && self
                .corners()
                .iter()
                .all(|(x, y)| x.is_finite() && y.is_finite())
    }
}

/// Box convention used by every entry of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxKind {
    AxisAligned,
    Oriented,
}

impl BoxKind {
    /// Number of raw coordinates for this convention.
    pub fn dimensions(&self) -> usize {
        match self {
            BoxKind::AxisAligned => 4,
            BoxKind::Oriented => 5,
        }
    }
}

/// Geometry of a single detection or ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Region {
    AxisAligned(AxisBox),
    Oriented(OrientedBox),
}

impl Region {
    /// Build a region from raw coordinates in the given convention.
    ///
    /// Axis-aligned boxes take `[x1, y1, x2, y2]`, oriented boxes take
    /// `[cx, cy, w, h, angle]`.
    ///
    /// # Example
    ///
    /// ```
    /// use confusion_sweep::types::{BoxKind, Region};
    ///
    /// let region = Region::from_slice(BoxKind::AxisAligned, &[0.0, 0.0, 10.0, 10.0]).unwrap();
    /// assert_eq!(region.kind(), BoxKind::AxisAligned);
    /// assert!(Region::from_slice(BoxKind::Oriented, &[0.0, 0.0, 10.0, 10.0]).is_err());
    /// ```
    pub fn from_slice(kind: BoxKind, values: &[f64]) -> Result<Self> {
        if values.len() != kind.dimensions() {
            return Err(ConfusionError::Geometry(format!(
                "{:?} box expects {} values, got {}",
                kind,
                kind.dimensions(),
                values.len()
            )));
        }
        Ok(match kind {
            BoxKind::AxisAligned => {
                Region::AxisAligned(AxisBox::new(values[0], values[1], values[2], values[3]))
            }
            BoxKind::Oriented => Region::Oriented(OrientedBox::new(
                values[0], values[1], values[2], values[3], values[4],
            )),
        })
    }

    pub fn kind(&self) -> BoxKind {
        match self {
            Region::AxisAligned(_) => BoxKind::AxisAligned,
            Region::Oriented(_) => BoxKind::Oriented,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Region::AxisAligned(b) => b.is_valid(),
            Region::Oriented(b) => b.is_valid(),
        }
    }
}

impl From<AxisBox> for Region {
    fn from(b: AxisBox) -> Self {
        Region::AxisAligned(b)
    }
}

impl From<OrientedBox> for Region {
    fn from(b: OrientedBox) -> Self {
        Region::Oriented(b)
    }
}

/// A single detector output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub region: Region,
    /// Detector score in [0, 1]
    pub confidence: f64,
    pub class_id: usize,
}

impl Detection {
    pub fn new(region: impl Into<Region>, confidence: f64, class_id: usize) -> Self {
        Self {
            region: region.into(),
            confidence,
            class_id,
        }
    }
}

/// A single annotated object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub region: Region,
    pub class_id: usize,
}

impl GroundTruth {
    pub fn new(region: impl Into<Region>, class_id: usize) -> Self {
        Self {
            region: region.into(),
            class_id,
        }
    }
}

/// Detections and ground truths of one image, sharing one box convention.
///
/// The convention is fixed when the sample is created; entries of the other kind are
/// rejected when the sample is accumulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSample {
    pub image_id: String,
    pub box_kind: BoxKind,
    pub detections: Vec<Detection>,
    pub ground_truths: Vec<GroundTruth>,
}

impl ImageSample {
    /// Create an empty sample for one image.
    pub fn new(image_id: impl Into<String>, box_kind: BoxKind) -> Self {
        Self {
            image_id: image_id.into(),
            box_kind,
            detections: Vec::new(),
            ground_truths: Vec::new(),
        }
    }

    pub fn with_detection(mut self, detection: Detection) -> Self {
        self.detections.push(detection);
        self
    }

    pub fn with_ground_truth(mut self, ground_truth: GroundTruth) -> Self {
        self.ground_truths.push(ground_truth);
        self
    }

    pub fn with_detections(mut self, detections: impl IntoIterator<Item = Detection>) -> Self {
        self.detections.extend(detections);
        self
    }

    pub fn with_ground_truths(
        mut self,
        ground_truths: impl IntoIterator<Item = GroundTruth>,
    ) -> Self {
        self.ground_truths.extend(ground_truths);
        self
    }

    /// Check box kind, geometry, confidences and class indices of every entry.
    ///
    /// Class indices outside `[0, num_classes)` are configuration errors; everything
    /// else is an input error for this image.
    pub fn validate(&self, num_classes: usize) -> Result<()> {
        let regions = self
            .ground_truths
            .iter()
            .enumerate()
            .map(|(i, gt)| ("ground truth", i, &gt.region))
            .chain(
                self.detections
                    .iter()
                    .enumerate()
                    .map(|(i, det)| ("detection", i, &det.region)),
            );

        for (role, index, region) in regions {
            if region.kind() != self.box_kind {
                return Err(ConfusionError::input_shape(
                    &self.image_id,
                    format!(
                        "{} {} is {:?} but the image uses {:?} boxes",
                        role,
                        index,
                        region.kind(),
                        self.box_kind
                    ),
                ));
            }
            if !region.is_valid() {
                return Err(ConfusionError::input_shape(
                    &self.image_id,
                    format!("{} {} has non-finite or negative extents: {:?}", role, index, region),
                ));
            }
        }

        for (i, det) in self.detections.iter().enumerate() {
            if !(0.0..=1.0).contains(&det.confidence) {
                return Err(ConfusionError::input_shape(
                    &self.image_id,
                    format!("detection {} has confidence {} outside [0, 1]", i, det.confidence),
                ));
            }
        }

        let classes = self
            .ground_truths
            .iter()
            .map(|gt| gt.class_id)
            .chain(self.detections.iter().map(|det| det.class_id));
        for class_id in classes {
            if class_id >= num_classes {
                return Err(ConfusionError::Configuration(format!(
                    "image '{}' uses class {} outside [0, {})",
                    self.image_id, class_id, num_classes
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_box_validity() {
        assert!(AxisBox::new(0.0, 0.0, 10.0, 10.0).is_valid());
        assert!(AxisBox::new(5.0, 5.0, 5.0, 5.0).is_valid());
        assert!(!AxisBox::new(10.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!AxisBox::new(f64::NAN, 0.0, 10.0, 10.0).is_valid());
        // Finite corners whose area overflows
        assert!(!AxisBox::new(-1e200, -1e200, 1e200, 1e200).is_valid());
        assert!(!OrientedBox::new(0.0, 0.0, 1e200, 1e200, 0.0).is_valid());
        assert!(!OrientedBox::new(1.5e308, 0.0, 1e308, 1.0, 0.0).is_valid());
        assert!(OrientedBox::new(0.0, 0.0, 1e100, 1e100, 0.5).is_valid());
    }

    #[test]
    fn test_oriented_bounding_extents() {
        let obb = OrientedBox::new(0.0, 0.0, 2.0, 2.0, std::f64::consts::FRAC_PI_4);
        let extents = obb.bounding_extents();
        let half_diag = 2.0_f64.sqrt();
        assert!((extents.x1 + half_diag).abs() < 1e-9);
        assert!((extents.x2 - half_diag).abs() < 1e-9);
        assert!((extents.y1 + half_diag).abs() < 1e-9);
        assert!((extents.y2 - half_diag).abs() < 1e-9);
    }

    #[test]
    fn test_region_from_slice_dimensions() {
        let obb = Region::from_slice(BoxKind::Oriented, &[5.0, 5.0, 2.0, 4.0, 0.3]).unwrap();
        assert_eq!(obb.kind(), BoxKind::Oriented);

        let err = Region::from_slice(BoxKind::AxisAligned, &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_validate_rejects_mixed_kinds() {
        let sample = ImageSample::new("img", BoxKind::AxisAligned)
            .with_ground_truth(GroundTruth::new(AxisBox::new(0.0, 0.0, 1.0, 1.0), 0))
            .with_detection(Detection::new(OrientedBox::new(0.5, 0.5, 1.0, 1.0, 0.0), 0.9, 0));

        match sample.validate(1) {
            Err(ConfusionError::InputShape { image_id, .. }) => assert_eq!(image_id, "img"),
            other => panic!("Expected InputShape error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range_class() {
        let sample = ImageSample::new("img", BoxKind::AxisAligned)
            .with_ground_truth(GroundTruth::new(AxisBox::new(0.0, 0.0, 1.0, 1.0), 3));

        assert!(matches!(sample.validate(3), Err(ConfusionError::Configuration(_))));
        assert!(sample.validate(4).is_ok());
    }
}
