//! Intersection over Union (IoU) for axis-aligned and oriented boxes.

use crate::error::{ConfusionError, Result};
use crate::types::{AxisBox, OrientedBox, Region};
use serde::{Deserialize, Serialize};

/// Added to every union so degenerate (zero-area) boxes give 0 instead of NaN.
pub const IOU_EPS: f64 = 1e-7;

/// How overlap between two oriented boxes is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientedIouMethod {
    /// Exact area of the intersected rotated rectangles.
    #[default]
    Polygon,
    /// Axis-aligned IoU of each box's bounding extents. Overestimates overlap for rotated boxes.
    BoundingExtents,
}

impl OrientedIouMethod {
    /// Whether the method only approximates rotated overlap.
    pub fn is_approximation(&self) -> bool {
        matches!(self, OrientedIouMethod::BoundingExtents)
    }
}

/// Calculate the IoU between two axis-aligned boxes.
///
/// # Example
///
/// ```
/// use confusion_sweep::metrics::iou::calculate_iou;
/// use confusion_sweep::types::AxisBox;
///
/// let box1 = AxisBox::new(0.0, 0.0, 10.0, 10.0);
/// let box2 = AxisBox::new(5.0, 5.0, 15.0, 15.0);
/// let iou = calculate_iou(&box1, &box2);
/// assert!((iou - 25.0 / 175.0).abs() < 1e-6);
/// ```
pub fn calculate_iou(box1: &AxisBox, box2: &AxisBox) -> f64 {
    let inter_w = (box1.x2.min(box2.x2) - box1.x1.max(box2.x1)).max(0.0);
    let inter_h = (box1.y2.min(box2.y2) - box1.y1.max(box2.y1)).max(0.0);
    let intersection_area = inter_w * inter_h;

    let union_area = box1.area() + box2.area() - intersection_area + IOU_EPS;

    overlap_ratio(intersection_area, union_area)
}

/// Calculate the IoU between two rotated rectangles.
pub fn calculate_oriented_iou(
    box1: &OrientedBox,
    box2: &OrientedBox,
    method: OrientedIouMethod,
) -> f64 {
    match method {
        OrientedIouMethod::BoundingExtents => {
            calculate_iou(&box1.bounding_extents(), &box2.bounding_extents())
        }
        OrientedIouMethod::Polygon => {
            let intersection_area = polygon_area(&clip_convex(&box1.corners(), &box2.corners()));
            let union_area = box1.area() + box2.area() - intersection_area + IOU_EPS;
            overlap_ratio(intersection_area, union_area)
        }
    }
}

/// IoU between two regions of the same kind, `None` when the kinds differ.
pub fn region_iou(region1: &Region, region2: &Region, method: OrientedIouMethod) -> Option<f64> {
    match (region1, region2) {
        (Region::AxisAligned(a), Region::AxisAligned(b)) => Some(calculate_iou(a, b)),
        (Region::Oriented(a), Region::Oriented(b)) => Some(calculate_oriented_iou(a, b, method)),
        _ => None,
    }
}

/// Calculate the IoU matrix between ground truths (rows) and detections (columns).
///
/// `result[i][j]` is the IoU between `ground_truths[i]` and `detections[j]`.
///
/// # Errors
///
/// Returns a `Geometry` error if the two sets mix axis-aligned and oriented boxes.
///
/// # Example
///
/// ```
/// use confusion_sweep::metrics::iou::{calculate_iou_matrix, OrientedIouMethod};
/// use confusion_sweep::types::{AxisBox, Region};
///
/// let gts = vec![Region::from(AxisBox::new(0.0, 0.0, 10.0, 10.0))];
/// let dets = vec![
///     Region::from(AxisBox::new(0.0, 0.0, 10.0, 10.0)),
///     Region::from(AxisBox::new(20.0, 20.0, 30.0, 30.0)),
/// ];
/// let matrix = calculate_iou_matrix(&gts, &dets, OrientedIouMethod::Polygon).unwrap();
/// assert_eq!(matrix.len(), 1);
/// assert_eq!(matrix[0].len(), 2);
/// assert_eq!(matrix[0][1], 0.0);
/// ```
pub fn calculate_iou_matrix(
    ground_truths: &[Region],
    detections: &[Region],
    method: OrientedIouMethod,
) -> Result<Vec<Vec<f64>>> {
    ground_truths
        .iter()
        .map(|gt| {
            detections
                .iter()
                .map(|det| {
                    region_iou(gt, det, method).ok_or_else(|| {
                        ConfusionError::Geometry(format!(
                            "cannot compare {:?} box with {:?} box",
                            gt.kind(),
                            det.kind()
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect()
}

/// Intersection over union clamped to [0, 1]; areas that overflowed give 0.
fn overlap_ratio(intersection_area: f64, union_area: f64) -> f64 {
    let ratio = intersection_area / union_area;
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Signed distance-like test: positive when `p` lies left of the directed edge `a -> b`.
fn side(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

/// Sutherland–Hodgman clipping of `subject` by the counter-clockwise convex polygon `clip`.
fn clip_convex(subject: &[(f64, f64)], clip: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut output: Vec<(f64, f64)> = subject.to_vec();

    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }
        let a = clip[i];
        let b = clip[(i + 1) % clip.len()];
        let input = std::mem::take(&mut output);

        for j in 0..input.len() {
            let current = input[j];
            let previous = input[(j + input.len() - 1) % input.len()];
            let s_cur = side(a, b, current);
            let s_prev = side(a, b, previous);

            if s_cur >= 0.0 {
                if s_prev < 0.0 {
                    output.push(edge_crossing(previous, current, s_prev, s_cur));
                }
                output.push(current);
            } else if s_prev >= 0.0 {
                output.push(edge_crossing(previous, current, s_prev, s_cur));
            }
        }
    }

    output
}

fn edge_crossing(p: (f64, f64), q: (f64, f64), s_p: f64, s_q: f64) -> (f64, f64) {
    let t = s_p / (s_p - s_q);
    (p.0 + t * (q.0 - p.0), p.1 + t * (q.1 - p.1))
}

/// Shoelace area of a simple polygon.
fn polygon_area(points: &[(f64, f64)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: f64 = (0..points.len())
        .map(|i| {
            let (x1, y1) = points[i];
            let (x2, y2) = points[(i + 1) % points.len()];
            x1 * y2 - x2 * y1
        })
        .sum();
    twice_area.abs() / 2.0
}
