//! Comprehensive edge case and boundary condition tests.

use confusion_sweep::matching::{build_record, greedy_reduce};
use confusion_sweep::{
    AxisBox, BoxKind, Detection, EvalConfig, GroundTruth, ImageSample, MatchAccumulator,
};

fn sample(id: &str) -> ImageSample {
    ImageSample::new(id, BoxKind::AxisAligned)
}

fn square(x: f64, y: f64, size: f64) -> AxisBox {
    AxisBox::new(x, y, x + size, y + size)
}

// ============================================================================
// MATCHING EDGE CASES
// ============================================================================

#[test]
fn test_empty_image() {
    let record = build_record(&sample("empty"), &EvalConfig::new(1)).unwrap();
    assert!(record.candidates().is_empty());
    assert!(record.gt_classes().is_empty());
    assert!(record.det_classes().is_empty());
}

#[test]
fn test_no_detections_keeps_ground_truths() {
    let s = sample("no-dets")
        .with_ground_truth(GroundTruth::new(square(0.0, 0.0, 10.0), 0))
        .with_ground_truth(GroundTruth::new(square(20.0, 20.0, 10.0), 1));
    let record = build_record(&s, &EvalConfig::new(2)).unwrap();
    assert_eq!(record.gt_classes(), &[0, 1]);
    assert!(record.candidates().is_empty());
}

#[test]
fn test_many_detections_one_ground_truth() {
    let mut s = sample("crowd").with_ground_truth(GroundTruth::new(square(50.0, 50.0, 100.0), 0));
    for i in 0..10 {
        let offset = i as f64;
        s = s.with_detection(Detection::new(
            square(50.0 + offset, 50.0 + offset, 100.0),
            0.9 - i as f64 * 0.05,
            0,
        ));
    }

    let mut acc = MatchAccumulator::new(EvalConfig::new(1)).unwrap();
    acc.accumulate(&s).unwrap();
    assert_eq!(acc.records()[0].candidates().len(), 1);
    assert_eq!(acc.records()[0].candidates()[0].det_index, 0);

    let matrix = acc.compute(0.0).unwrap();
    assert_eq!(matrix.get(0, 0), 1);
    assert_eq!(matrix.get(0, 1), 9);
}

#[test]
fn test_best_overlap_wins_over_best_confidence() {
    // The higher-confidence detection overlaps less; matching ignores confidence.
    let s = sample("iou-first")
        .with_ground_truth(GroundTruth::new(square(0.0, 0.0, 10.0), 0))
        .with_detection(Detection::new(AxisBox::new(0.0, 0.0, 10.0, 7.0), 0.95, 0))
        .with_detection(Detection::new(AxisBox::new(0.0, 0.0, 10.0, 9.5), 0.30, 0));

    let mut acc = MatchAccumulator::new(EvalConfig::new(1)).unwrap();
    acc.accumulate(&s).unwrap();
    assert_eq!(acc.records()[0].candidates()[0].det_index, 1);

    // At 0.5 the matched detection is not made: one FN, and the confident detection
    // is an FP since its own pair was reduced away.
    let matrix = acc.compute(0.5).unwrap();
    assert_eq!(matrix.get(1, 0), 1);
    assert_eq!(matrix.get(0, 1), 1);
    assert_eq!(matrix.get(0, 0), 0);
}

#[test]
fn test_iou_exactly_at_threshold_is_not_candidate() {
    assert!(greedy_reduce(&[vec![0.5]], 0.5).is_empty());
    assert_eq!(greedy_reduce(&[vec![0.5]], 0.4999).len(), 1);
}

#[test]
fn test_half_overlap_misses_half_threshold() {
    // 50 / (100 + eps) lands just below 0.5
    let s = sample("edge")
        .with_ground_truth(GroundTruth::new(square(0.0, 0.0, 10.0), 0))
        .with_detection(Detection::new(AxisBox::new(0.0, 0.0, 10.0, 5.0), 0.9, 0));
    let config = EvalConfig::new(1).with_iou_threshold(0.5);
    let record = build_record(&s, &config).unwrap();
    assert!(record.candidates().is_empty());
}

#[test]
fn test_iou_threshold_zero_excludes_disjoint_boxes() {
    let s = sample("disjoint")
        .with_ground_truth(GroundTruth::new(square(0.0, 0.0, 10.0), 0))
        .with_detection(Detection::new(square(10.0, 0.0, 10.0), 0.9, 0));
    let config = EvalConfig::new(1).with_iou_threshold(0.0);
    let record = build_record(&s, &config).unwrap();
    assert!(record.candidates().is_empty(), "touching boxes have IoU 0");
}

#[test]
fn test_zero_area_boxes() {
    let s = sample("degenerate")
        .with_ground_truth(GroundTruth::new(AxisBox::new(5.0, 5.0, 5.0, 5.0), 0))
        .with_detection(Detection::new(AxisBox::new(5.0, 5.0, 5.0, 5.0), 0.9, 0));

    let mut acc = MatchAccumulator::new(EvalConfig::new(1)).unwrap();
    acc.accumulate(&s).unwrap();
    let matrix = acc.compute(0.5).unwrap();
    assert_eq!(matrix.get(1, 0), 1);
    assert_eq!(matrix.get(0, 1), 1);
}

// ============================================================================
// THRESHOLD EDGE CASES
// ============================================================================

#[test]
fn test_confidence_equal_to_threshold_counts() {
    let s = sample("equal")
        .with_ground_truth(GroundTruth::new(square(0.0, 0.0, 10.0), 0))
        .with_detection(Detection::new(square(0.0, 0.0, 10.0), 0.5, 0));
    let mut acc = MatchAccumulator::new(EvalConfig::new(1)).unwrap();
    acc.accumulate(&s).unwrap();

    assert_eq!(acc.compute(0.5).unwrap().get(0, 0), 1);
}

#[test]
fn test_threshold_one_and_zero() {
    let s = sample("bounds")
        .with_ground_truth(GroundTruth::new(square(0.0, 0.0, 10.0), 0))
        .with_detection(Detection::new(square(0.0, 0.0, 10.0), 0.0, 0))
        .with_detection(Detection::new(square(50.0, 50.0, 10.0), 1.0, 0));
    let mut acc = MatchAccumulator::new(EvalConfig::new(1)).unwrap();
    acc.accumulate(&s).unwrap();

    let at_zero = acc.compute(0.0).unwrap();
    assert_eq!(at_zero.get(0, 0), 1);
    assert_eq!(at_zero.get(0, 1), 1);

    let at_one = acc.compute(1.0).unwrap();
    assert_eq!(at_one.get(0, 0), 0);
    assert_eq!(at_one.get(1, 0), 1);
    assert_eq!(at_one.get(0, 1), 1);
}

#[test]
fn test_records_unchanged_by_queries() {
    let s = sample("immutable")
        .with_ground_truth(GroundTruth::new(square(0.0, 0.0, 10.0), 0))
        .with_detection(Detection::new(square(0.0, 0.0, 10.0), 0.6, 0));
    let mut acc = MatchAccumulator::new(EvalConfig::new(1)).unwrap();
    acc.accumulate(&s).unwrap();

    let before = acc.records().to_vec();
    for t in [0.0, 0.3, 0.6, 0.9, 1.0] {
        acc.compute(t).unwrap();
    }
    assert_eq!(acc.records(), before.as_slice());
}
