//! Basic evaluation example demonstrating core functionality.

use confusion_sweep::{
    metrics::iou::calculate_iou, AxisBox, BoxKind, Detection, EvalConfig, GroundTruth,
    ImageSample, MatchAccumulator,
};

const CLASS_NAMES: [&str; 2] = ["person", "car"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Confusion Matrix Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let box1 = AxisBox::new(10.0, 10.0, 60.0, 60.0);
    let box2 = AxisBox::new(30.0, 30.0, 80.0, 80.0);
    let iou = calculate_iou(&box1, &box2);
    println!("   IoU between overlapping boxes: {:.4}", iou);
    println!();

    // Example 2: Build per-image samples
    println!("2. Building Image Samples");
    let samples = vec![
        ImageSample::new("street_001.jpg", BoxKind::AxisAligned)
            .with_ground_truth(GroundTruth::new(AxisBox::new(100.0, 100.0, 300.0, 250.0), 0))
            .with_ground_truth(GroundTruth::new(AxisBox::new(350.0, 200.0, 450.0, 320.0), 1))
            .with_detection(Detection::new(AxisBox::new(105.0, 98.0, 298.0, 255.0), 0.92, 0))
            .with_detection(Detection::new(AxisBox::new(352.0, 205.0, 447.0, 318.0), 0.41, 1))
            .with_detection(Detection::new(AxisBox::new(500.0, 50.0, 560.0, 120.0), 0.35, 0)),
        ImageSample::new("street_002.jpg", BoxKind::AxisAligned)
            .with_ground_truth(GroundTruth::new(AxisBox::new(20.0, 40.0, 120.0, 200.0), 0))
            .with_detection(Detection::new(AxisBox::new(22.0, 45.0, 118.0, 205.0), 0.77, 1)),
        ImageSample::new("street_003.jpg", BoxKind::AxisAligned)
            .with_detection(Detection::new(AxisBox::new(0.0, 0.0, 40.0, 40.0), 0.66, 1)),
    ];
    println!("   Prepared {} images", samples.len());
    println!();

    // Example 3: Match once
    println!("3. Accumulating Matches");
    let mut accumulator = MatchAccumulator::new(EvalConfig::new(CLASS_NAMES.len()))?;
    let stats = accumulator.accumulate_all(&samples)?;
    println!("   {}", stats.summary_string());
    println!();

    // Example 4: Query at several thresholds
    println!("4. Confusion Matrices (rows = predicted, columns = ground truth)");
    for threshold in [0.25, 0.5, 0.8] {
        let matrix = accumulator.compute(threshold)?;
        println!("   Confidence >= {:.2}", threshold);
        println!(
            "   {:>12} {}",
            "",
            CLASS_NAMES
                .iter()
                .chain(["background"].iter())
                .map(|name| format!("{:>10}", name))
                .collect::<String>()
        );
        for (pred, row) in matrix.rows().iter().enumerate() {
            let label = CLASS_NAMES.get(pred).copied().unwrap_or("background");
            println!(
                "   {:>12} {}",
                label,
                row.iter().map(|count| format!("{:>10}", count)).collect::<String>()
            );
        }
        println!();
    }

    // Example 5: Per-class scores
    println!("5. Per-Class Scores at 0.25");
    let matrix = accumulator.compute(0.25)?;
    for (name, scores) in CLASS_NAMES.iter().zip(matrix.class_metrics()) {
        println!(
            "   {:>8}: precision {:.3}, recall {:.3}, F1 {:.3}",
            name, scores.precision, scores.recall, scores.f1
        );
    }
    println!();

    println!("=== Example Complete ===");

    Ok(())
}
