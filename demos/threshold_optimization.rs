//! Example demonstrating confidence threshold optimization for best F1 score.

use confusion_sweep::{
    find_best_threshold, generate_threshold_range, sweep, AxisBox, BoxKind, Detection,
    EvalConfig, GroundTruth, ImageSample, MatchAccumulator,
};

/// Synthetic detector output: every object is found, but weaker hits score lower and
/// a few confident false alarms are mixed in.
fn synthetic_samples() -> Vec<ImageSample> {
    (0..40)
        .map(|image| {
            let mut sample = ImageSample::new(format!("frame_{:04}", image), BoxKind::AxisAligned);
            for obj in 0..5 {
                let x = obj as f64 * 80.0;
                let jitter = ((image * 7 + obj * 3) % 10) as f64;
                let confidence = 0.3 + ((image + obj * 11) % 70) as f64 / 100.0;
                sample = sample
                    .with_ground_truth(GroundTruth::new(
                        AxisBox::new(x, 0.0, x + 60.0, 60.0),
                        obj % 3,
                    ))
                    .with_detection(Detection::new(
                        AxisBox::new(x + jitter, jitter, x + 60.0 + jitter, 60.0),
                        confidence,
                        obj % 3,
                    ));
            }
            if image % 4 == 0 {
                sample = sample.with_detection(Detection::new(
                    AxisBox::new(500.0, 500.0, 540.0, 540.0),
                    0.55 + (image % 10) as f64 / 30.0,
                    image % 3,
                ));
            }
            sample
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Confidence Threshold Optimization Example ===\n");

    // Example 1: Generate threshold range
    println!("1. Generating Threshold Range");
    let thresholds = generate_threshold_range(0.0, 1.0, 11)?;
    println!("   Generated {} thresholds:", thresholds.len());
    println!("   {:?}", thresholds);
    println!();

    // Example 2: Match once, sweep many thresholds
    println!("2. Precision/Recall at Different Thresholds");
    let mut accumulator = MatchAccumulator::new(EvalConfig::new(3))?;
    accumulator.accumulate_all(&synthetic_samples())?;

    let points = sweep(&accumulator, &thresholds)?;
    println!("   Threshold | Precision | Recall | F1 Score");
    println!("   ----------|-----------|--------|----------");
    for point in &points {
        println!(
            "   {:>8.2} | {:>9.4} | {:>6.4} | {:>8.4}",
            point.threshold, point.precision, point.recall, point.f1
        );
    }
    println!();

    // Example 3: Find optimal threshold
    println!("3. Finding Optimal Threshold");
    if let Some(best) = find_best_threshold(&points) {
        println!("   Best F1 Score: {:.4}", best.f1);
        println!("   Optimal Threshold: {:.2}", best.threshold);
        println!(
            "   TP={}, FP={}, FN={}",
            best.true_positives, best.false_positives, best.false_negatives
        );
    }
    println!();

    // Example 4: Refine around the optimum without recomputing any IoU
    println!("4. Fine-Grained Sweep");
    let fine_range = generate_threshold_range(0.4, 0.8, 41)?;
    let fine_points = sweep(&accumulator, &fine_range)?;
    if let Some(best) = find_best_threshold(&fine_points) {
        println!("   Best F1 Score: {:.4} at {:.2}", best.f1, best.threshold);
    }
    println!();

    println!("=== Example Complete ===");

    Ok(())
}
