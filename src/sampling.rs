// Random sample data generation
use rand::Rng;

use crate::db::models::NewDataPoint;
use crate::settings::ValueRange;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Draw one data point: a real value from `real_range`, and a target equal to
/// the real value scaled by a factor from `multiplier_range`.
pub fn sample_data_point<R: Rng + ?Sized>(
    rng: &mut R,
    real_range: &ValueRange,
    multiplier_range: &ValueRange,
) -> NewDataPoint {
    let real = round2(rng.gen_range(real_range.min..=real_range.max));
    let target = round2(real * rng.gen_range(multiplier_range.min..=multiplier_range.max));

    NewDataPoint {
        real_value: real,
        target_value: target,
    }
}

pub fn sample_data_points<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    real_range: &ValueRange,
    multiplier_range: &ValueRange,
) -> Vec<NewDataPoint> {
    (0..count)
        .map(|_| sample_data_point(rng, real_range, multiplier_range))
        .collect()
}
