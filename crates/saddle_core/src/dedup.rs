use crate::model::FixedPoint;
use std::collections::HashSet;

/// Default number of decimal digits used when comparing fixed points.
pub const DEFAULT_PRECISION: u32 = 10;

/// Removes near-duplicate fixed points.
///
/// Every coordinate of every point is independently rounded to `digits`
/// decimal places; two points are duplicates iff all of their rounded
/// coordinates are equal. The first occurrence wins and input order is
/// preserved. The retained points carry the rounded canonical values, which
/// makes the operation idempotent for any precision.
pub fn eliminate_redundant(points: &[FixedPoint], digits: u32) -> Vec<FixedPoint> {
    let scale = 10f64.powi(digits as i32);
    let mut seen = HashSet::new();
    let mut kept = Vec::new();

    for point in points {
        let rounded: FixedPoint = point
            .iter()
            .map(|(name, &value)| (name.clone(), round_to(value, scale)))
            .collect();
        let key: Vec<(String, u64)> = rounded
            .iter()
            .map(|(name, &value)| (name.clone(), canonical_bits(value)))
            .collect();
        if seen.insert(key) {
            kept.push(rounded);
        }
    }

    kept
}

fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

// Collapses -0.0 onto 0.0 so the two round-trip to the same key.
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}
