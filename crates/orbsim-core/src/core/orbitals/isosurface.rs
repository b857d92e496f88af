use super::field::FieldSample;

pub const MIN_ENCLOSED_FRACTION: f64 = 0.05;
pub const MAX_ENCLOSED_FRACTION: f64 = 0.99;

/// A density threshold and the share of total probability inside its super-level set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoLevel {
    pub value: f64,
    pub fraction: f64,
}

/// Density thresholds whose super-level sets enclose evenly spaced probability fractions.
///
/// The fractions are `max_fraction / (count + 1)` up to `max_fraction`, with `max_fraction`
/// clamped to `[0.05, 0.99]`. Levels come back sorted by decreasing density, so the innermost
/// surface is first. The grid is uniform, so the voxel volume cancels out of every ratio.
pub fn enclosed_probability_levels(
    sample: &FieldSample,
    max_fraction: f64,
    count: usize,
) -> Vec<IsoLevel> {
    if count == 0 || sample.is_empty() {
        return Vec::new();
    }
    let mut density = sample.density();
    let total: f64 = density.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Vec::new();
    }
    density.sort_by(|a, b| b.total_cmp(a));

    let mut cumulative = Vec::with_capacity(density.len());
    let mut running = 0.0;
    for value in &density {
        running += value;
        cumulative.push(running);
    }

    let max_fraction = max_fraction.clamp(MIN_ENCLOSED_FRACTION, MAX_ENCLOSED_FRACTION);
    let first = max_fraction / (count + 1) as f64;
    let mut levels: Vec<IsoLevel> = (0..count)
        .map(|i| {
            let fraction = if count == 1 {
                max_fraction
            } else {
                first + (max_fraction - first) * i as f64 / (count - 1) as f64
            };
            let target = fraction * total;
            let idx = cumulative
                .partition_point(|&mass| mass < target)
                .min(density.len() - 1);
            IsoLevel {
                value: density[idx],
                fraction,
            }
        })
        .collect();
    levels.sort_by(|a, b| b.value.total_cmp(&a.value));
    levels
}
