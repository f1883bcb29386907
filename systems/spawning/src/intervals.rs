//! Randomised spawn gap generation.

use rand::Rng;

/// Generates the spawn gaps for a wave of `count` hazards.
///
/// Each gap is the delay since the previous spawn, or since the wave started
/// for the first entry. Gaps are drawn as `base_interval_ms` plus a uniform
/// jitter in `[-variance_ms / 2, variance_ms / 2]` and clamped to
/// `floor_ms` (itself never below zero).
pub fn generate<R>(
    count: usize,
    base_interval_ms: f64,
    variance_ms: f64,
    floor_ms: f64,
    rng: &mut R,
) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    let floor = floor_ms.max(0.0);
    (0..count)
        .map(|_| (base_interval_ms + sample_jitter(rng, variance_ms)).max(floor))
        .collect()
}

/// Draws from the closed range `[low, high]`, collapsing degenerate ranges to `low`.
pub(crate) fn sample_uniform<R>(rng: &mut R, low: f64, high: f64) -> f64
where
    R: Rng + ?Sized,
{
    let span = high - low;
    if !(span > 0.0) || !span.is_finite() {
        return low;
    }
    rng.gen_range(low..=high)
}

/// Draws a symmetric offset whose full width is `variance`.
pub(crate) fn sample_jitter<R>(rng: &mut R, variance: f64) -> f64
where
    R: Rng + ?Sized,
{
    let half = variance / 2.0;
    sample_uniform(rng, -half, half)
}
