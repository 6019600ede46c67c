//! Biased accept/reject draws and biased integers.

use rand::Rng;

/// Default number of candidates `biased_int` draws before giving up.
pub const DEFAULT_ATTEMPTS: u32 = 100;

/// Shape of the acceptance curve used by [`biased_int`].
///
/// Each curve maps a normalised candidate `x` in `[0, 1]` to an acceptance
/// probability in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bias {
    #[default]
    Unbiased,
    /// Favours small values: `1 - x`.
    LinearLow,
    /// Favours large values: `x`.
    LinearHigh,
    /// Strongly favours small values: `1 - sqrt(x)`.
    ExpLow,
    /// Strongly favours large values: `sqrt(x)`.
    ExpHigh,
}

impl Bias {
    pub fn weight(self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        match self {
            Bias::Unbiased => 1.0,
            Bias::LinearLow => 1.0 - x,
            Bias::LinearHigh => x,
            Bias::ExpLow => 1.0 - x.sqrt(),
            Bias::ExpHigh => x.sqrt(),
        }
    }
}

/// Returns `true` with probability `percent / 100`.
///
/// The draw has a granularity of 1/10 000. Values at or below 0.001 never
/// accept and values above 99.999 always do.
pub fn biased_accept(rng: &mut impl Rng, percent: f64) -> bool {
    let percent = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };

    if percent < 0.001 {
        return false;
    }
    if percent > 99.999 {
        return true;
    }

    let threshold = (percent * 100.0).round() as u32;
    rng.gen_range(0..=10_000u32) <= threshold
}

/// Draws an integer in `[min, max]` whose distribution follows `bias`.
pub fn biased_int(rng: &mut impl Rng, min: i64, max: i64, bias: Bias) -> i64 {
    biased_int_with_attempts(rng, min, max, bias, DEFAULT_ATTEMPTS)
}

/// Rejection-samples candidates against the bias curve.
///
/// When every attempt is rejected the last candidate is returned, so the
/// result is always within bounds but the distribution is only approximate for
/// curves that are close to zero everywhere.
pub fn biased_int_with_attempts(
    rng: &mut impl Rng,
    min: i64,
    max: i64,
    bias: Bias,
    attempts: u32,
) -> i64 {
    let (min, max) = if min > max { (max, min) } else { (min, max) };
    let attempts = attempts.max(1);

    let mut candidate = min;
    for _ in 0..attempts {
        candidate = rng.gen_range(min..=max);
        let x = if max == 0 {
            0.0
        } else {
            candidate as f64 / max as f64
        };

        if biased_accept(rng, bias.weight(x) * 100.0) {
            return candidate;
        }
    }

    candidate
}
