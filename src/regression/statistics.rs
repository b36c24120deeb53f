// Ordinary least-squares fit of daily energy against HDD
//
// Closed-form OLS over the running sums (Σx, Σy, Σxy, Σx², Σy²), accumulated
// in f64. Degenerate input (no samples, or no spread in HDD) is NOT an error:
// slope, intercept and R² come back NaN and `n` still reports the true
// sample count so callers can judge "enough data" independently of fit.

use crate::regression::combine::ConsumptionHddSample;
use serde::{Deserialize, Serialize};

/// Result of regressing energy (y) on HDD (x)
///
/// Values are held at `f32` precision; anything beyond that is spurious for
/// metered daily data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HddMetrics {
    /// Energy per HDD (e.g. kWh/HDD)
    pub slope: f32,

    /// Baseline daily energy (at zero HDD)
    pub intercept: f32,

    /// Coefficient of determination; NaN when undefined
    pub r_squared: f32,

    /// Number of samples the fit was computed over
    pub n: usize,
}

impl HddMetrics {
    pub fn new(slope: f32, intercept: f32, r_squared: f32, n: usize) -> Self {
        Self {
            slope,
            intercept,
            r_squared,
            n,
        }
    }

    /// Metrics for a fit that could not be computed over `n` samples
    pub fn undefined(n: usize) -> Self {
        Self::new(f32::NAN, f32::NAN, f32::NAN, n)
    }

    /// True if slope, intercept and R² are all finite
    pub fn is_defined(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite() && self.r_squared.is_finite()
    }
}

/// Fit y = slope·x + intercept over (HDD, energy) samples
///
/// - n = 0: all NaN
/// - all HDD values identical (includes n = 1): all NaN, n reported
/// - otherwise closed-form OLS; R² is the squared Pearson correlation,
///   which equals 1 − SSres/SStot for a least-squares line with intercept
///
/// # Example
/// ```
/// use etv::day_key::DayKey;
/// use etv::regression::{compute_hdd_metrics, ConsumptionHddSample};
///
/// let samples: Vec<_> = (1..=5)
///     .map(|i| ConsumptionHddSample {
///         day: DayKey::from_ymd(2016, 1, i).unwrap(),
///         hdd: i as f32,
///         energy: 3.0 + 2.0 * i as f32,
///     })
///     .collect();
///
/// let m = compute_hdd_metrics(&samples);
/// assert!((m.slope - 2.0).abs() < 1e-4);
/// assert!((m.intercept - 3.0).abs() < 1e-4);
/// assert_eq!(m.n, 5);
/// ```
pub fn compute_hdd_metrics<'a, I>(samples: I) -> HddMetrics
where
    I: IntoIterator<Item = &'a ConsumptionHddSample>,
{
    let mut n = 0usize;
    let (mut sx, mut sy, mut sxy, mut sxx, mut syy) = (0.0f64, 0.0f64, 0.0f64, 0.0f64, 0.0f64);
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;

    for sample in samples {
        let x = f64::from(sample.hdd);
        let y = f64::from(sample.energy);
        n += 1;
        sx += x;
        sy += y;
        sxy += x * y;
        sxx += x * x;
        syy += y * y;
        x_min = x_min.min(x);
        x_max = x_max.max(x);
    }

    // Explicit check: the denominator may not round to exactly zero.
    if n == 0 || x_min == x_max {
        return HddMetrics::undefined(n);
    }

    let nf = n as f64;
    let cov = nf * sxy - sx * sy;
    let var_x = nf * sxx - sx * sx;
    let var_y = nf * syy - sy * sy;

    let slope = cov / var_x;
    let intercept = (sy - slope * sx) / nf;
    let r_squared = (cov * cov) / (var_x * var_y);

    HddMetrics::new(slope as f32, intercept as f32, r_squared as f32, n)
}
