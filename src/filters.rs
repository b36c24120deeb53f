//! Quality filters for per-household results and segmentations
//!
//! Used between pipeline stages to drop households with missing, sparse or
//! poorly-fitting data before they reach the cohort summary.

use crate::config::EtvConfig;
use crate::household::HouseholdResult;
use crate::segmentation::HouseholdStatus;

/// Minimum acceptable R² for daily-sampled data
pub const MIN_RSQUARED_DAILY_DATA: f32 = 0.15;

/// Minimum samples for one daily data subset (control or normal)
pub const MIN_N_DAILY_DATA: usize = 7;

pub fn has_metrics(r: &HouseholdResult) -> bool {
    r.metrics.is_some()
}

/// Metrics present with finite slope, intercept and R²
pub fn has_defined_fit(r: &HouseholdResult) -> bool {
    r.metrics.is_some_and(|m| m.is_defined())
}

/// R² present and at least `min`; NaN never passes
pub fn is_ok_daily_rsq(r: &HouseholdResult, min: f32) -> bool {
    r.metrics.is_some_and(|m| m.r_squared >= min)
}

/// Enough samples for one subset
pub fn is_enough_points_subset(r: &HouseholdResult, min_n: usize) -> bool {
    r.metrics.is_some_and(|m| m.n >= min_n)
}

/// Enough samples to later split into control and normal subsets
pub fn is_enough_points_control_and_normal(r: &HouseholdResult, min_n: usize) -> bool {
    r.metrics.is_some_and(|m| m.n >= 2 * min_n)
}

/// Pre-segmentation filter: a defined fit, enough points for both subsets
/// and a usable daily R²
pub fn good_daily_data_results(r: &HouseholdResult, config: &EtvConfig) -> bool {
    has_defined_fit(r)
        && is_enough_points_control_and_normal(r, config.min_days_per_segment)
        && is_ok_daily_rsq(r, config.min_rsquared_daily)
}

/// At least `min_n` control days and `min_n` normal days
pub fn enough_control_and_normal(status: &HouseholdStatus, min_n: usize) -> bool {
    status.control_days() >= min_n && status.normal_days() >= min_n
}
