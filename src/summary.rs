//! Cohort summary statistics across per-household results
//!
//! The final households are treated as the whole population: variance is
//! divided by N, not N - 1. Values are accumulated in f64.

use crate::household::HouseholdResult;
use serde::Serialize;

/// Mean with population variance and standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanAndPopSd {
    pub mean: f64,
    pub p_variance: f64,
    pub p_sd: f64,
}

impl MeanAndPopSd {
    /// Population statistics of `values`; all NaN for an empty slice
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: f64::NAN,
                p_variance: f64::NAN,
                p_sd: f64::NAN,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let p_variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            p_variance,
            p_sd: p_variance.sqrt(),
        }
    }
}

/// Summary of a cohort of households
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Households before any filtering
    pub all_households_count: usize,
    /// Households contributing to this summary
    pub final_households_count: usize,
    /// Sum of normal-segment sample counts
    pub normal_day_count: usize,
    pub r_squared: MeanAndPopSd,
    pub slope: MeanAndPopSd,
    pub efficacy: MeanAndPopSd,
}

/// Summarize `results` drawn from a cohort of `all_households_count` households
///
/// Results without metrics add nothing to the normal day count and a NaN to
/// each statistic; a missing efficacy is likewise NaN.
///
/// # Panics
/// If `all_households_count` is smaller than the number of results.
pub fn compute_summary_stats(all_households_count: usize, results: &[HouseholdResult]) -> SummaryStats {
    assert!(
        all_households_count >= results.len(),
        "all households count {} smaller than final count {}",
        all_households_count,
        results.len()
    );

    let normal_day_count = results
        .iter()
        .filter_map(|r| r.metrics.as_ref())
        .map(|m| m.n)
        .sum();

    let collect = |f: &dyn Fn(&HouseholdResult) -> Option<f32>| -> Vec<f64> {
        results
            .iter()
            .map(|r| f(r).map_or(f64::NAN, f64::from))
            .collect()
    };
    let r_squared = collect(&|r| r.metrics.map(|m| m.r_squared));
    let slope = collect(&|r| r.metrics.map(|m| m.slope));
    let efficacy = collect(&|r| r.efficacy);

    SummaryStats {
        all_households_count,
        final_households_count: results.len(),
        normal_day_count,
        r_squared: MeanAndPopSd::of(&r_squared),
        slope: MeanAndPopSd::of(&slope),
        efficacy: MeanAndPopSd::of(&efficacy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::HddMetrics;

    fn result(id: &str, slope: f32, r_squared: f32, n: usize, efficacy: f32) -> HouseholdResult {
        HouseholdResult {
            house_id: id.to_string(),
            metrics: Some(HddMetrics::new(slope, 4.0, r_squared, n)),
            efficacy: Some(efficacy),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_empty_is_nan() {
        let s = compute_summary_stats(0, &[]);
        assert_eq!(s.all_households_count, 0);
        assert_eq!(s.final_households_count, 0);
        assert_eq!(s.normal_day_count, 0);
        for stat in [s.r_squared, s.slope, s.efficacy] {
            assert!(stat.mean.is_nan());
            assert!(stat.p_variance.is_nan());
            assert!(stat.p_sd.is_nan());
        }
    }

    #[test]
    fn test_singleton_has_zero_spread() {
        let s = compute_summary_stats(1, &[result("H1", 1.5, 0.8, 42, 1.3)]);

        assert_eq!(s.final_households_count, 1);
        assert_eq!(s.normal_day_count, 42);
        assert!(close(s.r_squared.mean, 0.8));
        assert!(close(s.slope.mean, 1.5));
        assert!(close(s.efficacy.mean, 1.3));
        for stat in [s.r_squared, s.slope, s.efficacy] {
            assert_eq!(stat.p_variance, 0.0);
            assert_eq!(stat.p_sd, 0.0);
        }
    }

    #[test]
    fn test_multiple_households_population_sd() {
        let results = [
            result("A", 1.5, 0.6, 10, 1.1),
            result("B", 5.5, 0.8, 20, 1.3),
            result("C", 1.5, 0.6, 15, 1.1),
            result("D", 5.5, 0.8, 25, 1.3),
            result("E", 3.5, 0.7, 13, 1.2),
        ];

        let s = compute_summary_stats(8, &results);

        assert_eq!(s.all_households_count, 8);
        assert_eq!(s.final_households_count, 5);
        assert_eq!(s.normal_day_count, 83);
        assert!(close(s.r_squared.mean, 0.7));
        assert!(close(s.slope.mean, 3.5));
        assert!(close(s.efficacy.mean, 1.2));
        // Slope deviations (-2, 2, -2, 2, 0): population variance 16 / 5
        assert!(close(s.slope.p_variance, 3.2), "{}", s.slope.p_variance);
        assert!(close(s.slope.p_sd, 3.2f64.sqrt()));
        assert!(close(s.r_squared.p_sd, 0.008f64.sqrt()));
        assert!(close(s.efficacy.p_sd, 0.008f64.sqrt()));
    }

    #[test]
    fn test_null_metrics_count_zero_days_and_poison_means() {
        let results = [
            result("A", 2.0, 0.9, 30, 1.2),
            HouseholdResult::not_computable("B"),
        ];

        let s = compute_summary_stats(2, &results);

        assert_eq!(s.normal_day_count, 30);
        assert!(s.slope.mean.is_nan());
        assert!(s.r_squared.mean.is_nan());
        assert!(s.efficacy.mean.is_nan());
    }

    #[test]
    fn test_missing_efficacy_only_affects_efficacy() {
        let mut b = result("B", 4.0, 0.7, 10, 0.0);
        b.efficacy = None;

        let s = compute_summary_stats(2, &[result("A", 2.0, 0.9, 30, 1.2), b]);

        assert!(close(s.slope.mean, 3.0));
        assert!(s.efficacy.mean.is_nan());
    }

    #[test]
    #[should_panic(expected = "smaller than final count")]
    fn test_final_exceeding_all_panics() {
        compute_summary_stats(1, &[result("A", 1.0, 1.0, 1, 1.0), result("B", 1.0, 1.0, 1, 1.0)]);
    }
}
