// Scenario tests for combine + fit together
//
// Uses a real run of London (EGLL, 15.5C base) daily HDD values from early
// January 2016 so the x spread is realistic.

use super::*;
use crate::day_key::DayKey;
use crate::series::{DailySeries, HddSeries};

const EGLL_2016_01_HDD: [f32; 18] = [
    10.2, 5.6, 7.8, 8.0, 7.8, 9.1, 8.3, 9.8, 6.8, 9.4, 9.6, 9.9, 10.8, 11.7, 12.7, 13.3, 13.1, 12.5,
];

fn egll_hdd() -> HddSeries {
    let by_day: DailySeries = EGLL_2016_01_HDD
        .iter()
        .enumerate()
        .map(|(i, &v)| (DayKey::from_ymd(2016, 1, i as u32 + 1).unwrap(), v))
        .collect();
    HddSeries::new(by_day, 15.5)
}

/// Noise-free synthetic household: every day exactly on the line
#[test]
fn test_synthetic_household_recovers_line() {
    let hdd = egll_hdd();
    for &(slope, baseline) in &[(0.7f32, 2.5f32), (3.3, 6.0), (9.8, 11.5)] {
        let energy: DailySeries = hdd
            .by_day
            .iter()
            .map(|(&d, &h)| (d, baseline + slope * h))
            .collect();

        let combined = combine_daily_readings_with_hdd(&energy, &hdd);
        let m = compute_hdd_metrics(&combined);

        assert_eq!(m.n, 18);
        assert!((m.r_squared - 1.0).abs() < 0.01, "r2 {}", m.r_squared);
        assert!((m.slope - slope).abs() < 0.01, "slope {} vs {}", m.slope, slope);
        assert!(
            (m.intercept - baseline).abs() < 0.02,
            "intercept {} vs {}",
            m.intercept,
            baseline
        );
    }
}

/// Meter gaps: only days with both readings count towards n
#[test]
fn test_meter_gaps_reduce_n() {
    let hdd = egll_hdd();
    let energy: DailySeries = hdd
        .by_day
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(_, (&d, &h))| (d, 4.0 + 2.0 * h))
        .collect();

    let m = compute_hdd_metrics(&combine_daily_readings_with_hdd(&energy, &hdd));

    assert_eq!(m.n, 12);
    assert!((m.slope - 2.0).abs() < 0.01);
}

/// Energy that extends beyond the HDD coverage is silently dropped
#[test]
fn test_energy_outside_hdd_range_dropped() {
    let hdd = egll_hdd();
    let mut energy: DailySeries = hdd.by_day.iter().map(|(&d, &h)| (d, 1.0 + h)).collect();
    energy.insert(DayKey::from_ymd(2016, 2, 1).unwrap(), 1000.0);
    energy.insert(DayKey::from_ymd(2015, 12, 31).unwrap(), 1000.0);

    let m = compute_hdd_metrics(&combine_daily_readings_with_hdd(&energy, &hdd));

    assert_eq!(m.n, 18);
    assert!((m.slope - 1.0).abs() < 0.01);
    assert!((m.r_squared - 1.0).abs() < 0.01);
}

/// Mild weather with identical HDD every day cannot be fitted
#[test]
fn test_constant_hdd_period_not_fittable() {
    let by_day: DailySeries = (1..=10)
        .map(|d| (DayKey::from_ymd(2016, 5, d).unwrap(), 0.0))
        .collect();
    let hdd = HddSeries::new(by_day.clone(), 15.5);
    let energy: DailySeries = by_day.keys().map(|&d| (d, 3.0)).collect();

    let m = compute_hdd_metrics(&combine_daily_readings_with_hdd(&energy, &hdd));

    assert_eq!(m.n, 10);
    assert!(m.slope.is_nan());
    assert!(m.r_squared.is_nan());
}
