//! Daily time series keyed by local day
//!
//! Energy use (kWh) and Heating Degree Days (Celsius-days) are both held as a
//! [`DailySeries`]: an ordered map from [`DayKey`] to value. An empty series
//! is the "no data" signal; there is no absent/null series.

use crate::day_key::DayKey;
use std::collections::BTreeMap;

/// Ordered day -> value mapping, iterated in ascending day order
pub type DailySeries = BTreeMap<DayKey, f32>;

/// HDD values by local day plus the base temperature they were computed for
#[derive(Debug, Clone, PartialEq)]
pub struct HddSeries {
    /// Heating Degree Days by local day; may be empty
    pub by_day: DailySeries,
    /// Base temperature (C); may be NaN if unknown or not constant, never infinite
    pub base_temperature_c: f32,
}

impl HddSeries {
    pub fn new(by_day: DailySeries, base_temperature_c: f32) -> Self {
        debug_assert!(!base_temperature_c.is_infinite());
        Self {
            by_day,
            base_temperature_c,
        }
    }

    pub fn len(&self) -> usize {
        self.by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    pub fn get(&self, day: DayKey) -> Option<f32> {
        self.by_day.get(&day).copied()
    }
}
