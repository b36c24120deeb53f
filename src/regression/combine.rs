// Day-aligned merge of an energy series with an HDD series
//
// Only days present in BOTH series produce a sample. Day-level availability is
// expected to be imperfect (meter gaps, weather station gaps), so a missing
// HDD day is skipped silently rather than treated as an error.

use crate::day_key::DayKey;
use crate::series::{DailySeries, HddSeries};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// One day's (HDD, energy) pair
///
/// Totally ordered by day, then HDD, then energy (IEEE total order), so that
/// inserting the same day twice into a set is idempotent.
#[derive(Debug, Clone, Copy)]
pub struct ConsumptionHddSample {
    pub day: DayKey,
    pub hdd: f32,
    pub energy: f32,
}

impl PartialEq for ConsumptionHddSample {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ConsumptionHddSample {}

impl PartialOrd for ConsumptionHddSample {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ConsumptionHddSample {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day
            .cmp(&other.day)
            .then_with(|| self.hdd.total_cmp(&other.hdd))
            .then_with(|| self.energy.total_cmp(&other.energy))
    }
}

/// Pair each energy day with the same day's HDD value
///
/// Days present only in the HDD series, or only in the energy series, do not
/// appear in the result. An empty result is legal; the fit reports n = 0.
///
/// # Example
/// ```
/// use etv::day_key::DayKey;
/// use etv::regression::combine_daily_readings_with_hdd;
/// use etv::series::{DailySeries, HddSeries};
///
/// let d = |v| DayKey::try_from(v).unwrap();
/// let energy: DailySeries = [(d(20160101), 30.0), (d(20160102), 25.0)].into();
/// let hdd = HddSeries::new([(d(20160102), 8.0), (d(20160103), 9.0)].into(), 15.5);
///
/// let samples = combine_daily_readings_with_hdd(&energy, &hdd);
/// assert_eq!(samples.len(), 1);
/// ```
pub fn combine_daily_readings_with_hdd(
    energy_by_day: &DailySeries,
    hdd: &HddSeries,
) -> BTreeSet<ConsumptionHddSample> {
    energy_by_day
        .iter()
        .filter_map(|(&day, &energy)| {
            hdd.get(day).map(|hdd| ConsumptionHddSample { day, hdd, energy })
        })
        .collect()
}
