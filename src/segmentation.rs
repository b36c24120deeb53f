//! Control/normal day segmentation from device activity
//!
//! Each energy-saving device (e.g. a radiator valve) in a household reports,
//! per local day, whether it called for heat, whether it reported its
//! energy-saving status at all, and whether energy saving was active. These
//! are combined by majority vote over the household's full device roster into
//! a per-day [`DayStatus`].
//!
//! The vote is independent of any particular log format so it can be driven
//! directly from synthetic activity sets.

use crate::day_key::DayKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Energy-saving state asserted for one household-day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayStatus {
    /// Energy-saving features on: a "normal" day
    Enabled,
    /// Energy-saving features off: a "control" day
    Disabled,
    /// No clear majority; exclude from analysis
    DontUse,
}

/// Per-day activity summary for one device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceActivity {
    /// Days with any valid record from the device
    pub days_with_data: BTreeSet<DayKey>,
    /// Days on which the device called for heat
    pub days_calling_for_heat: BTreeSet<DayKey>,
    /// Days on which the device reported energy-saving status (on or off)
    pub days_saving_reported: BTreeSet<DayKey>,
    /// Days on which energy saving was active; subset of `days_saving_reported`
    pub days_saving_active: BTreeSet<DayKey>,
}

impl DeviceActivity {
    /// Days that are both calling-for-heat and status-reporting for this device
    pub fn usable_days(&self) -> impl Iterator<Item = DayKey> + '_ {
        self.days_calling_for_heat
            .intersection(&self.days_saving_reported)
            .copied()
    }
}

/// Segmentation outcome for one household
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseholdStatus {
    pub house_id: String,
    pub by_day: BTreeMap<DayKey, DayStatus>,
}

impl HouseholdStatus {
    pub fn new(house_id: impl Into<String>, by_day: BTreeMap<DayKey, DayStatus>) -> Self {
        Self {
            house_id: house_id.into(),
            by_day,
        }
    }

    /// Number of days carrying exactly `status`
    pub fn count(&self, status: DayStatus) -> usize {
        self.by_day.values().filter(|&&s| s == status).count()
    }

    /// Control (Disabled) day count
    pub fn control_days(&self) -> usize {
        self.count(DayStatus::Disabled)
    }

    /// Normal (Enabled) day count
    pub fn normal_days(&self) -> usize {
        self.count(DayStatus::Enabled)
    }
}

/// Strict majority of the whole device roster
pub fn quorum(device_count: usize) -> usize {
    device_count / 2 + 1
}

/// Classify each candidate day of a household by majority vote
///
/// A day is a candidate if ANY device both called for heat and reported its
/// saving status that day. For each candidate day the devices that reported
/// status are counted as enabled (saving active) or disabled. The day is
/// `Enabled` if enabled votes reach the quorum and outnumber disabled votes,
/// `Disabled` symmetrically, else `DontUse`. The quorum is taken against the
/// full roster, not only the devices reporting that day.
///
/// An empty device list yields an empty mapping.
///
/// # Example
/// ```
/// use etv::day_key::DayKey;
/// use etv::segmentation::{segment_activity, DayStatus, DeviceActivity};
///
/// let day = DayKey::from_ymd(2016, 3, 1).unwrap();
/// let active = DeviceActivity {
///     days_calling_for_heat: [day].into(),
///     days_saving_reported: [day].into(),
///     days_saving_active: [day].into(),
///     ..Default::default()
/// };
///
/// let status = segment_activity("H1", &[active.clone(), active]);
/// assert_eq!(status.by_day[&day], DayStatus::Enabled);
/// ```
pub fn segment_activity(house_id: &str, devices: &[DeviceActivity]) -> HouseholdStatus {
    let candidates: BTreeSet<DayKey> = devices.iter().flat_map(|d| d.usable_days()).collect();
    let quorum = quorum(devices.len());

    let by_day = candidates
        .into_iter()
        .map(|day| {
            let (enabled, disabled) = devices
                .iter()
                .filter(|d| d.days_saving_reported.contains(&day))
                .fold((0usize, 0usize), |(e, x), d| {
                    if d.days_saving_active.contains(&day) {
                        (e + 1, x)
                    } else {
                        (e, x + 1)
                    }
                });
            (day, classify(enabled, disabled, quorum))
        })
        .collect();

    HouseholdStatus::new(house_id, by_day)
}

fn classify(enabled: usize, disabled: usize, quorum: usize) -> DayStatus {
    if enabled >= quorum && enabled > disabled {
        DayStatus::Enabled
    } else if disabled >= quorum && disabled > enabled {
        DayStatus::Disabled
    } else {
        DayStatus::DontUse
    }
}
