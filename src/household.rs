//! Per-household space-heating efficiency and efficacy computation
//!
//! For one household this regresses daily heating-fuel energy against HDD.
//! Without a per-day status it reports one overall fit. With a status it
//! fits control (Disabled) and normal (Enabled) days separately and reports
//! the efficacy ratio `control slope / normal slope`; above 1.0 means the
//! energy-saving features reduced energy use per HDD.
//!
//! Inputs are plain values. The HDD series is shared behind an [`Arc`] so
//! many households (and worker threads) can reference one weather record.

use crate::regression::{combine_daily_readings_with_hdd, compute_hdd_metrics, HddMetrics};
use crate::segmentation::{DayStatus, HouseholdStatus};
use crate::series::{DailySeries, HddSeries};
use crate::day_key::DayKey;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything needed to analyse one household
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdInput {
    /// Unique (cohort-wide) house ID
    pub house_id: String,
    /// Heating fuel energy (kWh) by local day; may be empty
    pub kwh_by_day: DailySeries,
    /// HDD by local day plus base temperature; shared read-only
    pub hdd: Arc<HddSeries>,
    /// Per-day energy-saving status; `None` runs the unsegmented analysis
    pub status_by_day: Option<BTreeMap<DayKey, DayStatus>>,
}

impl HouseholdInput {
    pub fn new(house_id: impl Into<String>, kwh_by_day: DailySeries, hdd: Arc<HddSeries>) -> Self {
        Self {
            house_id: house_id.into(),
            kwh_by_day,
            hdd,
            status_by_day: None,
        }
    }

    pub fn with_status(mut self, status_by_day: BTreeMap<DayKey, DayStatus>) -> Self {
        self.status_by_day = Some(status_by_day);
        self
    }

    /// Fold a segmentation into this input
    ///
    /// # Panics
    /// If the input already carries a status, or the house IDs differ.
    pub fn inject_status(&self, status: &HouseholdStatus) -> Self {
        assert!(
            self.status_by_day.is_none(),
            "household {} already has status",
            self.house_id
        );
        assert_eq!(
            self.house_id, status.house_id,
            "mismatched house IDs when injecting status"
        );
        self.clone().with_status(status.by_day.clone())
    }

    /// View of this input keeping only energy days that carry exactly `status`
    ///
    /// HDD, base temperature, house ID and the status map pass through as-is.
    ///
    /// # Panics
    /// If the input has no status map.
    pub fn filter_by_status(&self, status: DayStatus) -> Self {
        let statuses = self
            .status_by_day
            .as_ref()
            .unwrap_or_else(|| panic!("household {} has no status to filter by", self.house_id));

        let kwh_by_day = statuses
            .iter()
            .filter(|(_, &s)| s == status)
            .filter_map(|(day, _)| self.kwh_by_day.get(day).map(|&kwh| (*day, kwh)))
            .collect();

        Self {
            house_id: self.house_id.clone(),
            kwh_by_day,
            hdd: Arc::clone(&self.hdd),
            status_by_day: self.status_by_day.clone(),
        }
    }
}

/// Outcome of analysing one household
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdResult {
    pub house_id: String,
    /// Regression metrics (the normal segment when segmented); `None` if not computable
    pub metrics: Option<HddMetrics>,
    /// Control slope over normal slope; `None` if not computed
    pub efficacy: Option<f32>,
}

impl HouseholdResult {
    pub fn not_computable(house_id: impl Into<String>) -> Self {
        Self {
            house_id: house_id.into(),
            metrics: None,
            efficacy: None,
        }
    }
}

/// Analyse one household
///
/// - empty energy series: not computable (no metrics, no efficacy)
/// - no status: overall fit, no efficacy
/// - status present: separate control/normal fits; metrics are the normal
///   fit and efficacy is `control.slope / normal.slope`, with IEEE-754
///   Infinity/NaN passed through when the normal slope is zero
pub fn compute(input: &HouseholdInput) -> HouseholdResult {
    if input.status_by_day.is_none() {
        return compute_unsegmented(input);
    }

    let control = compute_unsegmented(&input.filter_by_status(DayStatus::Disabled));
    let normal = compute_unsegmented(&input.filter_by_status(DayStatus::Enabled));

    let efficacy = match (control.metrics, normal.metrics) {
        (Some(c), Some(n)) => Some(c.slope / n.slope),
        _ => None,
    };

    tracing::debug!(
        house_id = %input.house_id,
        control_n = control.metrics.map_or(0, |m| m.n),
        normal_n = normal.metrics.map_or(0, |m| m.n),
        ?efficacy,
        "segmented household analysis"
    );

    HouseholdResult {
        house_id: input.house_id.clone(),
        metrics: normal.metrics,
        efficacy,
    }
}

fn compute_unsegmented(input: &HouseholdInput) -> HouseholdResult {
    if input.kwh_by_day.is_empty() {
        return HouseholdResult::not_computable(input.house_id.as_str());
    }

    let combined = combine_daily_readings_with_hdd(&input.kwh_by_day, &input.hdd);
    let metrics = compute_hdd_metrics(&combined);

    HouseholdResult {
        house_id: input.house_id.clone(),
        metrics: Some(metrics),
        efficacy: None,
    }
}

/// Analyse many households, optionally across `workers` threads
///
/// Households are independent; the output is sorted by house ID regardless
/// of scheduling.
pub fn compute_all(inputs: &[HouseholdInput], workers: usize) -> Vec<HouseholdResult> {
    let workers = workers.max(1);

    let mut results: Vec<HouseholdResult> = if workers == 1 || inputs.len() < 2 {
        inputs.iter().map(compute).collect()
    } else {
        let chunk_size = inputs.len().div_ceil(workers);
        crossbeam::thread::scope(|s| {
            let handles: Vec<_> = inputs
                .chunks(chunk_size)
                .map(|chunk| s.spawn(move |_| chunk.iter().map(compute).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
        .unwrap_or_else(|e| std::panic::resume_unwind(e))
    };

    sort_by_house_id(&mut results);
    results
}

/// Deterministic report order
pub fn sort_by_house_id(results: &mut [HouseholdResult]) {
    results.sort_by(|a, b| a.house_id.cmp(&b.house_id));
}
