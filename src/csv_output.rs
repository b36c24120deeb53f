//! CSV output for per-household results and cohort summaries
//!
//! All output uses `\n` line endings and a fixed, locale-independent float
//! form (see [`format_float`]).

use crate::household::{sort_by_house_id, HouseholdResult};
use crate::regression::HddMetrics;
use crate::segmentation::HouseholdStatus;
use crate::summary::SummaryStats;

/// Render a float as the shortest decimal that round-trips
///
/// Integral values keep a trailing `.0`; non-finite values are written as
/// `NaN`, `Infinity` or `-Infinity`.
///
/// # Example
/// ```
/// use etv::csv_output::format_float;
///
/// assert_eq!(format_float(1.5532478), "1.5532478");
/// assert_eq!(format_float(12.0), "12.0");
/// assert_eq!(format_float(f32::NAN), "NaN");
/// ```
pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let s = value.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{s}.0")
    }
}

/// Per-household results table
///
/// Rows are emitted sorted by house ID. A household without metrics is
/// written as its ID alone.
#[derive(Debug, Default)]
pub struct HouseholdResultsCsv {
    results: Vec<HouseholdResult>,
}

impl HouseholdResultsCsv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: HouseholdResult) {
        self.results.push(result);
    }

    fn header() -> &'static str {
        "\"house ID\",\"slope energy/HDD\",\"baseload energy\",\"R^2\",\"n\",\"efficiency gain if computed\""
    }

    /// Always-quoted text field
    fn quote_field(field: &str) -> String {
        format!("\"{}\"", field.replace('"', "\"\""))
    }

    fn format_metrics(metrics: &HddMetrics) -> String {
        format!(
            "{},{},{},{}",
            format_float(metrics.slope),
            format_float(metrics.intercept),
            format_float(metrics.r_squared),
            metrics.n
        )
    }

    fn format_result(result: &HouseholdResult) -> String {
        let id = Self::quote_field(&result.house_id);
        match &result.metrics {
            None => id,
            Some(metrics) => format!(
                "{},{},{}",
                id,
                Self::format_metrics(metrics),
                result.efficacy.map(format_float).unwrap_or_default()
            ),
        }
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut sorted = self.results.clone();
        sort_by_house_id(&mut sorted);

        let mut output = String::new();
        output.push_str(Self::header());
        output.push('\n');
        for result in &sorted {
            output.push_str(&Self::format_result(result));
            output.push('\n');
        }
        output
    }
}

impl FromIterator<HouseholdResult> for HouseholdResultsCsv {
    fn from_iter<I: IntoIterator<Item = HouseholdResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

/// Control/normal day counts per household after segmentation
pub fn status_summary_to_csv<'a, I>(statuses: I) -> String
where
    I: IntoIterator<Item = &'a HouseholdStatus>,
{
    let mut rows: Vec<&HouseholdStatus> = statuses.into_iter().collect();
    rows.sort_by(|a, b| a.house_id.cmp(&b.house_id));

    let mut output = String::from("houseID,controlDays,normalDays\n");
    for status in rows {
        output.push_str(&format!(
            "{},{},{}\n",
            status.house_id,
            status.control_days(),
            status.normal_days()
        ));
    }
    output
}

/// Cohort summary: header plus one data row, statistics narrowed to f32
pub fn summary_to_csv(stats: &SummaryStats) -> String {
    let narrow = |v: f64| format_float(v as f32);
    format!(
        "allHouseholdsCount,finalHouseholdsCount,normalDayCount,RsqMean,RsqSD,SlopeMean,SlopeSD,EfficacyMean,EfficacySD\n\
         {},{},{},{},{},{},{},{},{}\n",
        stats.all_households_count,
        stats.final_households_count,
        stats.normal_day_count,
        narrow(stats.r_squared.mean),
        narrow(stats.r_squared.p_sd),
        narrow(stats.slope.mean),
        narrow(stats.slope.p_sd),
        narrow(stats.efficacy.mean),
        narrow(stats.efficacy.p_sd),
    )
}
