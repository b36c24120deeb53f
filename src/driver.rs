//! Directory-to-directory ETV pipeline
//!
//! Reads fixed-name inputs from one directory and writes fixed-name CSV
//! reports to another (possibly the same) directory:
//!
//! 1. unsegmented stats for every household (`10_...`)
//! 2. the subset with good daily data (`20_...`)
//! 3. if device logs are grouped by household: control/normal day counts
//!    (`30_...`), segmented stats with efficacy (`31_...`) and the cohort
//!    summary (`90_...`)
//!
//! A run that is left with no usable households fails, having written the
//! reports produced up to that point.

use crate::config::EtvConfig;
use crate::csv_output::{status_summary_to_csv, summary_to_csv, HouseholdResultsCsv};
use crate::filters::{enough_control_and_normal, good_daily_data_results};
use crate::household::{compute_all, HouseholdInput, HouseholdResult};
use crate::parse::grouping::{GROUPING_CSV, LOG_DIR};
use crate::parse::{load_all_household_statuses, parse_all_households, parse_grouping, parse_hdd};
use crate::segmentation::HouseholdStatus;
use crate::summary::{compute_summary_stats, SummaryStats};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

/// Daily HDD input
pub const INPUT_FILE_HDD: &str = "HDD.csv";
/// Bulk cumulative meter input
pub const INPUT_FILE_NKWH: &str = "NkWh.csv";

/// Unsegmented stats for all households
pub const OUTPUT_STATS_FILE_BASIC: &str = "10_basicStatsOut.csv";
/// Unsegmented stats for households passing the daily-data filter
pub const OUTPUT_STATS_FILE_FILTERED_BASIC: &str = "20_basicFilteredStatsOut.csv";
/// Control and normal day counts per segmented household
pub const OUTPUT_STATS_FILE_PRESEGMENTED: &str = "30_presegmentedStatsOut.csv";
/// Normal-period stats plus efficacy per household
pub const OUTPUT_STATS_FILE_SEGMENTED: &str = "31_segmentedStatsOut.csv";
/// Cohort summary
pub const OUTPUT_STATS_FILE_MULTIHOUSEHOLD_SUMMARY: &str = "90_multihouseholdSummaryStatsOut.csv";

/// What a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub enum DriverOutcome {
    /// No grouping file, so only unsegmented stats were produced
    Basic {
        households: usize,
        filtered_households: usize,
    },
    /// Full run through to the cohort summary
    Segmented {
        households: usize,
        filtered_households: usize,
        segmented_households: usize,
        summary: SummaryStats,
    },
}

/// Run the pipeline from `in_dir` to `out_dir`
pub fn run(in_dir: &Path, out_dir: &Path, config: &EtvConfig) -> Result<DriverOutcome> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    let tz = config.tz().map_err(anyhow::Error::msg)?;

    if !in_dir.is_dir() {
        anyhow::bail!("Cannot open input directory {}", in_dir.display());
    }
    if !out_dir.is_dir() {
        anyhow::bail!("Cannot open output directory {}", out_dir.display());
    }

    let hdd_path = in_dir.join(INPUT_FILE_HDD);
    let hdd = parse_hdd(open(&hdd_path)?, config.base_temperature_c)
        .with_context(|| format!("Failed to parse {}", hdd_path.display()))?;
    let hdd = Arc::new(hdd);

    let kwh_path = in_dir.join(INPUT_FILE_NKWH);
    let kwh_by_house = parse_all_households(open(&kwh_path)?, &tz)
        .with_context(|| format!("Failed to parse {}", kwh_path.display()))?;

    let inputs: Vec<HouseholdInput> = kwh_by_house
        .into_iter()
        .map(|(house_id, kwh)| HouseholdInput::new(house_id, kwh, Arc::clone(&hdd)))
        .collect();
    tracing::info!(
        households = inputs.len(),
        hdd_days = hdd.len(),
        timezone = %config.timezone,
        "loaded inputs"
    );

    // Unsegmented analysis of every household
    let basic = compute_all(&inputs, config.workers);
    write_results(out_dir, OUTPUT_STATS_FILE_BASIC, &basic)?;

    let filtered: Vec<HouseholdResult> = basic
        .into_iter()
        .filter(|r| good_daily_data_results(r, config))
        .collect();
    write_results(out_dir, OUTPUT_STATS_FILE_FILTERED_BASIC, &filtered)?;
    tracing::info!(
        households = inputs.len(),
        filtered = filtered.len(),
        "unsegmented analysis complete"
    );

    if filtered.is_empty() {
        anyhow::bail!("No candidate households left after filtering.");
    }

    let grouping_path = in_dir.join(GROUPING_CSV);
    if !grouping_path.exists() {
        tracing::info!(
            path = %grouping_path.display(),
            "no grouping file, so no segmentation attempted"
        );
        return Ok(DriverOutcome::Basic {
            households: inputs.len(),
            filtered_households: filtered.len(),
        });
    }

    // Segment candidates from their device logs
    let grouping = parse_grouping(open(&grouping_path)?)
        .with_context(|| format!("Failed to parse {}", grouping_path.display()))?;
    let candidates: BTreeSet<String> = filtered.iter().map(|r| r.house_id.clone()).collect();
    let statuses = load_all_household_statuses(&in_dir.join(LOG_DIR), &grouping, &tz, Some(&candidates))
        .context("Failed to load device logs")?;
    write_output(out_dir, OUTPUT_STATS_FILE_PRESEGMENTED, &status_summary_to_csv(statuses.values()))?;

    let enough: Vec<&HouseholdStatus> = statuses
        .values()
        .filter(|s| enough_control_and_normal(s, config.min_days_per_segment))
        .collect();
    tracing::info!(
        segmented = statuses.len(),
        enough_control_and_normal = enough.len(),
        "segmentation complete"
    );

    if enough.is_empty() {
        anyhow::bail!("No candidate households left after attempting to segment.");
    }

    // Re-analyse with per-day status for efficacy
    let by_house: BTreeMap<&str, &HouseholdInput> =
        inputs.iter().map(|i| (i.house_id.as_str(), i)).collect();
    let segmented_inputs = enough
        .iter()
        .map(|status| {
            by_house
                .get(status.house_id.as_str())
                .map(|input| input.inject_status(status))
                .with_context(|| format!("No energy data for house {}", status.house_id))
        })
        .collect::<Result<Vec<_>>>()?;

    let segmented = compute_all(&segmented_inputs, config.workers);
    write_results(out_dir, OUTPUT_STATS_FILE_SEGMENTED, &segmented)?;

    let summary = compute_summary_stats(inputs.len(), &segmented);
    write_output(out_dir, OUTPUT_STATS_FILE_MULTIHOUSEHOLD_SUMMARY, &summary_to_csv(&summary))?;
    tracing::info!(
        households = summary.final_households_count,
        efficacy_mean = summary.efficacy.mean,
        efficacy_sd = summary.efficacy.p_sd,
        "cohort summary complete"
    );

    Ok(DriverOutcome::Segmented {
        households: inputs.len(),
        filtered_households: filtered.len(),
        segmented_households: segmented.len(),
        summary,
    })
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn write_results(out_dir: &Path, name: &str, results: &[HouseholdResult]) -> Result<()> {
    let csv: HouseholdResultsCsv = results.iter().cloned().collect();
    write_output(out_dir, name, &csv.to_csv())
}

fn write_output(out_dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = out_dir.join(name);
    fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_dir() {
        let out = tempfile::tempdir().unwrap();
        let err = run(Path::new("/nonexistent/etv-in"), out.path(), &EtvConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Cannot open input directory"));
    }

    #[test]
    fn test_missing_hdd_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), dir.path(), &EtvConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("HDD.csv"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = EtvConfig {
            workers: 0,
            ..Default::default()
        };
        let err = run(dir.path(), dir.path(), &config).unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_no_usable_households_fails_after_writing_basic() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(INPUT_FILE_HDD), "2016-03-01,10.0\n").unwrap();
        fs::write(
            dir.path().join(INPUT_FILE_NKWH),
            "house_id,received_timestamp,device_timestamp,energy,temperature\n1,0,1456790400,1,0\n",
        )
        .unwrap();

        let err = run(dir.path(), dir.path(), &EtvConfig::default()).unwrap_err();

        assert_eq!(err.to_string(), "No candidate households left after filtering.");
        let basic = fs::read_to_string(dir.path().join(OUTPUT_STATS_FILE_BASIC)).unwrap();
        assert!(basic.ends_with("\n\"1\"\n"));
        assert!(dir.path().join(OUTPUT_STATS_FILE_FILTERED_BASIC).is_file());
    }
}
