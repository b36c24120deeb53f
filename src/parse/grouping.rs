// Household grouping: which device logs belong to which house
//
//     houseID,logName[,deviceFilter]
//     1002,0a45
//     1002,shared-gw,3015
//     1003,trial.dlog,aa ab ac ad
//
// deviceFilter is a device ID for canonical logs or a hex secondary ID for
// partially-decrypted logs.
//
// logName is resolved under the log directory as-is or with a ".json" or
// ".json.gz" suffix. An optional header row starts with "house"; '#' starts
// a comment line.

use super::{parse_valve_log_file, ParseError};
use crate::segmentation::{segment_activity, HouseholdStatus};
use chrono::TimeZone;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Grouping file location relative to the input directory
pub const GROUPING_CSV: &str = "logs/grouping.csv";

/// Device logs directory relative to the input directory
pub const LOG_DIR: &str = "logs";

const LOG_SUFFIXES: [&str; 3] = ["", ".json", ".json.gz"];

/// One device log of a household
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLog {
    pub log_name: String,
    /// Keep only records from this device ID
    pub device_filter: Option<String>,
}

/// Device logs by house ID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseholdGrouping {
    pub by_house: BTreeMap<String, Vec<DeviceLog>>,
}

impl HouseholdGrouping {
    pub fn len(&self) -> usize {
        self.by_house.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_house.is_empty()
    }
}

pub fn parse_grouping<R: Read>(reader: R) -> Result<HouseholdGrouping, ParseError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut grouping = HouseholdGrouping::default();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line() as usize);

        let house_id = record.get(0).unwrap_or_default();
        if index == 0 && house_id.to_ascii_lowercase().starts_with("house") {
            continue;
        }
        let log_name = match record.get(1) {
            Some(name) if !house_id.is_empty() && !name.is_empty() => name,
            _ => {
                return Err(ParseError::TooFewFields {
                    line,
                    expected: 2,
                    found: record.iter().filter(|f| !f.is_empty()).count(),
                })
            }
        };
        let device_filter = record.get(2).filter(|f| !f.is_empty()).map(str::to_string);

        grouping
            .by_house
            .entry(house_id.to_string())
            .or_default()
            .push(DeviceLog {
                log_name: log_name.to_string(),
                device_filter,
            });
    }

    Ok(grouping)
}

/// Locate a device log in `log_dir`
pub fn find_log(log_dir: &Path, log_name: &str) -> Option<PathBuf> {
    LOG_SUFFIXES
        .iter()
        .map(|suffix| log_dir.join(format!("{log_name}{suffix}")))
        .find(|p| p.is_file())
}

/// Parse every device log of each household and segment its days
///
/// With `only` set, households outside it are not loaded.
pub fn load_all_household_statuses<Tz: TimeZone>(
    log_dir: &Path,
    grouping: &HouseholdGrouping,
    tz: &Tz,
    only: Option<&BTreeSet<String>>,
) -> Result<BTreeMap<String, HouseholdStatus>, ParseError> {
    let mut statuses = BTreeMap::new();

    for (house_id, logs) in &grouping.by_house {
        if only.is_some_and(|keep| !keep.contains(house_id)) {
            continue;
        }

        let devices = logs
            .iter()
            .map(|log| {
                let path = find_log(log_dir, &log.log_name).ok_or_else(|| ParseError::MissingLog {
                    log_name: log.log_name.clone(),
                    dir: log_dir.display().to_string(),
                })?;
                parse_valve_log_file(&path, tz, log.device_filter.as_deref())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let status = segment_activity(house_id, &devices);
        tracing::debug!(
            house_id = %house_id,
            devices = devices.len(),
            control_days = status.control_days(),
            normal_days = status.normal_days(),
            "segmented household"
        );
        statuses.insert(house_id.clone(), status);
    }

    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::DayStatus;
    use chrono_tz::Europe::London;
    use std::fs;

    #[test]
    fn test_parse_grouping_with_header_and_filter() {
        let text = "houseID,logName,deviceFilter\n1002,0a45\n1002,gw,3015\n# retired\n1001,b2c1\n";

        let g = parse_grouping(text.as_bytes()).unwrap();

        assert_eq!(g.len(), 2);
        assert_eq!(
            g.by_house["1002"],
            vec![
                DeviceLog {
                    log_name: "0a45".to_string(),
                    device_filter: None
                },
                DeviceLog {
                    log_name: "gw".to_string(),
                    device_filter: Some("3015".to_string())
                },
            ]
        );
        assert_eq!(g.by_house["1001"].len(), 1);
    }

    #[test]
    fn test_parse_grouping_without_header() {
        let g = parse_grouping("5013,aa\n".as_bytes()).unwrap();
        assert_eq!(g.by_house["5013"][0].log_name, "aa");
    }

    #[test]
    fn test_parse_grouping_missing_log_name() {
        let err = parse_grouping("5013\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::TooFewFields { line: 1, .. }));
    }

    #[test]
    fn test_load_all_household_statuses() {
        let dir = tempfile::tempdir().unwrap();
        let on = r#"[ "2016-03-01T08:00:00Z", "", {"v|%":30,"tS|C":2} ]"#;
        let off = r#"[ "2016-03-01T08:00:00Z", "", {"v|%":30,"tS|C":0} ]"#;
        fs::write(dir.path().join("a.json"), on).unwrap();
        fs::write(dir.path().join("b"), on).unwrap();
        fs::write(dir.path().join("c.json"), off).unwrap();

        let grouping = parse_grouping("1,a\n1,b\n1,c\n2,c\n3,missing\n".as_bytes()).unwrap();
        let only: BTreeSet<String> = ["1".to_string(), "2".to_string()].into();

        let statuses = load_all_household_statuses(dir.path(), &grouping, &London, Some(&only)).unwrap();

        let day = crate::day_key::DayKey::from_ymd(2016, 3, 1).unwrap();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses["1"].by_day[&day], DayStatus::Enabled);
        assert_eq!(statuses["2"].by_day[&day], DayStatus::Disabled);
    }

    #[test]
    fn test_missing_log_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let grouping = parse_grouping("3,missing\n".as_bytes()).unwrap();

        let err = load_all_household_statuses(dir.path(), &grouping, &London, None).unwrap_err();

        assert!(matches!(err, ParseError::MissingLog { .. }));
    }
}
