// Integration test utilities
//
// Builds a synthetic cohort input directory: HDD.csv, NkWh.csv and
// per-device valve logs with logs/grouping.csv. Everything is in January and
// February 2016 so London local midnight is UTC midnight.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// 2016-01-01T00:00:00Z
pub const START_SECS: i64 = 1_451_606_400;
pub const DAY_SECS: i64 = 86_400;

/// Days covered by the HDD data; the first half are control days
pub const DAYS: usize = 60;
pub const CONTROL_DAYS: usize = DAYS / 2;

pub const BASELOAD_KWH: f32 = 4.0;

/// Integral HDD in 5..=15, varying within both halves
pub fn hdd(day: usize) -> f32 {
    5.0 + ((day * 7) % 11) as f32
}

pub fn date(day: usize) -> String {
    chrono::DateTime::from_timestamp(START_SECS + day as i64 * DAY_SECS, 0)
        .unwrap()
        .format("%Y-%m-%d")
        .to_string()
}

/// One household's metered behaviour
#[derive(Debug, Clone)]
pub struct SyntheticHouse {
    pub id: u32,
    pub control_slope: f32,
    pub normal_slope: f32,
    /// Number of valves; all vote the true status
    pub devices: usize,
    /// Only a single meter reading, so no whole day of consumption
    pub no_whole_days: bool,
    /// Saving never disabled: every day looks like a normal day
    pub never_control: bool,
}

impl SyntheticHouse {
    pub fn new(id: u32, control_slope: f32, normal_slope: f32) -> Self {
        Self {
            id,
            control_slope,
            normal_slope,
            devices: 3,
            no_whole_days: false,
            never_control: false,
        }
    }

    pub fn daily_kwh(&self, day: usize) -> f32 {
        let slope = if day < CONTROL_DAYS {
            self.control_slope
        } else {
            self.normal_slope
        };
        BASELOAD_KWH + slope * hdd(day)
    }

    fn is_control(&self, day: usize) -> bool {
        day < CONTROL_DAYS && !self.never_control
    }
}

pub fn write_hdd(dir: &Path) {
    let mut text = String::from("\"Date\",\"HDD 15.5\",\"% Estimated\"\n");
    for day in 0..DAYS {
        writeln!(text, "{},{},0", date(day), hdd(day)).unwrap();
    }
    fs::write(dir.join("HDD.csv"), text).unwrap();
}

/// Cumulative midnight meter readings, houses interleaved by time
pub fn write_nkwh(dir: &Path, houses: &[SyntheticHouse]) {
    let mut text = String::from("house_id,received_timestamp,device_timestamp,energy,temperature\n");
    let mut totals = vec![100.0f64; houses.len()];
    for day in 0..=DAYS {
        let ts = START_SECS + day as i64 * DAY_SECS;
        for (house, total) in houses.iter().zip(totals.iter_mut()) {
            if house.no_whole_days && day > 0 {
                continue;
            }
            writeln!(text, "{},{},{},{:.3},5", house.id, ts + 60, ts, total).unwrap();
            if day < DAYS {
                *total += f64::from(house.daily_kwh(day));
            }
        }
    }
    fs::write(dir.join("NkWh.csv"), text).unwrap();
}

/// One log per valve plus the grouping file
pub fn write_logs(dir: &Path, houses: &[SyntheticHouse]) {
    let logs = dir.join("logs");
    fs::create_dir_all(&logs).unwrap();

    let mut grouping = String::from("houseID,logName\n");
    for house in houses {
        for device in 0..house.devices {
            let name = format!("{}-{}", house.id, device);
            let mut log = String::new();
            for day in 0..DAYS {
                let setback = if house.is_control(day) { 0 } else { 3 };
                writeln!(
                    log,
                    "[ \"{}T08:00:00Z\", \"\", {{\"@\":\"{}\",\"v|%\":40,\"tS|C\":{}}} ]",
                    date(day),
                    name,
                    setback
                )
                .unwrap();
            }
            fs::write(logs.join(format!("{name}.json")), log).unwrap();
            writeln!(grouping, "{},{}", house.id, name).unwrap();
        }
    }
    fs::write(logs.join("grouping.csv"), grouping).unwrap();
}

/// Full input directory for `houses`
pub fn write_cohort(dir: &Path, houses: &[SyntheticHouse], with_logs: bool) {
    write_hdd(dir);
    write_nkwh(dir, houses);
    if with_logs {
        write_logs(dir, houses);
    }
}

/// Standard three-house cohort: efficacies 1.5 and 1.2, plus one house with no usable days
pub fn standard_cohort() -> Vec<SyntheticHouse> {
    let mut empty = SyntheticHouse::new(1003, 2.0, 2.0);
    empty.no_whole_days = true;
    vec![
        SyntheticHouse::new(1001, 3.0, 2.0),
        SyntheticHouse::new(1002, 2.4, 2.0),
        empty,
    ]
}

/// Parse a results CSV data row: (id, slope, intercept, rsq, n, efficacy)
pub fn parse_result_row(row: &str) -> (String, f32, f32, f32, usize, Option<f32>) {
    let fields: Vec<&str> = row.split(',').collect();
    (
        fields[0].trim_matches('"').to_string(),
        fields[1].parse().unwrap(),
        fields[2].parse().unwrap(),
        fields[3].parse().unwrap(),
        fields[4].parse().unwrap(),
        fields.get(5).filter(|f| !f.is_empty()).map(|f| f.parse().unwrap()),
    )
}
