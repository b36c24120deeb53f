// Input file parsers
//
// - nbulk:     cumulative-meter bulk CSV to kWh per local day, per house
// - hdd:       degreedays.net-style daily HDD CSV
// - valve_log: canonical JSON-per-line device logs to per-day activity sets
// - grouping:  which device logs belong to which household
//
// All parsers are line-oriented and report the 1-based input line of the
// first problem. Day boundaries are local midnight in the household timezone.

pub mod grouping;
pub mod hdd;
pub mod nbulk;
pub mod valve_log;

pub use grouping::{load_all_household_statuses, parse_grouping, DeviceLog, HouseholdGrouping};
pub use hdd::parse_hdd;
pub use nbulk::{extract_ids, parse_all_households, parse_kwh_by_id};
pub use valve_log::{parse_valve_log, parse_valve_log_file};

use crate::day_key::CalendarError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors reading any input file
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("missing header row")]
    MissingHeader,

    #[error("bad header row: {0}")]
    BadHeader(&'static str),

    #[error("line {line}: too few fields (need {expected}, found {found})")]
    TooFewFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: bad {field} value {value:?}")]
    BadNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: device time went backwards for house {house_id} ({current} < {previous})")]
    TimeWentBackwards {
        line: usize,
        house_id: String,
        previous: i64,
        current: i64,
    },

    #[error("line {line}: {source}")]
    BadDate {
        line: usize,
        #[source]
        source: CalendarError,
    },

    #[error("line {line}: HDD value {value} is negative or not finite")]
    BadHdd { line: usize, value: f32 },

    #[error("line {line}: malformed log record: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("no log file for device {log_name:?} in {dir}")]
    MissingLog { log_name: String, dir: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Open a file for line reading, decompressing `.gz` transparently
pub fn open_maybe_gzipped(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}
