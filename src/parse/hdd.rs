// Daily Heating Degree Day CSV, as exported by degreedays.net
//
//     "Description:","Celsius-based heating degree days for a base temperature of 15.5C"
//     ...
//     "Date","HDD 15.5","% Estimated"
//     2016-03-01,11.4,0
//     2016-03-02,10.1,0
//
// Preamble and header rows (first field not a date) are skipped. Any further
// columns are ignored.

use super::ParseError;
use crate::day_key::{CalendarError, DayKey};
use crate::series::{DailySeries, HddSeries};
use std::io::Read;

/// Parse HDD by day; `base_temperature_c` is recorded alongside
pub fn parse_hdd<R: Read>(reader: R, base_temperature_c: f32) -> Result<HddSeries, ParseError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut by_day = DailySeries::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line() as usize);

        let Some(first) = record.get(0) else {
            continue;
        };
        let day = match DayKey::parse_leading_date(first) {
            Ok(day) => day,
            Err(CalendarError::Unparseable(_)) => continue,
            Err(source) => return Err(ParseError::BadDate { line, source }),
        };

        let raw = record.get(1).ok_or(ParseError::TooFewFields {
            line,
            expected: 2,
            found: record.len(),
        })?;
        let value: f32 = raw.parse().map_err(|_| ParseError::BadNumber {
            line,
            field: "HDD",
            value: raw.to_string(),
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(ParseError::BadHdd { line, value });
        }

        by_day.insert(day, value);
    }

    tracing::debug!(days = by_day.len(), base_temperature_c, "parsed HDD data");

    Ok(HddSeries::new(by_day, base_temperature_c))
}
