// "N" bulk meter data: cumulative energy readings for many houses
//
// Format (first few lines):
//
//     house_id,received_timestamp,device_timestamp,energy,temperature
//     1002,1456790560,1456790400,306.48,-3
//     1002,1456791348,1456791300,306.48,-3
//
// device_timestamp is UTC seconds and energy is a cumulative kWh meter
// reading. Rows for one house must be in rising device time but houses may
// be interleaved. Repeated header rows are skipped so files can be
// concatenated.
//
// A day's consumption is only produced when there is a reading within
// EPSILON_MIN minutes after local midnight at both ends of the day.

use super::ParseError;
use crate::day_key::DayKey;
use crate::series::DailySeries;
use chrono::{TimeZone, Timelike};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, BufReader, Read};

/// Latest minute after local midnight at which a reading still marks the day boundary
pub const EPSILON_MIN: u32 = 30;

const HEADER_PREFIX: &str = "house_id,";
const MIN_HEADER_FIELDS: usize = 5;
const MIN_ROW_FIELDS: usize = 4;

/// All distinct house IDs present in the data
pub fn extract_ids<R: Read>(reader: R) -> Result<BTreeSet<u32>, ParseError> {
    let mut ids = BTreeSet::new();
    for_each_row(reader, |line, fields| {
        ids.insert(parse_house_id(line, fields[0])?);
        Ok(())
    })?;
    Ok(ids)
}

/// kWh by local day for a single house
///
/// Rows for other houses are skipped without being parsed beyond their ID.
pub fn parse_kwh_by_id<R: Read, Tz: TimeZone>(
    reader: R,
    house_id: u32,
    tz: &Tz,
) -> Result<DailySeries, ParseError> {
    let wanted = house_id.to_string();
    let mut meter = MeterDays::default();
    for_each_row(reader, |line, fields| {
        if fields[0] != wanted {
            return Ok(());
        }
        meter.accept(line, fields, tz)
    })?;
    Ok(meter.by_day)
}

/// kWh by local day for every house, in one pass
///
/// Every house ID seen is present in the result, possibly with an empty
/// series.
pub fn parse_all_households<R: Read, Tz: TimeZone>(
    reader: R,
    tz: &Tz,
) -> Result<BTreeMap<String, DailySeries>, ParseError> {
    let mut meters: BTreeMap<u32, MeterDays> = BTreeMap::new();
    for_each_row(reader, |line, fields| {
        let id = parse_house_id(line, fields[0])?;
        meters.entry(id).or_default().accept(line, fields, tz)
    })?;

    tracing::debug!(households = meters.len(), "parsed bulk meter data");

    Ok(meters
        .into_iter()
        .map(|(id, meter)| (id.to_string(), meter.by_day))
        .collect())
}

/// Per-house day-boundary state
#[derive(Debug, Default)]
struct MeterDays {
    current_day: Option<DayKey>,
    start_of_day_kwh: Option<f32>,
    latest_device_secs: i64,
    by_day: DailySeries,
}

impl MeterDays {
    fn accept<Tz: TimeZone>(&mut self, line: usize, fields: &[&str], tz: &Tz) -> Result<(), ParseError> {
        let device_secs: i64 = parse_field(line, "device_timestamp", fields[2])?;
        let energy: f32 = parse_field(line, "energy", fields[3])?;
        if !energy.is_finite() {
            return Err(ParseError::BadNumber {
                line,
                field: "energy",
                value: fields[3].to_string(),
            });
        }

        if self.current_day.is_some() && device_secs <= self.latest_device_secs {
            if device_secs == self.latest_device_secs {
                tracing::warn!(line, house_id = fields[0], "duplicate device timestamp, row skipped");
                return Ok(());
            }
            return Err(ParseError::TimeWentBackwards {
                line,
                house_id: fields[0].to_string(),
                previous: self.latest_device_secs,
                current: device_secs,
            });
        }
        self.latest_device_secs = device_secs;

        let local = tz
            .timestamp_opt(device_secs, 0)
            .single()
            .ok_or_else(|| ParseError::BadNumber {
                line,
                field: "device_timestamp",
                value: fields[2].to_string(),
            })?;
        let today = DayKey::from_date(local.date_naive())
            .map_err(|source| ParseError::BadDate { line, source })?;

        if self.current_day != Some(today) {
            let near_midnight = local.hour() == 0 && local.minute() <= EPSILON_MIN;
            if near_midnight {
                if let (Some(start), Some(day)) = (self.start_of_day_kwh, self.current_day) {
                    self.by_day.insert(day, energy - start);
                }
                self.start_of_day_kwh = Some(energy);
            } else {
                self.start_of_day_kwh = None;
            }
            self.current_day = Some(today);
        }

        Ok(())
    }
}

/// Validate the header then feed each data row's fields to `f`
fn for_each_row<R, F>(reader: R, mut f: F) -> Result<(), ParseError>
where
    R: Read,
    F: FnMut(usize, &[&str]) -> Result<(), ParseError>,
{
    let mut lines = BufReader::new(reader).lines();

    let header = lines.next().ok_or(ParseError::MissingHeader)??;
    let header_fields: Vec<&str> = header.split(',').collect();
    if header_fields.len() < MIN_HEADER_FIELDS {
        return Err(ParseError::BadHeader("too few fields"));
    }
    if header.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ParseError::BadHeader("leading numeric not text"));
    }

    for (index, row) in lines.enumerate() {
        let row = row?;
        let line = index + 2;
        if row.starts_with(HEADER_PREFIX) || row.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        if fields.len() < MIN_ROW_FIELDS {
            return Err(ParseError::TooFewFields {
                line,
                expected: MIN_ROW_FIELDS,
                found: fields.len(),
            });
        }
        f(line, &fields)?;
    }

    Ok(())
}

fn parse_house_id(line: usize, field: &str) -> Result<u32, ParseError> {
    parse_field(line, "house_id", field)
}

fn parse_field<T: std::str::FromStr>(line: usize, name: &'static str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::BadNumber {
        line,
        field: name,
        value: value.to_string(),
    })
}
