// Device (radiator valve) logs, one record per line, in either of two forms.
//
// Canonical:
//
//     [ "2016-03-31T05:18:45Z", "", {"@":"3015","+":1,"v|%":0,"tT|C":14,"tS|C":4} ]
//
// Partially decrypted (UTC timestamp, relay address, hex frame, then payload
// text whose last '{' starts a possibly unterminated JSON fragment):
//
//     '2016-05-12-11:21:45','111.11.11.1','cf 74 aa ab ac ad 20 0b ...','7F 10 {"tS|C":1
//
// Bytes 3 to 6 of the hex frame are the device's secondary ID.
//
// The JSON map carries, among others:
//   "@"    device ID
//   "v|%"  valve open percentage; above 0 means calling for heat
//   "tS|C" energy-saving setback in C; present means status reported,
//          above 0 means saving active
//
// Lines starting with anything else are ignored.

use super::{open_maybe_gzipped, ParseError};
use crate::day_key::DayKey;
use crate::segmentation::DeviceActivity;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use std::io::BufRead;
use std::path::Path;

const KEY_DEVICE_ID: &str = "@";
const KEY_VALVE_OPEN_PERCENT: &str = "v|%";
const KEY_SETBACK_C: &str = "tS|C";

const PD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";
const PD_FIELD_SEPARATOR: &str = "','";
/// Frame bytes before the secondary ID
const PD_FRAME_HEADER_BYTES: usize = 2;
const PD_SECONDARY_ID_BYTES: usize = 4;

/// One decoded log line
#[derive(Debug)]
struct LogRecord {
    instant: DateTime<Utc>,
    fields: Map<String, Value>,
    /// Normalised secondary ID of a partially-decrypted frame
    secondary_id: Option<String>,
}

impl LogRecord {
    fn matches(&self, filter: &DeviceFilter<'_>) -> bool {
        match &self.secondary_id {
            Some(id) => *id == filter.hex_id,
            None => self.fields.get(KEY_DEVICE_ID).and_then(Value::as_str) == Some(filter.raw),
        }
    }
}

struct DeviceFilter<'a> {
    raw: &'a str,
    hex_id: String,
}

/// Summarise one device log into per-day activity
///
/// With `device_filter` set only matching records are used, for logs that
/// interleave several devices. Canonical records match on their `"@"`
/// field; partially-decrypted records match on the frame's secondary ID,
/// given as hex bytes (e.g. `"aa ab ac ad"`, case and spacing ignored).
pub fn parse_valve_log<R: BufRead, Tz: TimeZone>(
    reader: R,
    tz: &Tz,
    device_filter: Option<&str>,
) -> Result<DeviceActivity, ParseError> {
    let filter = device_filter.map(|raw| DeviceFilter {
        raw,
        hex_id: normalise_hex_id(raw.split_whitespace()),
    });
    let mut activity = DeviceActivity::default();
    let mut ignored = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let text = line.trim();

        let record = if text.starts_with('[') {
            parse_canonical(line_no, text)?
        } else if text.starts_with('\'') {
            parse_partially_decrypted(line_no, text)?
        } else {
            if !text.is_empty() {
                ignored += 1;
            }
            continue;
        };

        if filter.as_ref().is_some_and(|f| !record.matches(f)) {
            continue;
        }

        let day = DayKey::from_datetime(&record.instant, tz)
            .map_err(|source| ParseError::BadDate { line: line_no, source })?;
        let fields = &record.fields;

        activity.days_with_data.insert(day);
        if number(fields, KEY_VALVE_OPEN_PERCENT).is_some_and(|v| v > 0.0) {
            activity.days_calling_for_heat.insert(day);
        }
        if let Some(setback) = fields.get(KEY_SETBACK_C) {
            activity.days_saving_reported.insert(day);
            if setback.as_f64().is_some_and(|v| v > 0.0) {
                activity.days_saving_active.insert(day);
            }
        }
    }

    if ignored > 0 {
        tracing::debug!(ignored, "skipped unrecognised log lines");
    }

    Ok(activity)
}

/// As [`parse_valve_log`] for a (possibly gzipped) file
pub fn parse_valve_log_file<Tz: TimeZone>(
    path: &Path,
    tz: &Tz,
    device_filter: Option<&str>,
) -> Result<DeviceActivity, ParseError> {
    let reader = open_maybe_gzipped(path)?;
    parse_valve_log(reader, tz, device_filter)
}

fn parse_canonical(line: usize, text: &str) -> Result<LogRecord, ParseError> {
    let (timestamp, _controller, fields): (String, Value, Map<String, Value>) =
        serde_json::from_str(text).map_err(|e| malformed(line, e.to_string()))?;

    let instant = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| malformed(line, format!("bad timestamp {timestamp:?}: {e}")))?;

    Ok(LogRecord {
        instant: instant.with_timezone(&Utc),
        fields,
        secondary_id: None,
    })
}

fn parse_partially_decrypted(line: usize, text: &str) -> Result<LogRecord, ParseError> {
    let parts: Vec<&str> = text[1..].split(PD_FIELD_SEPARATOR).collect();
    if parts.len() < 3 {
        return Err(malformed(
            line,
            format!("expected at least 3 quoted fields, found {}", parts.len()),
        ));
    }

    let timestamp = parts[0].trim_end_matches('\'');
    let instant = NaiveDateTime::parse_from_str(timestamp, PD_TIMESTAMP_FORMAT)
        .map_err(|e| malformed(line, format!("bad timestamp {timestamp:?}: {e}")))?
        .and_utc();

    let frame: Vec<&str> = parts[2].trim_end_matches('\'').split_whitespace().collect();
    let secondary_id = frame
        .get(PD_FRAME_HEADER_BYTES..PD_FRAME_HEADER_BYTES + PD_SECONDARY_ID_BYTES)
        .map(|id| normalise_hex_id(id.iter().copied()));

    Ok(LogRecord {
        instant,
        fields: json_fragment(text).unwrap_or_default(),
        secondary_id,
    })
}

/// Trailing `{...` fragment of a partially-decrypted line, closed if needed
///
/// `None` if there is no fragment or it is not valid JSON once closed.
fn json_fragment(text: &str) -> Option<Map<String, Value>> {
    let start = text.rfind('{')?;
    let mut fragment = text[start..].trim_end_matches('\'').trim_end().to_string();
    if !fragment.ends_with('}') {
        fragment.push('}');
    }
    serde_json::from_str(&fragment).ok()
}

fn normalise_hex_id<'a>(bytes: impl Iterator<Item = &'a str>) -> String {
    bytes.map(str::to_ascii_lowercase).collect::<Vec<_>>().join(" ")
}

fn malformed(line: usize, reason: String) -> ParseError {
    ParseError::MalformedRecord { line, reason }
}

fn number(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    fields.get(key).and_then(Value::as_f64)
}
