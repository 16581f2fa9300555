use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::services::opensensemap::SenseBoxApi;

pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

/// Values and diagnostics contributed by one box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationReport {
    pub values: Vec<f64>,
    pub errors: Vec<String>,
}

pub async fn fetch_measurements<A>(
    api: &A,
    box_id: &str,
    sensor_id: &str,
    cutoff: DateTime<Utc>,
    sample_limit: usize,
) -> StationReport
where
    A: SenseBoxApi + ?Sized,
{
    let url = api.measurements_url(box_id, sensor_id);
    match api.get_json(&url).await {
        Ok(payload) => filter_measurements(box_id, &payload, cutoff, sample_limit),
        Err(err) => StationReport {
            values: Vec::new(),
            errors: vec![format!(
                "Error fetching measurements for box {box_id}: {err}"
            )],
        },
    }
}

/// Upstream lists are newest first; anything past `sample_limit` is ignored.
pub fn filter_measurements(
    box_id: &str,
    payload: &JsonValue,
    cutoff: DateTime<Utc>,
    sample_limit: usize,
) -> StationReport {
    let mut report = StationReport::default();
    let Some(records) = payload.as_array() else {
        report.errors.push(format!(
            "Invalid measurement format for box {box_id}: expected a list of measurements"
        ));
        return report;
    };

    for record in records.iter().take(sample_limit) {
        match accept_record(record, cutoff) {
            Ok(Some(value)) => report.values.push(value),
            Ok(None) => {}
            Err(reason) => report
                .errors
                .push(format!("Invalid measurement format for box {box_id}: {reason}")),
        }
    }
    report
}

fn accept_record(record: &JsonValue, cutoff: DateTime<Utc>) -> Result<Option<f64>, String> {
    let created_at = record
        .get("createdAt")
        .ok_or_else(|| "missing field 'createdAt'".to_string())?;
    let timestamp = parse_created_at(created_at)?;
    if timestamp < cutoff {
        return Ok(None);
    }

    let value = record
        .get("value")
        .ok_or_else(|| "missing field 'value'".to_string())?;
    parse_value(value).map(Some)
}

fn parse_created_at(raw: &JsonValue) -> Result<DateTime<Utc>, String> {
    let text = raw
        .as_str()
        .ok_or_else(|| format!("createdAt is not a string: {raw}"))?;
    DateTime::parse_from_rfc3339(text.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| format!("invalid createdAt '{text}': {err}"))
}

fn parse_value(raw: &JsonValue) -> Result<f64, String> {
    let value = match raw {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("could not convert value to float: {raw}"))
}
