use chrono::{DateTime, Utc};
use serde::Serialize;

pub const TOO_COLD_BELOW_C: f64 = 10.0;
pub const TOO_HOT_ABOVE_C: f64 = 36.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureStatus {
    #[serde(rename = "Too Cold")]
    TooCold,
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Too Hot")]
    TooHot,
}

impl TemperatureStatus {
    pub fn classify(average: f64) -> Self {
        if average < TOO_COLD_BELOW_C {
            TemperatureStatus::TooCold
        } else if average <= TOO_HOT_ABOVE_C {
            TemperatureStatus::Good
        } else {
            TemperatureStatus::TooHot
        }
    }
}

/// Only built by [`aggregate`], so `count` is always at least one.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    average: f64,
    status: TemperatureStatus,
    count: usize,
    timestamp: DateTime<Utc>,
}

impl AggregateResult {
    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn status(&self) -> TemperatureStatus {
        self.status
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    NoData,
    AllSourcesFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateFailure {
    pub reason: FailureReason,
    pub diagnostics: Vec<String>,
}

pub type AggregateOutcome = Result<AggregateResult, AggregateFailure>;

pub fn aggregate(values: &[f64], errors: Vec<String>, now: DateTime<Utc>) -> AggregateOutcome {
    if values.is_empty() {
        return Err(if errors.is_empty() {
            AggregateFailure {
                reason: FailureReason::NoData,
                diagnostics: Vec::new(),
            }
        } else {
            AggregateFailure {
                reason: FailureReason::AllSourcesFailed,
                diagnostics: errors,
            }
        });
    }

    let average = values.iter().sum::<f64>() / values.len() as f64;
    Ok(AggregateResult {
        average,
        status: TemperatureStatus::classify(average),
        count: values.len(),
        timestamp: now,
    })
}
