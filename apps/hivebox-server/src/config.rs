use anyhow::{anyhow, bail, Context, Result};
use chrono::Duration as ChronoDuration;
use std::env;
use std::time::Duration;
use url::Url;

use crate::services::opensensemap::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_SENSEBOX_API};
use crate::services::temperature::{
    is_valid_box_id, AggregateOptions, SensorTitleMatcher, DEFAULT_AGGREGATE_TIMEOUT,
    DEFAULT_SAMPLE_LIMIT, DEFAULT_SENSOR_TITLE, DEFAULT_WINDOW,
};

pub const DEFAULT_BOX_IDS: [&str; 3] = [
    "5eba5fbad46fb8001b799786",
    "5c21ff8f919bf8001adf2488",
    "5ade1acf223bd80019a1011c",
];

const MAX_WINDOW_SECONDS: u64 = 7 * 24 * 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub box_ids: Vec<String>,
    pub sensebox_api: String,
    pub request_timeout: Duration,
    pub aggregate_timeout: Duration,
    pub sensor_title: String,
    pub window_seconds: u64,
    pub sample_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let box_ids = match env_optional(&lookup, "HIVEBOX_BOX_IDS") {
            Some(raw) => parse_box_ids(&raw),
            None => DEFAULT_BOX_IDS.iter().map(|id| id.to_string()).collect(),
        };
        if box_ids.is_empty() {
            bail!("HIVEBOX_BOX_IDS did not contain any box ids");
        }
        for box_id in box_ids.iter().filter(|id| !is_valid_box_id(id)) {
            tracing::warn!(%box_id, "configured senseBox id is malformed and will be skipped");
        }

        let sensebox_api = env_optional(&lookup, "HIVEBOX_SENSEBOX_API")
            .unwrap_or_else(|| DEFAULT_SENSEBOX_API.to_string());
        let sensebox_api = normalize_base_url(&sensebox_api)?;

        let request_timeout = Duration::from_secs(env_u64(
            &lookup,
            "HIVEBOX_HTTP_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT.as_secs(),
        )?);
        let aggregate_timeout = Duration::from_secs(env_u64(
            &lookup,
            "HIVEBOX_AGGREGATE_TIMEOUT_SECONDS",
            DEFAULT_AGGREGATE_TIMEOUT.as_secs(),
        )?);
        if request_timeout.is_zero() || aggregate_timeout.is_zero() {
            bail!("HIVEBOX timeouts must be greater than zero");
        }

        let sensor_title = env_optional(&lookup, "HIVEBOX_SENSOR_TITLE")
            .unwrap_or_else(|| DEFAULT_SENSOR_TITLE.to_string());

        let window_seconds = env_u64(&lookup, "HIVEBOX_WINDOW_SECONDS", DEFAULT_WINDOW.as_secs())?;
        if window_seconds == 0 || window_seconds > MAX_WINDOW_SECONDS {
            bail!("HIVEBOX_WINDOW_SECONDS must be between 1 and {MAX_WINDOW_SECONDS}");
        }
        let sample_limit = usize::try_from(env_u64(
            &lookup,
            "HIVEBOX_SAMPLE_LIMIT",
            DEFAULT_SAMPLE_LIMIT as u64,
        )?)
        .context("invalid HIVEBOX_SAMPLE_LIMIT")?;
        if sample_limit == 0 {
            bail!("HIVEBOX_SAMPLE_LIMIT must be at least 1");
        }

        Ok(Self {
            box_ids,
            sensebox_api,
            request_timeout,
            aggregate_timeout,
            sensor_title,
            window_seconds,
            sample_limit,
        })
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            matcher: SensorTitleMatcher::new(&self.sensor_title),
            window: ChronoDuration::seconds(self.window_seconds as i64),
            sample_limit: self.sample_limit,
        }
    }
}

fn parse_box_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
        .collect()
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim()).context("invalid HIVEBOX_SENSEBOX_API")?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("HIVEBOX_SENSEBOX_API must be http(s), got {other}")),
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn env_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match env_optional(lookup, key) {
        Some(value) => value
            .parse::<u64>()
            .with_context(|| format!("invalid {key}")),
        None => Ok(default),
    }
}

fn env_optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
