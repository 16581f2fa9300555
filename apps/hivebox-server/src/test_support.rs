use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::services::opensensemap::{SenseBoxApi, UpstreamError};
use crate::services::temperature::TemperatureService;
use crate::state::AppState;
use crate::time::FixedClock;

pub const FAKE_BASE: &str = "https://sensebox.test/boxes";

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub enum Reply {
    Json(JsonValue),
    Status(StatusCode),
    /// Never answers within any test deadline.
    Stall,
}

/// In-memory senseBox API keyed by URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeSenseBox {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl FakeSenseBox {
    pub fn reply(mut self, url: String, reply: Reply) -> Self {
        self.replies.insert(url, reply);
        self
    }

    pub fn with_box(self, box_id: &str, sensors: JsonValue) -> Self {
        let url = self.box_url(box_id);
        self.reply(url, Reply::Json(json!({"_id": box_id, "sensors": sensors})))
    }

    pub fn with_measurements(self, box_id: &str, sensor_id: &str, records: JsonValue) -> Self {
        let url = self.measurements_url(box_id, sensor_id);
        self.reply(url, Reply::Json(records))
    }

    pub fn failing(self, url: String) -> Self {
        self.reply(url, Reply::Status(StatusCode::BAD_GATEWAY))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SenseBoxApi for FakeSenseBox {
    async fn get_json(&self, url: &str) -> Result<JsonValue, UpstreamError> {
        self.calls.lock().unwrap().push(url.to_string());
        let status = match self.replies.get(url) {
            Some(Reply::Json(value)) => return Ok(value.clone()),
            Some(Reply::Status(status)) => *status,
            Some(Reply::Stall) => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                StatusCode::GATEWAY_TIMEOUT
            }
            None => StatusCode::NOT_FOUND,
        };
        Err(UpstreamError::Status {
            url: url.to_string(),
            status,
        })
    }

    fn base_url(&self) -> &str {
        FAKE_BASE
    }
}

pub fn test_config() -> Config {
    let mut config = Config::from_lookup(|_| None).expect("default config");
    config.sensebox_api = FAKE_BASE.to_string();
    config
}

pub fn test_state(fake: FakeSenseBox, box_ids: &[&str]) -> AppState {
    let mut config = test_config();
    config.box_ids = box_ids.iter().map(|id| id.to_string()).collect();
    let temperature = TemperatureService::new(
        Arc::new(fake),
        Arc::new(FixedClock(fixed_now())),
        config.box_ids.clone(),
        config.aggregate_options(),
        Duration::from_secs(5),
    );
    AppState {
        config,
        temperature,
    }
}
