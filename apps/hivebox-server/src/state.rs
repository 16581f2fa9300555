use axum::extract::FromRef;
use std::sync::Arc;

use crate::config::Config;
use crate::services::opensensemap::HttpSenseBoxClient;
use crate::services::temperature::TemperatureService;
use crate::time::SystemClock;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub temperature: TemperatureService,
}

impl AppState {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let client = HttpSenseBoxClient::new(config.sensebox_api.clone(), config.request_timeout)?;
        let temperature = TemperatureService::new(
            Arc::new(client),
            Arc::new(SystemClock),
            config.box_ids.clone(),
            config.aggregate_options(),
            config.aggregate_timeout,
        );
        Ok(Self {
            config,
            temperature,
        })
    }
}

impl FromRef<AppState> for TemperatureService {
    fn from_ref(state: &AppState) -> TemperatureService {
        state.temperature.clone()
    }
}
