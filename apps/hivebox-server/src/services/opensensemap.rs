use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;

pub const DEFAULT_SENSEBOX_API: &str = "https://api.opensensemap.org/boxes";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("{url} returned an undecodable body: {reason}")]
    Decode { url: String, reason: String },
}

/// Read-only access to the senseBox API. One call is one GET; no retries.
#[async_trait]
pub trait SenseBoxApi: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<JsonValue, UpstreamError>;

    fn base_url(&self) -> &str;

    fn box_url(&self, box_id: &str) -> String {
        format!("{}/{}", self.base_url().trim_end_matches('/'), box_id)
    }

    fn measurements_url(&self, box_id: &str, sensor_id: &str) -> String {
        format!("{}/data/{}", self.box_url(box_id), sensor_id)
    }
}

#[derive(Debug, Clone)]
pub struct HttpSenseBoxClient {
    http: Client,
    base_url: String,
}

impl HttpSenseBoxClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hivebox-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SenseBoxApi for HttpSenseBoxClient {
    async fn get_json(&self, url: &str) -> Result<JsonValue, UpstreamError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| UpstreamError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status,
            });
        }

        response
            .json::<JsonValue>()
            .await
            .map_err(|err| UpstreamError::Decode {
                url: url.to_string(),
                reason: err.to_string(),
            })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
