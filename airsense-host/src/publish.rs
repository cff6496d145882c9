use std::time::Duration;

use airsense_api::{JsonProtocol, Protocol, SensorRecord};
use airsense_embedded::CloudPush;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body returned by the realtime database after a push.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// Appends records to a Firebase realtime database over its REST interface.
pub struct FirebaseClient {
    http: Client,
    base_url: String,
    auth: String,
    protocol: JsonProtocol,
}

impl FirebaseClient {
    pub fn new(host: &str, auth: &str) -> Result<Self> {
        Self::with_base_url(format!("https://{}", host.trim_end_matches('/')), auth)
    }

    /// Client for an explicit scheme and authority, such as a local emulator.
    pub fn with_base_url(base_url: impl Into<String>, auth: &str) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            auth: auth.to_string(),
            protocol: JsonProtocol,
        })
    }

    /// Location a push to `path` is posted to, without credentials.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}.json", self.base_url, path)
    }
}

impl CloudPush for FirebaseClient {
    type Error = Error;

    async fn push(&mut self, path: &str, record: &SensorRecord) -> Result<String> {
        let endpoint = self.endpoint(path);
        let body = self.protocol.serialize(record)?;

        let response = self
            .http
            .post(&endpoint)
            .query(&[("auth", &self.auth)])
            .header(reqwest::header::CONTENT_TYPE, self.protocol.content_type())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::connection_to(
                format!("{}: {}", status, message.trim()),
                endpoint,
            ));
        }

        let bytes = response.bytes().await?;
        let PushResponse { name } = self.protocol.deserialize(&bytes)?;
        Ok(name)
    }
}

/// Writes records to the log instead of a remote store.
#[derive(Debug, Default)]
pub struct LogPush {
    count: u64,
}

impl LogPush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl CloudPush for LogPush {
    type Error = Error;

    async fn push(&mut self, path: &str, record: &SensorRecord) -> Result<String> {
        let json = serde_json::to_string(record)?;
        self.count += 1;

        tracing::info!(target: "airsense_host::record", "{} {}", path, json);
        Ok(format!("log-{}", self.count))
    }
}
