//! HTTP status transport for Catalyst comms endpoints

use async_trait::async_trait;
use realms_core::{StatusPayload, StatusTransport, TransportError, STATUS_PATH};

use crate::Result;

const USER_AGENT: &str = concat!("realms-catalyst-client/", env!("CARGO_PKG_VERSION"));

/// Fetches `{domain}/comms/status?includeLayers=true`.
///
/// Deadlines are enforced by the prober, not here.
pub struct CommsStatusClient {
    http_client: reqwest::Client,
}

impl CommsStatusClient {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(http_client))
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        CommsStatusClient { http_client }
    }
}

#[async_trait]
impl StatusTransport for CommsStatusClient {
    async fn fetch_status(&self, domain: &str) -> std::result::Result<StatusPayload, TransportError> {
        let url = format!("{domain}{STATUS_PATH}");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
