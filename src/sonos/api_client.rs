use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::sonos::error::{ParseError, TrackerError};

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Something that can fetch the current state JSON of a zone
#[async_trait]
pub trait StateFetcher: Send + Sync {
    async fn fetch_state(&self, room: &str) -> Result<Value, TrackerError>;
}

/// Client for the `node-sonos-http-api` REST interface
#[derive(Debug, Clone)]
pub struct SonosApiClient {
    /// Base URL of the API (e.g., "http://localhost:5005/")
    base_url: Url,

    client: Arc<Client>,
}

impl SonosApiClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `host` - Hostname or IP address running node-sonos-http-api
    /// * `port` - HTTP port of the API (typically 5005)
    pub fn new(host: &str, port: u16) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&format!("http://{}:{}/", host, port))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(SonosApiClient {
            base_url,
            client: Arc::new(client),
        })
    }

    /// Set a custom timeout for the client
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        self.client = Arc::new(client);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the state endpoint for a room, with the room name percent-encoded
    pub fn state_url(&self, room: &str) -> Result<Url, TrackerError> {
        let path = format!("{}/state", urlencoding::encode(room));
        self.base_url
            .join(&path)
            .map_err(|e| TrackerError::Transport(format!("Invalid state URL for room {}: {}", room, e)))
    }
}

#[async_trait]
impl StateFetcher for SonosApiClient {
    async fn fetch_state(&self, room: &str) -> Result<Value, TrackerError> {
        let url = self.state_url(room)?;
        debug!("GET request to {}", url);

        let response = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| TrackerError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TrackerError::Server(format!("HTTP error {}: {}", status, error_text)));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| TrackerError::Transport(format!("Failed to read response body: {}", e)))?;
        if response_text.is_empty() {
            return Err(ParseError::EmptyResponse.into());
        }

        match serde_json::from_str::<Value>(&response_text) {
            Ok(json) => Ok(json),
            Err(e) => {
                error!("Failed to parse state response: {}", e);
                error!("Response text: {}", response_text);
                Err(ParseError::InvalidJson(e.to_string()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_url_encodes_room() {
        let client = SonosApiClient::new("localhost", 5005).unwrap();
        let url = client.state_url("Living Room").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5005/Living%20Room/state");
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        assert!(SonosApiClient::new("bad host", 5005).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_error() {
        // Port 9 (discard) is not expected to run an HTTP server
        let client = SonosApiClient::new("127.0.0.1", 9).unwrap().with_timeout(1);
        match client.fetch_state("Kitchen").await {
            Err(TrackerError::Transport(_)) => {}
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
