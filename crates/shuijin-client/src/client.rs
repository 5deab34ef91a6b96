//! shuijin HTTP client implementation

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shuijin_core::Slot;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ClientError, Result};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Client for the gateway slot API
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the server (e.g., "http://localhost:3068")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new client with custom timeouts
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get a reference to the underlying HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Check server health
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<String> {
        let url = self.base_url.join("/health")?;
        let response = self.client.get(url).send().await?;

        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Report slot values on behalf of gateway `code`
    #[instrument(skip(self, values), fields(count = values.len()))]
    pub async fn report(&self, code: &str, values: &HashMap<String, f64>) -> Result<()> {
        let body = serde_json::to_vec(values).map_err(|e| ClientError::ParseError(e.to_string()))?;
        self.report_raw(code, body).await
    }

    /// Report an arbitrary body on behalf of gateway `code`
    pub async fn report_raw(&self, code: &str, body: impl Into<reqwest::Body>) -> Result<()> {
        let url = self.base_url.join(&format!("/api/gw/{}", code))?;
        debug!("Reporting to {}", url);

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Fetch every slot
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<BTreeMap<String, Slot>> {
        let url = self.base_url.join("/api/gw")?;
        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| ClientError::ParseError(e.to_string()))
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error from failed response
    async fn extract_error(&self, response: reqwest::Response) -> ClientError {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => format!("HTTP {}", status),
        };

        match status {
            StatusCode::NOT_FOUND => ClientError::UnknownGateway(message),
            _ => ClientError::server_error(status.as_u16(), message),
        }
    }
}
