use std::time::Duration;

use anyhow::Result;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Non-2xx response from a collaborator. Kept as a typed error so
/// callers can downcast and branch on the status instead of parsing
/// message text.
#[derive(Debug, Error)]
#[error("API error ({status}): {message}")]
pub struct ApiStatusError {
    pub status: StatusCode,
    pub message: String,
}

/// JSON client for the clinic's REST collaborators. Every call is bounded
/// by the configured request timeout; callers needing tighter bounds can
/// drop the future.
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl RestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_base_url(config, &config.clinic_api_url)
    }

    /// A client against a non-default collaborator host (e.g. the finance
    /// gateway) sharing the same key and timeout settings.
    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.clinic_api_key.clone(),
            // Applied per request; a builder-level timeout could be lost
            // if the builder fails and falls back to a plain client.
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.get_headers())
            .timeout(self.timeout);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(ApiStatusError {
                status,
                message: error_text,
            }
            .into());
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Fire-and-parse-nothing variant for endpoints that return no body.
    pub async fn request_empty(&self, method: Method, path: &str, body: Option<Value>) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.get_headers())
            .timeout(self.timeout);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);
            return Err(ApiStatusError {
                status,
                message: error_text,
            }
            .into());
        }

        Ok(())
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
