//! JSON-over-HTTPS plumbing shared by the provider clients.

use crate::error::LlmError;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Pulls the human-readable message out of a provider's error body
pub(crate) type ErrorMessageParser = fn(&str) -> Option<String>;

pub(crate) struct JsonTransport {
    http_client: reqwest::Client,
    pub base_url: String,
    error_message: ErrorMessageParser,
}

impl JsonTransport {
    pub fn new(base_url: &str, error_message: ErrorMessageParser) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            error_message,
        })
    }

    /// POST `body` to `path` and decode a successful response as `T`
    pub async fn post<B, T>(
        &self,
        path: &str,
        mut headers: HeaderMap,
        body: &B,
    ) -> Result<T, LlmError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::trace!(%url, "POST");

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| LlmError::internal(format!("Failed to parse response: {}", e)));
        }

        let retry_after = retry_after_seconds(&response);
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = (self.error_message)(&body).unwrap_or(body);

        tracing::debug!(status = status.as_u16(), %message, "Provider returned an error");
        Err(LlmError::from_status(status, message, retry_after))
    }
}

/// Header value for a secret, rejecting characters HTTP headers cannot carry
pub(crate) fn secret_header(value: &str) -> Result<HeaderValue, LlmError> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| LlmError::authentication("Invalid API key format"))?;
    header.set_sensitive(true);
    Ok(header)
}

/// Read the `retry-after` header (seconds) from a response, if present
fn retry_after_seconds(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Reject empty API keys before any request is made
pub(crate) fn require_api_key(api_key: String) -> Result<String, LlmError> {
    if api_key.trim().is_empty() {
        return Err(LlmError::authentication("API key cannot be empty"));
    }
    Ok(api_key)
}
