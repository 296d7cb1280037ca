//! HTTP client library for talking to the LLM Factory API.
//!
//! Provides a thin wrapper around reqwest for making JSON requests against
//! the factory's HTTP endpoints. Every call returns a [`Result`] so callers
//! can distinguish transport failures, non-2xx statuses, and malformed
//! responses from each other.
//!
//! # Examples
//!
//! ```rust,no_run
//! use lf_requests::ApiClient;
//!
//! # async fn example() -> lf_requests::prelude::Result<()> {
//! let client = ApiClient::new("http://127.0.0.1:8000/api")?;
//! let diagnostics: serde_json::Value = client.get("metrics/diagnose").await?;
//! # Ok(())
//! # }
//! ```

use reqwest::header;
use serde::{Serialize, de::DeserializeOwned};

pub mod error;
pub mod prelude;

use crate::prelude::*;

/// HTTP client for the factory API with JSON support.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Creates a new API client rooted at the given base URL.
    ///
    /// A trailing slash on the base URL is accepted and stripped.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "content-type",
            header::HeaderValue::from_static("application/json"),
        );
        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { base_url, client })
    }

    /// The base URL this client was created with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Constructs the full URL for an endpoint.
    fn path(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Checks the response status and deserializes the JSON body.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Makes a GET request to the specified endpoint.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.client.get(self.path(endpoint)).send().await?;
        Self::read_json(response).await
    }

    /// Makes a GET request and returns the raw JSON value.
    pub async fn get_value(&self, endpoint: &str) -> Result<serde_json::Value> {
        self.get(endpoint).await
    }

    /// Makes a POST request with a JSON body and deserializes the response.
    pub async fn post_and_deserialize<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.path(endpoint))
            .json(body)
            .send()
            .await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_joins_endpoint_to_base() {
        let client = ApiClient::new("http://localhost:8000/api").unwrap();
        assert_eq!(
            client.path("status/abc"),
            "http://localhost:8000/api/status/abc"
        );
    }

    #[test]
    fn path_normalizes_slashes() {
        let client = ApiClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.path("/metrics/gpu"),
            "http://localhost:8000/api/metrics/gpu"
        );
    }
}
