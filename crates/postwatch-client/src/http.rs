//! HTTP client for the collector daemon

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use postwatch_api::{HealthResponse, ReportFilter, ReportPayload, ReportRecord, SubmitResponse};

use crate::error::{ClientError, Result};

/// HTTP client for the postwatch collector
#[derive(Debug, Clone)]
pub struct CollectorClient {
    client: Client,
    base_url: Url,
}

impl CollectorClient {
    /// Create a new client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    ///
    /// # Example
    /// ```no_run
    /// use postwatch_client::CollectorClient;
    ///
    /// let client = CollectorClient::new("http://127.0.0.1:5000")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// Create a new client with a custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { client, base_url })
    }

    /// Build a full URL from a path
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(ClientError::Url)
    }

    /// Perform a GET request and deserialize the response
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    /// Submit one posture report
    ///
    /// # Errors
    /// Returns an error if the request fails or the collector rejects the
    /// payload.
    pub async fn submit(&self, payload: &ReportPayload) -> Result<SubmitResponse> {
        let url = self.url("/report")?;
        debug!(device_id = %payload.device_id, "submitting report");

        let response = self.client.post(url).json(payload).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    /// Latest report for one device
    ///
    /// # Errors
    /// Returns `ClientError::NotFound` if the device has never reported.
    pub async fn latest(&self, device_id: &str) -> Result<ReportRecord> {
        let url = self.url(&format!("/reports/{device_id}"))?;
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(device_id.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    /// Latest report for every known device
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn latest_all(&self) -> Result<Vec<ReportRecord>> {
        let url = self.url("/reports")?;
        self.get(url).await
    }

    /// Latest reports restricted by exact-match posture predicates
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn latest_filtered(&self, filter: &ReportFilter) -> Result<Vec<ReportRecord>> {
        let mut url = self.url("/reports/filter")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(os_update) = &filter.os_update {
                pairs.append_pair("os_update", os_update);
            }
            if let Some(disk_encryption) = &filter.disk_encryption {
                pairs.append_pair("disk_encryption", disk_encryption);
            }
        }
        self.get(url).await
    }

    /// Collector health
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.url("/health")?;
        self.get(url).await
    }
}
