//! Report submission seam

use async_trait::async_trait;
use thiserror::Error;

use postwatch_api::ReportPayload;
use postwatch_client::CollectorClient;

/// Errors surfaced by a report sink
#[derive(Error, Debug)]
pub enum SinkError {
    /// Submission failed (transport or collector rejection)
    #[error("report submission failed: {0}")]
    Submit(String),
}

/// Destination for posture reports
///
/// A trait so the cycle can be tested without a running collector.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn submit(&self, payload: &ReportPayload) -> Result<(), SinkError>;
}

/// Submits reports to the collector over HTTP
pub struct HttpSink {
    client: CollectorClient,
}

impl HttpSink {
    pub fn new(client: CollectorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportSink for HttpSink {
    async fn submit(&self, payload: &ReportPayload) -> Result<(), SinkError> {
        self.client
            .submit(payload)
            .await
            .map(|_| ())
            .map_err(|e| SinkError::Submit(e.to_string()))
    }
}
