//! Visitor tracking client

use crate::error::TrackingError;
use async_trait::async_trait;
use fest_common::config::GateConfig;
use fest_common::AnonymousVisit;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Sink for anonymous visit records
#[async_trait]
pub trait VisitorTracker: Send + Sync {
    async fn record_anonymous_visit(&self, visit: &AnonymousVisit) -> Result<(), TrackingError>;
}

/// Posts anonymous visits as JSON to the site's ingestion endpoint
#[derive(Debug, Clone)]
pub struct HttpVisitorTracker {
    http_client: Client,
    endpoint: String,
}

impl HttpVisitorTracker {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TrackingError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackingError::Client(e.to_string()))?;
        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &GateConfig) -> Result<Self, TrackingError> {
        Self::new(config.tracking_endpoint.clone(), config.tracking_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl VisitorTracker for HttpVisitorTracker {
    async fn record_anonymous_visit(&self, visit: &AnonymousVisit) -> Result<(), TrackingError> {
        debug!("Posting anonymous visit to {}", self.endpoint);

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(visit)
            .send()
            .await
            .map_err(|e| TrackingError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackingError::Status(status.as_u16()));
        }
        Ok(())
    }
}
