//! Error types for fest-gate

use thiserror::Error;

/// Anonymous visit tracking failures (logged, never surfaced to the visitor)
#[derive(Error, Debug)]
pub enum TrackingError {
    /// Request could not be sent or timed out
    #[error("Tracking request failed: {0}")]
    Network(String),

    /// Endpoint answered with a non-success status
    #[error("Tracking endpoint returned HTTP {0}")]
    Status(u16),

    /// HTTP client could not be built
    #[error("Tracking client error: {0}")]
    Client(String),
}

/// A navigation rejected while the registration prompt is open
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct NavigationBlocked {
    pub from: String,
    pub to: String,
    /// Toast text shown to the visitor
    pub message: String,
}
