//! # Festival Common Library
//!
//! Shared code for the festival site crates:
//! - Error and result types
//! - TOML configuration with compiled defaults
//! - Browser-style client storage (durable and per-session scopes)
//! - Route allow-list policy
//! - The anonymous visit record exchanged with the tracking endpoint

pub mod config;
pub mod error;
pub mod routes;
pub mod storage;
pub mod visitor;

pub use error::{Error, Result};
pub use routes::RoutePolicy;
pub use storage::{ClientStorage, KeyValueStore, StorageScope};
pub use visitor::AnonymousVisit;
