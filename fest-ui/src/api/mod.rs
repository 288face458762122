//! HTTP API handlers for fest-ui

pub mod audio;
pub mod health;
pub mod visitors;

pub use audio::audio_routes;
pub use health::health_routes;
pub use visitors::{record_visit, visitor_summary};
