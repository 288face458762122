//! First-visit registration gate
//!
//! A first-time visitor sees a blocking registration prompt shortly after the
//! landing page renders. Submitting the form or continuing anonymously ends
//! the gate for good; the outcome is stored durably so the prompt never
//! returns in the same browser.

pub mod controller;
pub mod error;
pub mod guard;
pub mod metadata;
pub mod state;
pub mod tracker;

pub use controller::{GateOptions, TrackingTask, VisitorGateController};
pub use error::{NavigationBlocked, TrackingError};
pub use guard::NavigationGuard;
pub use metadata::ClientMetadata;
pub use state::{GateState, StoredFlags};
pub use tracker::{HttpVisitorTracker, VisitorTracker};
