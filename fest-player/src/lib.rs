//! Background music playback for the festival site
//!
//! One looping audio track keeps playing while the visitor moves between
//! pages. `MediaPlaybackController` owns the single media resource, mirrors its
//! confirmed play/pause state, remembers the playback position across reloads,
//! and refuses to play on routes outside the music allow-list.
//!
//! The controller is process-wide: `MediaPlaybackController::instance` hands
//! out the same `Arc` for the lifetime of the process, so re-mounted views
//! never create a second resource.

pub mod controller;
pub mod download;
pub mod error;
mod listeners;
pub mod media;
pub mod registry;
pub mod simulated;
pub mod state;

pub use controller::{MediaPlaybackController, PlayerOptions};
pub use download::{AudioAsset, DirectoryDownloadSink, DownloadSink};
pub use error::{Error, PlayRejected, Result};
pub use listeners::Subscription;
pub use media::{MediaEvent, MediaEventSender, MediaResource};
pub use registry::{PlayerRegistry, GLOBAL_PLAYER};
pub use simulated::{SimulatedMedia, SimulatedMediaHandle};
pub use state::{PlaybackSnapshot, PlaybackState};
