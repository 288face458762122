//! Media resource seam
//!
//! A `MediaResource` is the one playable handle the controller owns. Requests
//! (`play`, `pause`) are fire-and-forget: the resource confirms what actually
//! happened by emitting `MediaEvent`s, and only those events move the
//! controller's play state.

use crate::error::PlayRejected;
use tokio::sync::mpsc;

/// Events a media resource reports back to its controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// Playback actually started
    Play,
    /// Playback actually paused (by request or by the platform)
    Pause,
    /// Periodic position report
    TimeUpdate { position: f64 },
}

/// Channel end handed to the media resource at construction
#[derive(Debug, Clone)]
pub struct MediaEventSender {
    tx: mpsc::UnboundedSender<MediaEvent>,
}

impl MediaEventSender {
    pub fn new(tx: mpsc::UnboundedSender<MediaEvent>) -> Self {
        Self { tx }
    }

    /// Report an event; a dropped controller is not an error
    pub fn emit(&self, event: MediaEvent) {
        let _ = self.tx.send(event);
    }
}

/// A single playable media handle
pub trait MediaResource: Send {
    /// Request playback. `Err` means the platform refused outright.
    fn play(&mut self) -> Result<(), PlayRejected>;

    /// Request a pause
    fn pause(&mut self);

    /// Current offset in seconds
    fn current_time(&self) -> f64;

    /// Seek to an offset in seconds
    fn set_current_time(&mut self, seconds: f64);

    fn set_looping(&mut self, looping: bool);

    fn is_paused(&self) -> bool;
}
