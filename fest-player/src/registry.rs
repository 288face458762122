//! Process-wide controller registry
//!
//! Holds at most one controller. The first `get_or_start` builds it; every
//! later call returns the same `Arc`, so views mounted on later pages share
//! the resource created by the first one.

use crate::controller::MediaPlaybackController;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Controller slot, written at most once
pub struct PlayerRegistry {
    slot: OnceCell<Arc<MediaPlaybackController>>,
}

/// The registry behind `MediaPlaybackController::instance`
pub static GLOBAL_PLAYER: PlayerRegistry = PlayerRegistry::new();

impl PlayerRegistry {
    pub const fn new() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// Existing controller, or the one `start` builds (called at most once)
    pub fn get_or_start<F>(&self, start: F) -> Arc<MediaPlaybackController>
    where
        F: FnOnce() -> Arc<MediaPlaybackController>,
    {
        Arc::clone(self.slot.get_or_init(start))
    }

    pub fn get(&self) -> Option<Arc<MediaPlaybackController>> {
        self.slot.get().cloned()
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
