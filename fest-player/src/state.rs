//! Playback state types

use std::fmt;
use std::str::FromStr;

/// Confirmed playback state, also the persisted playback intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaybackState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "playing" => Ok(PlaybackState::Playing),
            "paused" => Ok(PlaybackState::Paused),
            other => Err(format!("Unknown playback state '{}'", other)),
        }
    }
}

/// Controller-internal session fields
#[derive(Debug, Default)]
pub(crate) struct PlaybackSession {
    /// Written only when the media resource confirms a transition
    pub is_playing: bool,
    /// Last offset reported while playing
    pub position_seconds: f64,
    pub route_allows_playback: bool,
    /// One-shot user-interaction retry pending
    pub retry_armed: bool,
    /// `is_playing` captured when the tab was hidden
    pub playing_when_hidden: bool,
}

/// Read-only copy of the controller state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub position_seconds: f64,
    pub music_allowed: bool,
    pub retry_armed: bool,
}

impl From<&PlaybackSession> for PlaybackSnapshot {
    fn from(session: &PlaybackSession) -> Self {
        Self {
            is_playing: session.is_playing,
            position_seconds: session.position_seconds,
            music_allowed: session.route_allows_playback,
            retry_armed: session.retry_armed,
        }
    }
}
