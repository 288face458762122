//! Storage key names
//!
//! The values are part of the persisted layout and must not change between
//! releases, otherwise returning visitors lose their saved state.

/// Durable: last confirmed playback intent, `"playing"` or `"paused"`
pub const MUSIC_PLAYER_STATE: &str = "music_player_state";

/// Per-session: last known playback offset in seconds (stringified float)
pub const MUSIC_CURRENT_TIME: &str = "music_current_time";

/// Per-session: `"true"` when the previous page unloaded mid-playback
pub const MUSIC_WAS_PLAYING: &str = "music_was_playing";

/// Durable: `"true"` once the visitor finished the gate by either path
pub const HAS_VISITED_BEFORE: &str = "hasVisitedBefore";

/// Durable: `"true"` once the registration form was submitted
pub const VISITOR_FORM_COMPLETED: &str = "visitorFormCompleted";

/// Durable: `"true"` once the visitor chose to continue anonymously
pub const VISITOR_SKIPPED: &str = "visitorSkipped";

/// Value written for boolean flags
pub const FLAG_TRUE: &str = "true";
