//! Gate state machine
//!
//! ```text
//!            first visit             timer
//! Unknown ──────────────► PendingPrompt ──────► PromptVisible
//!    │                         │                     │
//!    │        submit form / skip (from any open state)
//!    └─────────────────────────┴─────────────────────┴──► CompletedRegistered
//!                                                     └──► CompletedAnonymous
//! ```
//!
//! Completed states are terminal. Hiding the prompt (or cancelling a pending
//! one) returns to `Unknown`. "Prompt visible" and "form completed" are
//! different variants, so both can never hold at once.

use fest_common::storage::keys;
use fest_common::{ClientStorage, StorageScope};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Not prompting, not completed
    Unknown,
    /// First visit; prompt timer running
    PendingPrompt,
    /// Prompt on screen, navigation away from the landing route blocked
    PromptVisible,
    /// Registration form submitted
    CompletedRegistered,
    /// Visitor continued anonymously
    CompletedAnonymous,
}

/// Durable flags read at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredFlags {
    pub has_visited_before: bool,
    pub form_completed: bool,
    pub skipped: bool,
}

impl StoredFlags {
    pub fn load(storage: &ClientStorage) -> Self {
        Self {
            has_visited_before: storage
                .is_flag_set(StorageScope::Durable, keys::HAS_VISITED_BEFORE),
            form_completed: storage
                .is_flag_set(StorageScope::Durable, keys::VISITOR_FORM_COMPLETED),
            skipped: storage.is_flag_set(StorageScope::Durable, keys::VISITOR_SKIPPED),
        }
    }
}

impl GateState {
    /// Initial state from stored flags
    pub fn hydrate(flags: StoredFlags) -> Self {
        match flags {
            StoredFlags {
                has_visited_before: false,
                ..
            } => GateState::PendingPrompt,
            StoredFlags { skipped: true, .. } => GateState::CompletedAnonymous,
            StoredFlags {
                form_completed: true,
                ..
            } => GateState::CompletedRegistered,
            // Visited, but neither path recorded: stay quiet
            _ => GateState::Unknown,
        }
    }

    pub fn has_completed_form(self) -> bool {
        matches!(
            self,
            GateState::CompletedRegistered | GateState::CompletedAnonymous
        )
    }

    pub fn is_popup_visible(self) -> bool {
        self == GateState::PromptVisible
    }

    pub fn is_anonymous_visitor(self) -> bool {
        self == GateState::CompletedAnonymous
    }

    /// Prompt delay elapsed
    pub fn on_prompt_timer(self) -> Self {
        match self {
            GateState::PendingPrompt => GateState::PromptVisible,
            other => other,
        }
    }

    /// Show or hide the prompt; completed states ignore this
    pub fn with_popup_visible(self, visible: bool) -> Self {
        match (self, visible) {
            (s, _) if s.has_completed_form() => s,
            (_, true) => GateState::PromptVisible,
            (_, false) => GateState::Unknown,
        }
    }

    /// Finish the gate by either path; completed states ignore this
    pub fn complete(self, anonymous: bool) -> Self {
        match self {
            s if s.has_completed_form() => s,
            _ if anonymous => GateState::CompletedAnonymous,
            _ => GateState::CompletedRegistered,
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateState::Unknown => "unknown",
            GateState::PendingPrompt => "pending-prompt",
            GateState::PromptVisible => "prompt-visible",
            GateState::CompletedRegistered => "completed-registered",
            GateState::CompletedAnonymous => "completed-anonymous",
        };
        f.write_str(name)
    }
}
