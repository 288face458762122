//! Visitor gate controller
//!
//! Holds the `GateState`, persists completion, runs the first-visit prompt
//! timer, and fires the anonymous tracking call when the visitor skips.
//!
//! Durable flags written here:
//!
//! | Key | Written on |
//! |---|---|
//! | `hasVisitedBefore` | completion by either path |
//! | `visitorFormCompleted` | registration form submitted |
//! | `visitorSkipped` | anonymous skip |

use crate::metadata::ClientMetadata;
use crate::state::{GateState, StoredFlags};
use crate::tracker::VisitorTracker;
use chrono::Utc;
use fest_common::config::GateConfig;
use fest_common::storage::keys;
use fest_common::{ClientStorage, StorageScope};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Construction options
#[derive(Debug, Clone)]
pub struct GateOptions {
    /// Delay between the first render and the prompt appearing
    pub prompt_delay: Duration,
    pub metadata: ClientMetadata,
}

impl GateOptions {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            prompt_delay: config.prompt_delay(),
            metadata: ClientMetadata::detect(),
        }
    }

    pub fn with_metadata(mut self, metadata: ClientMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Default for GateOptions {
    fn default() -> Self {
        Self::from_config(&GateConfig::default())
    }
}

/// Detached anonymous-visit tracking call
///
/// The gate never waits on it. Awaiting `join` is only useful to callers that
/// want to know the attempt has finished (it never reports failure).
#[must_use = "the tracking call runs detached; drop the task if you do not need to wait for it"]
pub struct TrackingTask {
    handle: Option<JoinHandle<()>>,
}

impl TrackingTask {
    fn none() -> Self {
        Self { handle: None }
    }

    /// Whether a tracking call was started
    pub fn is_started(&self) -> bool {
        self.handle.is_some()
    }

    pub async fn join(self) {
        if let Some(handle) = self.handle {
            if let Err(e) = handle.await {
                warn!("Anonymous visit tracking task aborted: {}", e);
            }
        }
    }
}

/// First-visit registration gate
///
/// # Mutex Unwrap Justification
///
/// Locks guard plain value swaps and are never held across an await; a
/// poisoned lock can only follow a panic inside this type.
pub struct VisitorGateController {
    state: Mutex<GateState>,
    changes: watch::Sender<GateState>,
    storage: ClientStorage,
    tracker: Arc<dyn VisitorTracker>,
    metadata: ClientMetadata,
    prompt_timer: Mutex<Option<JoinHandle<()>>>,
}

impl VisitorGateController {
    /// Hydrate from durable storage and arm the prompt timer on a first visit
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        options: GateOptions,
        storage: ClientStorage,
        tracker: Arc<dyn VisitorTracker>,
    ) -> Arc<Self> {
        let flags = StoredFlags::load(&storage);
        let initial = GateState::hydrate(flags);
        let (changes, _) = watch::channel(initial);

        let gate = Arc::new(Self {
            state: Mutex::new(initial),
            changes,
            storage,
            tracker,
            metadata: options.metadata,
            prompt_timer: Mutex::new(None),
        });

        info!("Visitor gate started in state {} ({:?})", initial, flags);

        if initial == GateState::PendingPrompt {
            // Deadline fixed now, not when the task first runs
            let deadline = Instant::now() + options.prompt_delay;
            let weak = Arc::downgrade(&gate);
            let timer = tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                if let Some(gate) = weak.upgrade() {
                    gate.transition(GateState::on_prompt_timer);
                }
            });
            *gate.prompt_timer.lock().unwrap() = Some(timer);
        }

        gate
    }

    pub fn state(&self) -> GateState {
        *self.state.lock().unwrap()
    }

    /// Receiver notified on every state change
    pub fn watch(&self) -> watch::Receiver<GateState> {
        self.changes.subscribe()
    }

    pub fn has_completed_form(&self) -> bool {
        self.state().has_completed_form()
    }

    pub fn is_popup_visible(&self) -> bool {
        self.state().is_popup_visible()
    }

    pub fn is_anonymous_visitor(&self) -> bool {
        self.state().is_anonymous_visitor()
    }

    /// `true` completes through the registration path; completion is never undone
    pub fn set_has_completed_form(&self, completed: bool) {
        if completed {
            self.complete_registration();
        } else if self.has_completed_form() {
            warn!("Ignoring attempt to reset a completed visitor gate");
        }
    }

    /// Show or hide the prompt; ignored once the gate is completed
    pub fn set_popup_visible(&self, visible: bool) {
        self.transition(|s| s.with_popup_visible(visible));
    }

    /// The label is fixed by the completion path and never changes afterwards
    ///
    /// Skipping sets it, registering clears it; any other request is ignored.
    pub fn set_is_anonymous_visitor(&self, anonymous: bool) {
        let state = self.state();
        if state.is_anonymous_visitor() != anonymous {
            warn!(
                "Ignoring attempt to mark visitor gate ({}) as anonymous={}",
                state, anonymous
            );
        }
    }

    /// Registration form submitted
    ///
    /// The form's own submission stores the contact details; this only closes
    /// the gate and records the outcome.
    pub fn complete_registration(&self) {
        let (before, after) = self.transition(|s| s.complete(false));
        if before == after {
            return;
        }

        self.storage
            .set_flag(StorageScope::Durable, keys::HAS_VISITED_BEFORE);
        self.storage
            .set_flag(StorageScope::Durable, keys::VISITOR_FORM_COMPLETED);
        info!("Visitor registered");
    }

    /// Continue without registering
    ///
    /// Closes the gate and persists the outcome immediately. The anonymous
    /// visit record is sent on a detached task whose failure is only logged.
    pub fn skip_as_anonymous(&self) -> TrackingTask {
        let (before, after) = self.transition(|s| s.complete(true));
        if before == after {
            debug!("Skip ignored: gate already {}", before);
            return TrackingTask::none();
        }

        self.storage
            .set_flag(StorageScope::Durable, keys::HAS_VISITED_BEFORE);
        self.storage
            .set_flag(StorageScope::Durable, keys::VISITOR_SKIPPED);
        info!("Visitor continued anonymously");

        let visit = self.metadata.anonymous_visit(Utc::now());
        let tracker = Arc::clone(&self.tracker);
        let handle = tokio::spawn(async move {
            match tracker.record_anonymous_visit(&visit).await {
                Ok(()) => debug!("Anonymous visit recorded"),
                Err(e) => warn!("Anonymous visit tracking failed: {}", e),
            }
        });

        TrackingTask {
            handle: Some(handle),
        }
    }

    /// Apply a transition; returns (before, after)
    fn transition(&self, f: impl FnOnce(GateState) -> GateState) -> (GateState, GateState) {
        let (before, after) = {
            let mut state = self.state.lock().unwrap();
            let before = *state;
            *state = f(before);
            (before, *state)
        };

        if before != after {
            debug!("Visitor gate {} -> {}", before, after);
            if before == GateState::PendingPrompt {
                self.cancel_prompt_timer();
            }
            self.changes.send_replace(after);
        }
        (before, after)
    }

    fn cancel_prompt_timer(&self) {
        if let Some(timer) = self.prompt_timer.lock().unwrap().take() {
            timer.abort();
        }
    }
}

impl Drop for VisitorGateController {
    fn drop(&mut self) {
        self.cancel_prompt_timer();
    }
}
