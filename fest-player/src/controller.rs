//! Cross-navigation background music controller
//!
//! # State ownership
//!
//! - `is_playing` changes only when the media resource confirms a transition
//!   (`MediaEvent::Play` / `MediaEvent::Pause`). Requests never flip it, so a
//!   caller reading `is_playing()` right after `toggle_play()` sees the old
//!   value until the event task has applied the confirmation.
//! - Confirmed transitions are persisted as the durable playback intent and
//!   then announced to subscribers, synchronously and in registration order.
//! - While the current route disallows music, nothing starts playback and a
//!   confirmed `Play` is answered with a pause.
//!
//! # Persistence
//!
//! | Key | Scope | Written |
//! |---|---|---|
//! | `music_player_state` | durable | every confirmed transition |
//! | `music_current_time` | session | every time update while playing, and on unload |
//! | `music_was_playing` | session | on unload while playing (consumed at startup) |

use crate::download::{AudioAsset, DirectoryDownloadSink, DownloadSink};
use crate::error::PlayRejected;
use crate::listeners::{ListenerRegistry, Subscription};
use crate::media::{MediaEvent, MediaEventSender, MediaResource};
use crate::registry::GLOBAL_PLAYER;
use crate::state::{PlaybackSession, PlaybackSnapshot, PlaybackState};
use fest_common::storage::keys;
use fest_common::{ClientStorage, StorageScope};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Construction options
#[derive(Clone)]
pub struct PlayerOptions {
    pub asset: AudioAsset,
    /// Whether the route the controller starts on allows music
    pub music_allowed: bool,
    pub downloader: Arc<dyn DownloadSink>,
}

impl PlayerOptions {
    pub fn new(asset: AudioAsset) -> Self {
        Self {
            asset,
            music_allowed: true,
            downloader: Arc::new(DirectoryDownloadSink::user_downloads()),
        }
    }

    pub fn with_music_allowed(mut self, allowed: bool) -> Self {
        self.music_allowed = allowed;
        self
    }

    pub fn with_downloader(mut self, downloader: Arc<dyn DownloadSink>) -> Self {
        self.downloader = downloader;
        self
    }
}

/// Outcome of a play request
enum PlayAttempt {
    Requested,
    Ineligible,
    Rejected(PlayRejected),
}

/// Owner of the single background-music resource
///
/// # Mutex Unwrap Justification
///
/// Locks are held only for short field updates and resource calls; a poisoned
/// lock means a panic already corrupted playback state, so failing fast is the
/// correct behavior.
pub struct MediaPlaybackController {
    resource: Mutex<Box<dyn MediaResource>>,
    session: Mutex<PlaybackSession>,
    listeners: ListenerRegistry,
    storage: ClientStorage,
    asset: AudioAsset,
    downloader: Arc<dyn DownloadSink>,
}

impl MediaPlaybackController {
    /// Process-wide controller
    ///
    /// The first call builds the controller through `start`; later calls
    /// return the same instance and ignore their arguments. Must be called
    /// from within a tokio runtime.
    pub fn instance<F>(options: PlayerOptions, storage: ClientStorage, factory: F) -> Arc<Self>
    where
        F: FnOnce(&AudioAsset, MediaEventSender) -> Box<dyn MediaResource>,
    {
        if let Some(existing) = GLOBAL_PLAYER.get() {
            debug!("Reusing existing music controller");
            return existing;
        }
        GLOBAL_PLAYER.get_or_start(|| Self::start(options, storage, factory))
    }

    /// Build a controller outside the global registry
    ///
    /// Creates the media resource, restores the session position, starts the
    /// event task, and resumes playback when the previous page left it
    /// playing. Must be called from within a tokio runtime.
    pub fn start<F>(options: PlayerOptions, storage: ClientStorage, factory: F) -> Arc<Self>
    where
        F: FnOnce(&AudioAsset, MediaEventSender) -> Box<dyn MediaResource>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut resource = factory(&options.asset, MediaEventSender::new(tx));
        resource.set_looping(true);

        let restored = storage
            .read(StorageScope::Session, keys::MUSIC_CURRENT_TIME)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|p| p.is_finite() && *p > 0.0);
        if let Some(position) = restored {
            debug!("Restoring music position {:.2}s", position);
            resource.set_current_time(position);
        }

        let controller = Arc::new(Self {
            resource: Mutex::new(resource),
            session: Mutex::new(PlaybackSession {
                position_seconds: restored.unwrap_or(0.0),
                route_allows_playback: options.music_allowed,
                ..PlaybackSession::default()
            }),
            listeners: ListenerRegistry::default(),
            storage,
            asset: options.asset,
            downloader: options.downloader,
        });

        tokio::spawn(run_event_loop(Arc::downgrade(&controller), rx));

        let intent = controller
            .storage
            .read(StorageScope::Durable, keys::MUSIC_PLAYER_STATE)
            .and_then(|v| v.parse::<PlaybackState>().ok());
        let was_playing = controller
            .storage
            .is_flag_set(StorageScope::Session, keys::MUSIC_WAS_PLAYING);
        controller
            .storage
            .remove(StorageScope::Session, keys::MUSIC_WAS_PLAYING);

        info!(
            "Music controller started (intent: {}, interrupted: {}, allowed: {})",
            intent.map(|s| s.as_str()).unwrap_or("none"),
            was_playing,
            options.music_allowed
        );

        if intent == Some(PlaybackState::Playing) || was_playing {
            controller.resume("startup");
        }

        controller
    }

    /// Confirmed play state
    pub fn is_playing(&self) -> bool {
        self.session.lock().unwrap().is_playing
    }

    /// Whether the current route allows music
    pub fn music_allowed(&self) -> bool {
        self.session.lock().unwrap().route_allows_playback
    }

    /// Last position recorded while playing
    pub fn position_seconds(&self) -> f64 {
        self.session.lock().unwrap().position_seconds
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot::from(&*self.session.lock().unwrap())
    }

    pub fn asset(&self) -> &AudioAsset {
        &self.asset
    }

    /// Pause when playing, otherwise request playback
    ///
    /// A rejected play request arms the one-shot user-interaction retry. On a
    /// route without music only the pause half does anything.
    pub fn toggle_play(&self) {
        if self.is_playing() {
            debug!("Toggle: pausing music");
            self.resource.lock().unwrap().pause();
        } else {
            debug!("Toggle: requesting music");
            self.resume("toggle");
        }
    }

    /// Report whether the current route allows music
    ///
    /// Disallowing pauses at once, including playback that has been requested
    /// but not yet confirmed. Allowing never resumes by itself.
    pub fn set_music_allowed(&self, allowed: bool) {
        {
            let mut session = self.session.lock().unwrap();
            if session.route_allows_playback != allowed {
                debug!("Music allowed on this route: {}", allowed);
            }
            session.route_allows_playback = allowed;
        }

        if !allowed {
            let mut resource = self.resource.lock().unwrap();
            if !resource.is_paused() {
                resource.pause();
            }
        }
    }

    /// Save a copy of the track for the visitor
    pub fn download_music(&self) {
        match self.downloader.save(&self.asset) {
            Ok(path) => debug!("Music downloaded to {}", path.display()),
            Err(e) => warn!("Music download failed: {}", e),
        }
    }

    /// Register a listener for confirmed play/pause transitions
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(PlaybackState) + Send + Sync + 'static,
    {
        self.listeners.subscribe(Arc::new(listener))
    }

    /// Any click or touch in the document
    ///
    /// Fires the pending autoplay retry, if any. The retry is consumed whether
    /// or not the second attempt succeeds.
    pub fn handle_user_interaction(&self) {
        let armed = std::mem::take(&mut self.session.lock().unwrap().retry_armed);
        if !armed {
            return;
        }

        debug!("User interaction: retrying music playback");
        match self.try_play() {
            PlayAttempt::Requested => {}
            PlayAttempt::Ineligible => debug!("Retry dropped: route does not allow music"),
            PlayAttempt::Rejected(e) => warn!("Music retry after user interaction failed: {}", e),
        }
    }

    /// Tab visibility changed
    ///
    /// Hiding records whether music was playing. Showing resumes it when it was
    /// playing at hide time, the resource has since been paused, and the route
    /// still allows music.
    pub fn handle_visibility_change(&self, visible: bool) {
        if !visible {
            let mut session = self.session.lock().unwrap();
            session.playing_when_hidden = session.is_playing;
            return;
        }

        let (was_playing, allowed) = {
            let mut session = self.session.lock().unwrap();
            (
                std::mem::take(&mut session.playing_when_hidden),
                session.route_allows_playback,
            )
        };
        if !was_playing || !allowed || !self.resource.lock().unwrap().is_paused() {
            return;
        }

        debug!("Tab visible again: resuming music");
        self.resume("visibility");
    }

    /// Page is unloading: snapshot position and whether playback was interrupted
    pub fn handle_unload(&self) {
        let position = self.resource.lock().unwrap().current_time();
        let playing = self.is_playing();

        self.storage.write(
            StorageScope::Session,
            keys::MUSIC_CURRENT_TIME,
            &position.to_string(),
        );
        if playing {
            self.storage
                .set_flag(StorageScope::Session, keys::MUSIC_WAS_PLAYING);
        } else {
            self.storage
                .remove(StorageScope::Session, keys::MUSIC_WAS_PLAYING);
        }
        debug!("Unload snapshot: {:.2}s, playing: {}", position, playing);
    }

    /// Request playback, arming the interaction retry on rejection
    fn resume(&self, trigger: &str) {
        match self.try_play() {
            PlayAttempt::Requested => {}
            PlayAttempt::Ineligible => {
                debug!("Ignoring {} play request: route does not allow music", trigger)
            }
            PlayAttempt::Rejected(e) => self.arm_interaction_retry(trigger, e),
        }
    }

    fn try_play(&self) -> PlayAttempt {
        let (allowed, remembered) = {
            let session = self.session.lock().unwrap();
            (session.route_allows_playback, session.position_seconds)
        };
        if !allowed {
            return PlayAttempt::Ineligible;
        }

        let mut resource = self.resource.lock().unwrap();
        // A rebuilt resource starts at zero; pick up where the last one stopped
        if resource.current_time() == 0.0 && remembered > 0.0 {
            resource.set_current_time(remembered);
        }
        match resource.play() {
            Ok(()) => PlayAttempt::Requested,
            Err(e) => PlayAttempt::Rejected(e),
        }
    }

    fn arm_interaction_retry(&self, trigger: &str, rejected: PlayRejected) {
        let mut session = self.session.lock().unwrap();
        if session.retry_armed {
            debug!("{} play rejected, retry already pending", trigger);
            return;
        }
        session.retry_armed = true;
        info!(
            "{} play rejected ({}), waiting for user interaction",
            trigger, rejected.reason
        );
    }

    fn apply_media_event(&self, event: MediaEvent) {
        match event {
            MediaEvent::Play => self.confirm(PlaybackState::Playing),
            MediaEvent::Pause => self.confirm(PlaybackState::Paused),
            MediaEvent::TimeUpdate { position } => {
                {
                    let mut session = self.session.lock().unwrap();
                    if !session.is_playing {
                        return;
                    }
                    session.position_seconds = position;
                }
                self.storage.write(
                    StorageScope::Session,
                    keys::MUSIC_CURRENT_TIME,
                    &position.to_string(),
                );
            }
        }
    }

    fn confirm(&self, state: PlaybackState) {
        let playing = state.is_playing();
        let (changed, allowed) = {
            let mut session = self.session.lock().unwrap();
            let changed = session.is_playing != playing;
            session.is_playing = playing;
            if playing {
                session.retry_armed = false;
            }
            (changed, session.route_allows_playback)
        };

        self.storage
            .write(StorageScope::Durable, keys::MUSIC_PLAYER_STATE, state.as_str());

        if changed {
            debug!("Music {}", state);
            self.listeners.notify(state);
        }

        if playing && !allowed {
            debug!("Playback confirmed on a route without music, pausing");
            self.resource.lock().unwrap().pause();
        }
    }
}

/// Apply media events until the controller or the resource goes away
async fn run_event_loop(
    controller: Weak<MediaPlaybackController>,
    mut rx: mpsc::UnboundedReceiver<MediaEvent>,
) {
    while let Some(event) = rx.recv().await {
        match controller.upgrade() {
            Some(controller) => controller.apply_media_event(event),
            None => break,
        }
    }
    debug!("Music event loop stopped");
}
