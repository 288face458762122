//! Site shell: routing, the visitor gate, and the music toggle widget
//!
//! The shell is the one place that knows the current route. Every navigation
//! passes the gate's guard first and then tells the player whether music is
//! allowed on the new route.

use anyhow::{Context, Result};
use fest_common::config::FestConfig;
use fest_common::{ClientStorage, RoutePolicy};
use fest_gate::{
    GateOptions, HttpVisitorTracker, NavigationBlocked, NavigationGuard, VisitorGateController,
};
use fest_player::{
    AudioAsset, MediaEventSender, MediaPlaybackController, MediaResource, PlaybackState,
    PlayerOptions, Subscription,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Label while music plays
pub const PAUSE_LABEL: &str = "Pause music";

/// Label while music is paused
pub const PLAY_LABEL: &str = "Play music";

/// Page chrome shared by every route
///
/// # Mutex Unwrap Justification
///
/// The route lock only guards a string swap.
pub struct SiteShell {
    player: Arc<MediaPlaybackController>,
    gate: Arc<VisitorGateController>,
    guard: NavigationGuard,
    routes: RoutePolicy,
    current_route: Mutex<String>,
}

impl SiteShell {
    /// Mount the shell on the route the visitor entered through
    pub fn new(
        player: Arc<MediaPlaybackController>,
        gate: Arc<VisitorGateController>,
        routes: RoutePolicy,
        entry_route: &str,
    ) -> Self {
        player.set_music_allowed(routes.allows(entry_route));
        Self {
            guard: NavigationGuard::new(routes.clone()),
            player,
            gate,
            routes,
            current_route: Mutex::new(entry_route.to_string()),
        }
    }

    /// Compose a shell from configuration
    ///
    /// Opens client storage under `root_folder`, takes the process-wide player
    /// (built through `media_factory` on first use), and starts the gate with
    /// an HTTP tracker for `gate.tracking_endpoint`. Must be called from within
    /// a tokio runtime.
    pub fn from_config<F>(
        config: &FestConfig,
        root_folder: &Path,
        entry_route: &str,
        media_factory: F,
    ) -> Result<Self>
    where
        F: FnOnce(&AudioAsset, MediaEventSender) -> Box<dyn MediaResource>,
    {
        let storage = ClientStorage::open(root_folder).with_context(|| {
            format!("Failed to open client storage in {}", root_folder.display())
        })?;
        let tracker = HttpVisitorTracker::from_config(&config.gate)
            .context("Failed to build visitor tracker")?;

        let player = MediaPlaybackController::instance(
            PlayerOptions::new(AudioAsset::from_config(&config.audio)),
            storage.clone(),
            media_factory,
        );
        let gate = VisitorGateController::start(
            GateOptions::from_config(&config.gate),
            storage,
            Arc::new(tracker),
        );

        info!(
            "Site shell ready on {} (tracking via {})",
            entry_route, config.gate.tracking_endpoint
        );
        Ok(Self::new(player, gate, config.routes.clone(), entry_route))
    }

    pub fn current_route(&self) -> String {
        self.current_route.lock().unwrap().clone()
    }

    pub fn player(&self) -> &Arc<MediaPlaybackController> {
        &self.player
    }

    pub fn gate(&self) -> &Arc<VisitorGateController> {
        &self.gate
    }

    /// Follow a site link
    ///
    /// A blocked navigation leaves the route and the player untouched; the
    /// error's message is the toast text.
    pub fn navigate(&self, to: &str) -> Result<(), NavigationBlocked> {
        let from = self.current_route();
        self.guard.check(self.gate.state(), &from, to)?;

        *self.current_route.lock().unwrap() = to.to_string();
        let allowed = self.routes.allows(to);
        self.player.set_music_allowed(allowed);
        info!("Navigated {} -> {} (music allowed: {})", from, to, allowed);
        Ok(())
    }

    /// Mount a music toggle widget bound to this shell's player
    pub fn music_toggle(&self) -> MusicToggle {
        MusicToggle::mount(Arc::clone(&self.player))
    }
}

/// What the toggle widget shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleView {
    pub visible: bool,
    pub playing: bool,
    pub label: &'static str,
}

/// Play/pause widget view-model
///
/// Re-renders on every confirmed play/pause transition. Visibility follows
/// the player's route permission, so the widget disappears on routes without
/// music.
pub struct MusicToggle {
    player: Arc<MediaPlaybackController>,
    playing: Arc<Mutex<bool>>,
    renders: Arc<AtomicUsize>,
    subscription: Option<Subscription>,
}

impl MusicToggle {
    pub fn mount(player: Arc<MediaPlaybackController>) -> Self {
        let playing = Arc::new(Mutex::new(player.is_playing()));
        let renders = Arc::new(AtomicUsize::new(1));

        let subscription = {
            let playing = Arc::clone(&playing);
            let renders = Arc::clone(&renders);
            player.subscribe(move |state| {
                *playing.lock().unwrap() = state == PlaybackState::Playing;
                renders.fetch_add(1, Ordering::SeqCst);
                debug!("Music toggle re-rendered: {}", state);
            })
        };

        Self {
            player,
            playing,
            renders,
            subscription: Some(subscription),
        }
    }

    pub fn view(&self) -> ToggleView {
        let playing = *self.playing.lock().unwrap();
        ToggleView {
            visible: self.player.music_allowed(),
            playing,
            label: if playing { PAUSE_LABEL } else { PLAY_LABEL },
        }
    }

    /// Number of renders, the initial one included
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn click(&self) {
        self.player.toggle_play();
    }

    pub fn download(&self) {
        self.player.download_music();
    }
}

impl Drop for MusicToggle {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
