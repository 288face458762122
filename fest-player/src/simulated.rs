//! Headless media resource
//!
//! Behaves like a browser audio element without producing sound: requests
//! change the paused flag and emit the matching confirmation events. The
//! paired `SimulatedMediaHandle` plays the role of the platform, advancing the
//! clock, blocking autoplay, or pausing playback behind the controller's back.

use crate::download::AudioAsset;
use crate::error::PlayRejected;
use crate::media::{MediaEvent, MediaEventSender, MediaResource};
use std::sync::{Arc, Mutex};

const AUTOPLAY_REJECTION: &str =
    "NotAllowedError: play() failed because the user didn't interact with the document first";

#[derive(Debug)]
struct SimState {
    paused: bool,
    position: f64,
    looping: bool,
    autoplay_blocked: bool,
    source: Option<String>,
    play_requests: u32,
    pause_requests: u32,
    instances: u32,
    events: Option<MediaEventSender>,
}

impl SimState {
    fn emit(&self, event: MediaEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

/// Simulated media resource
pub struct SimulatedMedia {
    shared: Arc<Mutex<SimState>>,
}

/// Platform-side control over a `SimulatedMedia`
#[derive(Clone)]
pub struct SimulatedMediaHandle {
    shared: Arc<Mutex<SimState>>,
}

impl SimulatedMedia {
    /// Build a factory suitable for `MediaPlaybackController::start` plus its handle
    ///
    /// The handle counts how many resources the factory produced.
    pub fn factory() -> (
        impl FnOnce(&AudioAsset, MediaEventSender) -> Box<dyn MediaResource>,
        SimulatedMediaHandle,
    ) {
        let handle = SimulatedMediaHandle {
            shared: Arc::new(Mutex::new(SimState {
                paused: true,
                position: 0.0,
                looping: false,
                autoplay_blocked: false,
                source: None,
                play_requests: 0,
                pause_requests: 0,
                instances: 0,
                events: None,
            })),
        };

        let shared = Arc::clone(&handle.shared);
        let factory = move |asset: &AudioAsset, events: MediaEventSender| {
            {
                let mut state = shared.lock().unwrap();
                state.instances += 1;
                state.source = Some(asset.public_path.clone());
                state.events = Some(events);
            }
            Box::new(SimulatedMedia { shared }) as Box<dyn MediaResource>
        };

        (factory, handle)
    }
}

impl MediaResource for SimulatedMedia {
    fn play(&mut self) -> Result<(), PlayRejected> {
        let mut state = self.shared.lock().unwrap();
        state.play_requests += 1;
        if state.autoplay_blocked {
            return Err(PlayRejected::new(AUTOPLAY_REJECTION));
        }
        if state.paused {
            state.paused = false;
            state.emit(MediaEvent::Play);
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.shared.lock().unwrap();
        state.pause_requests += 1;
        if !state.paused {
            state.paused = true;
            state.emit(MediaEvent::Pause);
        }
    }

    fn current_time(&self) -> f64 {
        self.shared.lock().unwrap().position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.shared.lock().unwrap().position = seconds.max(0.0);
    }

    fn set_looping(&mut self, looping: bool) {
        self.shared.lock().unwrap().looping = looping;
    }

    fn is_paused(&self) -> bool {
        self.shared.lock().unwrap().paused
    }
}

impl SimulatedMediaHandle {
    /// Advance the playback clock; emits a time update while playing
    pub fn advance(&self, seconds: f64) {
        let mut state = self.shared.lock().unwrap();
        if state.paused {
            return;
        }
        state.position += seconds;
        let position = state.position;
        state.emit(MediaEvent::TimeUpdate { position });
    }

    /// Emit a time update at the current position regardless of play state
    pub fn report_time(&self) {
        let state = self.shared.lock().unwrap();
        state.emit(MediaEvent::TimeUpdate {
            position: state.position,
        });
    }

    /// Pause without a request from the controller (OS audio focus, tab throttling)
    pub fn platform_pause(&self) {
        let mut state = self.shared.lock().unwrap();
        if !state.paused {
            state.paused = true;
            state.emit(MediaEvent::Pause);
        }
    }

    /// Make `play` fail like a browser autoplay policy
    pub fn set_autoplay_blocked(&self, blocked: bool) {
        self.shared.lock().unwrap().autoplay_blocked = blocked;
    }

    /// Move the playhead directly (a freshly rebuilt element starts at zero)
    pub fn set_position(&self, seconds: f64) {
        self.shared.lock().unwrap().position = seconds;
    }

    pub fn position(&self) -> f64 {
        self.shared.lock().unwrap().position
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().unwrap().paused
    }

    pub fn is_looping(&self) -> bool {
        self.shared.lock().unwrap().looping
    }

    pub fn source(&self) -> Option<String> {
        self.shared.lock().unwrap().source.clone()
    }

    pub fn play_requests(&self) -> u32 {
        self.shared.lock().unwrap().play_requests
    }

    pub fn pause_requests(&self) -> u32 {
        self.shared.lock().unwrap().pause_requests
    }

    /// Number of resources the factory created
    pub fn instances(&self) -> u32 {
        self.shared.lock().unwrap().instances
    }
}
