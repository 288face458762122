//! Navigation guard consulted by site links

use crate::error::NavigationBlocked;
use crate::state::GateState;
use fest_common::RoutePolicy;
use tracing::debug;

/// Toast shown when a link is blocked by the open prompt
pub const BLOCKED_MESSAGE: &str =
    "Please complete the registration form or continue as a guest to explore the festival.";

#[derive(Debug, Clone)]
pub struct NavigationGuard {
    routes: RoutePolicy,
}

impl NavigationGuard {
    pub fn new(routes: RoutePolicy) -> Self {
        Self { routes }
    }

    /// Allow or reject a navigation from `from` to `to`
    ///
    /// Rejected only while the prompt is open, the visitor is on the landing
    /// route, and the target is elsewhere. A completed gate allows everything.
    pub fn check(&self, gate: GateState, from: &str, to: &str) -> Result<(), NavigationBlocked> {
        if gate.has_completed_form() || !gate.is_popup_visible() {
            return Ok(());
        }
        if !self.routes.is_landing(from) || self.routes.is_landing(to) {
            return Ok(());
        }

        debug!("Blocked navigation {} -> {} while prompt is open", from, to);
        Err(NavigationBlocked {
            from: from.to_string(),
            to: to.to_string(),
            message: BLOCKED_MESSAGE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> NavigationGuard {
        NavigationGuard::new(RoutePolicy::default())
    }

    #[test]
    fn test_open_prompt_blocks_leaving_landing() {
        for target in ["/events", "/gallery", "/admin", "/news?page=2"] {
            let err = guard()
                .check(GateState::PromptVisible, "/", target)
                .unwrap_err();
            assert_eq!(err.to, target);
            assert_eq!(err.to_string(), BLOCKED_MESSAGE);
        }
    }

    #[test]
    fn test_open_prompt_allows_staying_on_landing() {
        assert!(guard().check(GateState::PromptVisible, "/", "/#schedule").is_ok());
    }

    #[test]
    fn test_completed_gate_allows_everything() {
        for state in [GateState::CompletedRegistered, GateState::CompletedAnonymous] {
            assert!(guard().check(state, "/", "/events").is_ok());
        }
    }

    #[test]
    fn test_closed_prompt_allows_navigation() {
        for state in [GateState::Unknown, GateState::PendingPrompt] {
            assert!(guard().check(state, "/", "/events").is_ok());
        }
    }

    #[test]
    fn test_only_landing_route_is_gated() {
        assert!(guard().check(GateState::PromptVisible, "/events", "/gallery").is_ok());
    }
}
