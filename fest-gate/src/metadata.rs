//! Passively observable client metadata
//!
//! Only what a page could read without asking the visitor: user agent,
//! referrer, screen size, timezone, language. Nothing here identifies a person.

use chrono::{DateTime, Utc};
use fest_common::AnonymousVisit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMetadata {
    pub user_agent: String,
    pub referrer: String,
    pub screen_resolution: String,
    pub timezone: String,
    pub language: String,
}

impl ClientMetadata {
    /// Metadata available to a native host
    pub fn detect() -> Self {
        Self {
            user_agent: format!(
                "fest-client/{} ({})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ),
            referrer: "direct".to_string(),
            screen_resolution: "unknown".to_string(),
            timezone: std::env::var("TZ")
                .ok()
                .filter(|tz| !tz.is_empty())
                .unwrap_or_else(|| "UTC".to_string()),
            language: std::env::var("LANG")
                .ok()
                .and_then(|lang| language_tag(&lang))
                .unwrap_or_else(|| "en-US".to_string()),
        }
    }

    /// Record sent when the visitor skips registration
    pub fn anonymous_visit(&self, timestamp: DateTime<Utc>) -> AnonymousVisit {
        AnonymousVisit {
            anonymous: true,
            timestamp,
            user_agent: self.user_agent.clone(),
            referrer: self.referrer.clone(),
            screen_resolution: self.screen_resolution.clone(),
            timezone: self.timezone.clone(),
            language: self.language.clone(),
        }
    }
}

/// POSIX locale (`en_US.UTF-8`) to BCP 47 tag (`en-US`)
fn language_tag(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next()?.trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tag() {
        assert_eq!(language_tag("en_US.UTF-8").as_deref(), Some("en-US"));
        assert_eq!(language_tag("ne_NP").as_deref(), Some("ne-NP"));
        assert_eq!(language_tag("de_DE@euro").as_deref(), Some("de-DE"));
        assert_eq!(language_tag("C.UTF-8"), None);
        assert_eq!(language_tag("POSIX"), None);
        assert_eq!(language_tag(""), None);
    }

    #[test]
    fn test_anonymous_visit_carries_metadata_only() {
        let metadata = ClientMetadata {
            user_agent: "Mozilla/5.0".to_string(),
            referrer: "https://poster.example".to_string(),
            screen_resolution: "390x844".to_string(),
            timezone: "Asia/Kathmandu".to_string(),
            language: "ne-NP".to_string(),
        };
        let at: DateTime<Utc> = "2026-03-01T10:00:00Z".parse().unwrap();

        let visit = metadata.anonymous_visit(at);
        assert!(visit.anonymous);
        assert_eq!(visit.timestamp, at);
        assert_eq!(visit.screen_resolution, "390x844");
        assert_eq!(visit.referrer, "https://poster.example");
    }
}
