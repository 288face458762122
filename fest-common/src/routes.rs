//! Route allow-list policy
//!
//! Decides which routes may play background music and which route is the
//! landing route guarded by the visitor gate.

use serde::{Deserialize, Serialize};

/// Route configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePolicy {
    /// Landing route (site root)
    #[serde(default = "default_landing")]
    pub landing: String,

    /// Routes on which music may play
    ///
    /// `/` matches only itself. Every other entry matches the exact path and
    /// any sub-path, so `/events` also allows `/events/lantern-night`.
    #[serde(default = "default_music_routes")]
    pub music_routes: Vec<String>,
}

fn default_landing() -> String {
    "/".to_string()
}

fn default_music_routes() -> Vec<String> {
    ["/", "/events", "/gallery", "/news", "/blogs", "/homestays", "/contact"]
        .iter()
        .map(|r| r.to_string())
        .collect()
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            landing: default_landing(),
            music_routes: default_music_routes(),
        }
    }
}

impl RoutePolicy {
    pub fn new(landing: impl Into<String>, music_routes: Vec<String>) -> Self {
        Self {
            landing: landing.into(),
            music_routes,
        }
    }

    /// Whether music may play on `route`
    pub fn allows(&self, route: &str) -> bool {
        let path = normalize(route);
        self.music_routes.iter().any(|entry| {
            let entry = normalize(entry);
            if entry == "/" {
                path == "/"
            } else {
                path == entry
                    || path
                        .strip_prefix(entry)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        })
    }

    /// Whether `route` is the landing route
    pub fn is_landing(&self, route: &str) -> bool {
        normalize(route) == normalize(&self.landing)
    }
}

/// Strip query string, fragment and trailing slashes (root stays `/`)
pub fn normalize(route: &str) -> &str {
    let end = route.find(['?', '#']).unwrap_or(route.len());
    let path = route[..end].trim_end_matches('/');
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/events/"), "/events");
        assert_eq!(normalize("/news?page=2"), "/news");
        assert_eq!(normalize("/gallery#top"), "/gallery");
        assert_eq!(normalize("/?ref=poster"), "/");
    }

    #[test]
    fn test_root_matches_only_itself() {
        let policy = RoutePolicy::new("/", vec!["/".to_string()]);
        assert!(policy.allows("/"));
        assert!(policy.allows("/?utm=flyer"));
        assert!(!policy.allows("/events"));
        assert!(!policy.allows("/admin"));
    }

    #[test]
    fn test_prefix_entries_match_sub_paths() {
        let policy = RoutePolicy::default();
        assert!(policy.allows("/events"));
        assert!(policy.allows("/events/lantern-night"));
        assert!(policy.allows("/blogs/2024/food-stalls"));
        assert!(!policy.allows("/eventsarchive"));
        assert!(!policy.allows("/admin"));
        assert!(!policy.allows("/admin/blogs"));
    }

    #[test]
    fn test_is_landing() {
        let policy = RoutePolicy::default();
        assert!(policy.is_landing("/"));
        assert!(policy.is_landing("/#hero"));
        assert!(!policy.is_landing("/events"));
    }
}
