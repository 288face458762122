//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration lives in a single TOML file. Every field has a
//! compiled default, so a missing file (or a missing section) still yields a
//! usable configuration.
//!
//! Resolution order for the config file and the data root:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config directory (`~/.config/fest/config.toml` on Linux)
//! 4. OS-dependent compiled default (fallback)
//!
//! The site service reads `[server]`, `[audio]` and `[logging]`. The `[gate]`
//! and `[routes]` sections configure the client side and are consumed by
//! `SiteShell::from_config` in `fest-ui`.

use crate::routes::RoutePolicy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "FEST_CONFIG";

/// Environment variable naming the data root folder
pub const ROOT_FOLDER_ENV_VAR: &str = "FEST_ROOT_FOLDER";

/// URL path of the attachment download of the background track
pub const DOWNLOAD_PATH: &str = "/audio/download";

/// Complete festival site configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FestConfig {
    /// Data root (durable client storage, visitor database)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub routes: RoutePolicy,

    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// SQLite file name, relative to the root folder
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

/// Background music asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Path of the audio file on disk
    #[serde(default = "default_asset_path")]
    pub asset_path: PathBuf,

    /// URL path the asset is served from
    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// File name offered when the visitor downloads the track
    #[serde(default = "default_download_name")]
    pub download_name: String,
}

/// Visitor gate settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Delay before the registration prompt appears on a first visit
    #[serde(default = "default_prompt_delay_ms")]
    pub prompt_delay_ms: u64,

    /// Anonymous visit ingestion endpoint
    #[serde(default = "default_tracking_endpoint")]
    pub tracking_endpoint: String,

    #[serde(default = "default_tracking_timeout_ms")]
    pub tracking_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5780".to_string()
}

fn default_database_file() -> String {
    "fest.db".to_string()
}

fn default_asset_path() -> PathBuf {
    PathBuf::from("static/audio/festival-theme.mp3")
}

fn default_public_path() -> String {
    "/audio/festival-theme.mp3".to_string()
}

fn default_download_name() -> String {
    "festival-theme.mp3".to_string()
}

fn default_prompt_delay_ms() -> u64 {
    3500
}

fn default_tracking_endpoint() -> String {
    "http://127.0.0.1:5780/api/visitors".to_string()
}

fn default_tracking_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_file: default_database_file(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            asset_path: default_asset_path(),
            public_path: default_public_path(),
            download_name: default_download_name(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            prompt_delay_ms: default_prompt_delay_ms(),
            tracking_endpoint: default_tracking_endpoint(),
            tracking_timeout_ms: default_tracking_timeout_ms(),
        }
    }
}

impl GateConfig {
    pub fn prompt_delay(&self) -> Duration {
        Duration::from_millis(self.prompt_delay_ms)
    }

    pub fn tracking_timeout(&self) -> Duration {
        Duration::from_millis(self.tracking_timeout_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl FestConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a file
    ///
    /// A missing file is not an error: defaults are used and a warning is logged.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the config file location and load it
    pub fn resolve_and_load(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) => Self::load(&path),
            None => {
                info!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if !self.routes.landing.starts_with('/') {
            return Err(Error::Config(format!(
                "routes.landing must start with '/': {}",
                self.routes.landing
            )));
        }
        if let Some(bad) = self.routes.music_routes.iter().find(|r| !r.starts_with('/')) {
            return Err(Error::Config(format!(
                "routes.music_routes entries must start with '/': {}",
                bad
            )));
        }
        if !self.audio.public_path.starts_with('/') || self.audio.public_path == DOWNLOAD_PATH {
            return Err(Error::Config(format!(
                "audio.public_path must start with '/' and differ from {}: {}",
                DOWNLOAD_PATH, self.audio.public_path
            )));
        }
        // Mounted as a literal router path: no captures or wildcards
        if self.audio.public_path.contains([':', '*', '{', '}']) {
            return Err(Error::Config(format!(
                "audio.public_path must be a literal path: {}",
                self.audio.public_path
            )));
        }
        if self.audio.download_name.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "audio.download_name must be a bare file name: {}",
                self.audio.download_name
            )));
        }
        Ok(())
    }

    /// Data root: CLI argument, then environment, then config file, then OS default
    pub fn resolve_root_folder(&self, cli_arg: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV_VAR) {
            return PathBuf::from(path);
        }
        if let Some(path) = &self.root_folder {
            return path.clone();
        }
        default_root_folder()
    }
}

/// Config file location: CLI argument, then environment, then the user config dir
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|d| d.join("fest").join("config.toml"))
        .filter(|p| p.exists())
}

/// OS-dependent default data root
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/fest (or /var/lib/fest for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("fest"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/fest"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("fest"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/fest"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("fest"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\fest"))
    } else {
        PathBuf::from("./fest_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FestConfig::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:5780");
        assert_eq!(config.gate.prompt_delay(), Duration::from_millis(3500));
        assert_eq!(config.routes.landing, "/");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = FestConfig::from_toml_str(
            r#"
            [gate]
            prompt_delay_ms = 1000

            [routes]
            music_routes = ["/", "/events"]
            "#,
        )
        .unwrap();

        assert_eq!(config.gate.prompt_delay_ms, 1000);
        assert_eq!(config.gate.tracking_timeout_ms, 5000);
        assert_eq!(config.routes.landing, "/");
        assert_eq!(config.routes.music_routes, vec!["/", "/events"]);
        assert_eq!(config.audio.download_name, "festival-theme.mp3");
    }

    #[test]
    fn test_validate_rejects_relative_routes() {
        let config = FestConfig::from_toml_str(
            r#"
            [routes]
            music_routes = ["events"]
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_download_name_with_path() {
        let mut config = FestConfig::default();
        config.audio.download_name = "../theme.mp3".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_public_path_clash() {
        let mut config = FestConfig::default();
        config.audio.public_path = DOWNLOAD_PATH.to_string();
        assert!(config.validate().is_err());

        config.audio.public_path = "audio/theme.mp3".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_router_syntax_in_public_path() {
        for path in ["/audio/:track", "/audio/*rest", "/audio/{track}"] {
            let mut config = FestConfig::default();
            config.audio.public_path = path.to_string();
            assert!(
                matches!(config.validate(), Err(Error::Config(_))),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = FestConfig::from_toml_str("[gate\nprompt_delay_ms = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
