//! Static audio asset and the visitor-facing download action

use crate::error::{Error, Result};
use fest_common::config::AudioConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// The one background track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    /// File on disk
    pub path: PathBuf,
    /// URL path the track is served from
    pub public_path: String,
    /// File name offered on download
    pub download_name: String,
}

impl AudioAsset {
    pub fn from_config(config: &AudioConfig) -> Self {
        Self {
            path: config.asset_path.clone(),
            public_path: config.public_path.clone(),
            download_name: config.download_name.clone(),
        }
    }
}

impl Default for AudioAsset {
    fn default() -> Self {
        Self::from_config(&AudioConfig::default())
    }
}

/// Destination for the download action (the browser's file-save counterpart)
pub trait DownloadSink: Send + Sync {
    /// Save a copy of the asset; returns where it landed
    fn save(&self, asset: &AudioAsset) -> Result<PathBuf>;
}

/// Copies the asset into a directory, never overwriting an earlier download
#[derive(Debug, Clone)]
pub struct DirectoryDownloadSink {
    target_dir: PathBuf,
}

impl DirectoryDownloadSink {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }

    /// The user's download directory, falling back to the working directory
    pub fn user_downloads() -> Self {
        Self::new(dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// `name.ext`, then `name (1).ext`, `name (2).ext`, ...
    fn unique_destination(&self, file_name: &str) -> PathBuf {
        let candidate = self.target_dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }

        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

        (1u32..)
            .map(|n| match &extension {
                Some(ext) => self.target_dir.join(format!("{} ({}).{}", stem, n, ext)),
                None => self.target_dir.join(format!("{} ({})", stem, n)),
            })
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }
}

impl DownloadSink for DirectoryDownloadSink {
    fn save(&self, asset: &AudioAsset) -> Result<PathBuf> {
        if !asset.path.is_file() {
            return Err(Error::Download(format!(
                "Audio asset not found: {}",
                asset.path.display()
            )));
        }

        std::fs::create_dir_all(&self.target_dir)?;
        let destination = self.unique_destination(&asset.download_name);
        std::fs::copy(&asset.path, &destination)?;
        info!("Saved {} to {}", asset.download_name, destination.display());
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn asset_in(dir: &Path) -> AudioAsset {
        let path = dir.join("theme.mp3");
        std::fs::write(&path, b"ID3 fake mp3 bytes").unwrap();
        AudioAsset {
            path,
            public_path: "/audio/theme.mp3".to_string(),
            download_name: "festival-theme.mp3".to_string(),
        }
    }

    #[test]
    fn test_save_copies_bytes() {
        let source = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        let sink = DirectoryDownloadSink::new(downloads.path());

        let saved = sink.save(&asset_in(source.path())).unwrap();
        assert_eq!(saved, downloads.path().join("festival-theme.mp3"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"ID3 fake mp3 bytes");
    }

    #[test]
    fn test_repeat_download_does_not_overwrite() {
        let source = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        let sink = DirectoryDownloadSink::new(downloads.path());
        let asset = asset_in(source.path());

        sink.save(&asset).unwrap();
        let second = sink.save(&asset).unwrap();
        let third = sink.save(&asset).unwrap();

        assert_eq!(second, downloads.path().join("festival-theme (1).mp3"));
        assert_eq!(third, downloads.path().join("festival-theme (2).mp3"));
    }

    #[test]
    fn test_missing_asset_is_download_error() {
        let downloads = TempDir::new().unwrap();
        let sink = DirectoryDownloadSink::new(downloads.path());
        let asset = AudioAsset {
            path: downloads.path().join("missing.mp3"),
            ..AudioAsset::default()
        };

        assert!(matches!(sink.save(&asset), Err(Error::Download(_))));
    }
}
