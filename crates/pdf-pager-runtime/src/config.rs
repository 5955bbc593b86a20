use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Viewer settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Width in pixels that pages are rendered at
    pub target_width: u32,
    /// Document types offered by the file chooser
    pub mime_types: Vec<String>,
    /// Pages on each side of the visible one that are rendered ahead of time
    pub prefetch_distance: usize,
    /// Log lines kept for the in-app log panel
    pub max_log_entries: usize,
    /// Open the bundled sample document when the viewer starts
    pub open_sample_on_start: bool,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            target_width: 800,
            mime_types: vec![PDF_MIME_TYPE.to_string()],
            prefetch_distance: 1,
            max_log_entries: 500,
            open_sample_on_start: true,
        }
    }
}

impl PagerConfig {
    /// Load settings from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Like [`PagerConfig::load`], but a missing file yields the defaults
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path).await {
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Save settings to a JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
