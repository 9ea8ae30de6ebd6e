//! Track catalog provider.
//!
//! Enumerates playable track identifiers once at startup so the vote store
//! can be seeded before any listener requests playback.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

/// File extensions treated as playable audio.
const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "ogg", "wav"];

#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Returns the identifiers of all playable tracks.
    async fn list_tracks(&self) -> Result<Vec<String>>;
}

/// Catalog backed by a flat directory of audio files. File names are the
/// track identifiers.
pub struct FsCatalog {
    root: PathBuf,
}

impl FsCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn is_audio(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                AUDIO_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }
}

#[async_trait]
impl TrackCatalog for FsCatalog {
    async fn list_tracks(&self) -> Result<Vec<String>> {
        let mut tracks = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() || !Self::is_audio(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                tracks.push(name.to_string());
            }
        }

        tracks.sort();
        debug!(root = %self.root.display(), tracks = tracks.len(), "catalog scanned");
        Ok(tracks)
    }
}
