//! Artwork de-duplication by (artist, album)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use super::fetcher::ArtworkFetcher;
use crate::error::ArtworkError;
use crate::utils::sanitize_filename;

/// Filesystem-safe cache key for an album's artwork
pub fn artwork_key(artist: &str, album: &str) -> String {
    sanitize_filename(&format!("Artist-{}_Album-{}", artist, album))
}

/// Local artwork file and the bytes newly written to obtain it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtwork {
    pub path: PathBuf,
    /// Zero on a cache hit
    pub bytes_written: u64,
}

/// Downloads each album cover at most once per batch
///
/// A key is a hit when it was stored earlier in the batch or its file already
/// exists on disk. Albums whose keys collide after sanitization share the
/// first file written. Lookups take `&mut self`, so the existence check and
/// the write for a key never interleave.
pub struct ArtworkCache {
    dir: PathBuf,
    fetcher: Arc<dyn ArtworkFetcher>,
    entries: HashMap<String, PathBuf>,
}

impl ArtworkCache {
    /// Open the cache in `dir`, creating the directory if needed
    pub async fn open(dir: PathBuf, fetcher: Arc<dyn ArtworkFetcher>) -> Result<Self, ArtworkError> {
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            fetcher,
            entries: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the artwork for this album is stored at
    pub fn path_for(&self, artist: &str, album: &str) -> PathBuf {
        self.dir.join(format!("{}.jpg", artwork_key(artist, album)))
    }

    /// Local artwork for an album, downloading it on a miss
    pub async fn fetch(
        &mut self,
        artist: &str,
        album: &str,
        url: &str,
    ) -> Result<CachedArtwork, ArtworkError> {
        let key = artwork_key(artist, album);

        if let Some(path) = self.entries.get(&key) {
            debug!("Artwork cache hit: {}", key);
            return Ok(CachedArtwork {
                path: path.clone(),
                bytes_written: 0,
            });
        }

        let path = self.path_for(artist, album);
        if fs::try_exists(&path).await? {
            debug!("Artwork already on disk: {}", path.display());
            self.entries.insert(key, path.clone());
            return Ok(CachedArtwork {
                path,
                bytes_written: 0,
            });
        }

        let data = self.fetcher.fetch_image(url).await?;
        fs::write(&path, &data).await?;
        debug!("Cached artwork {} ({} bytes)", path.display(), data.len());

        self.entries.insert(key, path.clone());
        Ok(CachedArtwork {
            path,
            bytes_written: data.len() as u64,
        })
    }

    /// Number of albums resolved so far in this batch
    pub fn album_count(&self) -> usize {
        self.entries.len()
    }
}
