//! Batch orchestration

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::artwork::{ArtworkCache, ArtworkFetcher};
use crate::error::{BatchError, ConfigError, FetchError, ResolveError};
use crate::media::{AudioFormat, MediaSource, Resolver, Transcoder};
use crate::sync::downloader::Downloader;
use crate::sync::progress::{FailedTrack, FailureReason, ProgressDisplay, ProgressTracker};
use crate::sync::tagger::{TrackTags, tag_file_async};
use crate::tracks::{Track, TrackCollection};

/// Subdirectory of the download directory holding cached artwork
pub const ARTWORK_DIR: &str = "Artwork";

/// What happened to a single track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Succeeded { path: PathBuf, bytes_used: u64 },
    FailedAgeRestricted,
}

/// Result of a completed batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Final audio files, in collection order
    pub paths: Vec<PathBuf>,
    pub failures: Vec<FailedTrack>,
    /// Audio bytes plus newly cached artwork bytes
    pub bytes_used: u64,
    pub outcomes: Vec<DownloadOutcome>,
}

impl BatchReport {
    fn record(&mut self, outcome: DownloadOutcome) {
        if let DownloadOutcome::Succeeded { path, bytes_used } = &outcome {
            self.paths.push(path.clone());
            self.bytes_used += bytes_used;
        }
        self.outcomes.push(outcome);
    }
}

/// Runs every track of a collection through search, download, conversion
/// and tagging, one track at a time
pub struct BatchEngine {
    resolver: Resolver,
    downloader: Downloader,
    artwork: Arc<dyn ArtworkFetcher>,
    download_dir: Option<PathBuf>,
}

impl BatchEngine {
    pub fn new(
        source: Arc<dyn MediaSource>,
        transcoder: Arc<dyn Transcoder>,
        artwork: Arc<dyn ArtworkFetcher>,
        format: AudioFormat,
        download_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            resolver: Resolver::new(source.clone()),
            downloader: Downloader::new(source, transcoder, format),
            artwork,
            download_dir,
        }
    }

    /// Whether search output is silenced (on by default)
    pub fn with_silenced_search(mut self, silence: bool) -> Self {
        self.resolver = self.resolver.with_silenced_search(silence);
        self
    }

    /// Download every track in `tracks`
    ///
    /// Age-restricted tracks are recorded as failures and skipped. Any other
    /// error aborts the batch; files finished before it stay on disk.
    pub async fn process_batch(
        &self,
        tracks: &TrackCollection,
        template: &str,
        embed_artwork: bool,
        display: &mut dyn ProgressDisplay,
    ) -> Result<BatchReport, BatchError> {
        let dir = self
            .download_dir
            .as_deref()
            .ok_or(ConfigError::MissingDownloadDir)?;

        if tracks.is_empty() {
            debug!("Empty batch, nothing to do");
            return Ok(BatchReport::default());
        }

        fs::create_dir_all(dir).await?;
        let mut cache = if embed_artwork {
            let cache = ArtworkCache::open(dir.join(ARTWORK_DIR), self.artwork.clone()).await?;
            debug!("Artwork cache at {}", cache.dir().display());
            Some(cache)
        } else {
            None
        };

        info!(
            "Downloading {} tracks to {} ({})",
            tracks.len(),
            dir.display(),
            self.downloader.format()
        );

        let mut report = BatchReport::default();
        let mut tracker = ProgressTracker::new(tracks, display);

        for track in tracks.iter() {
            let outcome = self
                .process_track(&track, dir, template, cache.as_mut(), &mut tracker)
                .await?;
            report.record(outcome);
        }

        report.failures = tracker.completed();
        info!(
            "Batch finished: {} downloaded, {} failed, {} bytes, {} album covers",
            report.paths.len(),
            report.failures.len(),
            report.bytes_used,
            cache.as_ref().map_or(0, ArtworkCache::album_count)
        );
        Ok(report)
    }

    async fn process_track(
        &self,
        track: &Track,
        dir: &Path,
        template: &str,
        cache: Option<&mut ArtworkCache>,
        tracker: &mut ProgressTracker<'_>,
    ) -> Result<DownloadOutcome, BatchError> {
        tracker.searching();
        let stream = match self.resolver.resolve(track, template).await {
            Ok(stream) => stream,
            Err(ResolveError::Extract(e)) if e.is_recoverable() => {
                return Ok(skip(track, &e, tracker));
            }
            Err(e) => return Err(e.into()),
        };

        tracker.downloading();
        let fetched = match self.downloader.fetch(&stream, dir).await {
            Ok(path) => path,
            Err(e) if e.is_recoverable() => return Ok(skip(track, &e, tracker)),
            Err(e) => return Err(e.into()),
        };

        tracker.converting();
        let path = self.downloader.transcode(&fetched, &stream).await?;
        tracker.downloaded();

        let mut artwork_bytes = 0;
        let artwork_path = match cache {
            Some(cache) => {
                let cached = cache
                    .fetch(track.artist(), track.album(), track.artwork_url())
                    .await?;
                artwork_bytes = cached.bytes_written;
                Some(cached.path)
            }
            None => None,
        };

        tag_file_async(path.clone(), TrackTags::from(track), artwork_path).await?;
        tracker.metadata_added();

        let audio_bytes = fs::metadata(&path).await?.len();
        debug!(
            "{} done: {} audio bytes, {} artwork bytes",
            track.name(),
            audio_bytes,
            artwork_bytes
        );

        Ok(DownloadOutcome::Succeeded {
            path,
            bytes_used: audio_bytes + artwork_bytes,
        })
    }
}

fn skip(track: &Track, error: &FetchError, tracker: &mut ProgressTracker<'_>) -> DownloadOutcome {
    warn!("Skipping {}: {}", track.name(), error);
    tracker.error(FailureReason::AgeRestricted);
    DownloadOutcome::FailedAgeRestricted
}
