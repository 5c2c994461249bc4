//! Stream download and conversion to the target format

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use crate::error::{FetchError, TranscodeError};
use crate::media::{AudioFormat, MediaSource, StreamInfo, Transcoder};

/// Fetches selected streams and converts them in place
pub struct Downloader {
    source: Arc<dyn MediaSource>,
    transcoder: Arc<dyn Transcoder>,
    format: AudioFormat,
}

impl Downloader {
    pub fn new(
        source: Arc<dyn MediaSource>,
        transcoder: Arc<dyn Transcoder>,
        format: AudioFormat,
    ) -> Self {
        Self {
            source,
            transcoder,
            format,
        }
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Download a stream into `dir` under the source's file name
    pub async fn fetch(&self, stream: &StreamInfo, dir: &Path) -> Result<PathBuf, FetchError> {
        let path = self.source.fetch(stream, dir).await?;
        debug!("Fetched: {}", path.display());
        Ok(path)
    }

    /// Convert a fetched file at the stream's bitrate, replacing it
    pub async fn transcode(
        &self,
        fetched: &Path,
        stream: &StreamInfo,
    ) -> Result<PathBuf, TranscodeError> {
        transcode_replacing(
            self.transcoder.as_ref(),
            fetched,
            self.format,
            stream.bitrate_kbps(),
        )
        .await
    }
}

/// Transcode `source` into a sibling with the format's extension
///
/// The source is deleted only after the encoder succeeded. On failure it is
/// left where it was and any partial output is removed. A source that already carries the target extension is
/// encoded to a temporary sibling and then renamed over itself.
pub async fn transcode_replacing(
    transcoder: &dyn Transcoder,
    source: &Path,
    format: AudioFormat,
    bitrate_kbps: Option<u32>,
) -> Result<PathBuf, TranscodeError> {
    let target = source.with_extension(format.extension());

    if target == source {
        let temp = source.with_extension(format!("transcode.{}", format.extension()));
        if let Err(e) = transcoder.transcode(source, &temp, format, bitrate_kbps).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }
        fs::rename(&temp, &target).await?;
        return Ok(target);
    }

    if let Err(e) = transcoder.transcode(source, &target, format, bitrate_kbps).await {
        let _ = fs::remove_file(&target).await;
        return Err(e);
    }
    fs::remove_file(source).await?;

    debug!("Converted {} -> {}", source.display(), target.display());
    Ok(target)
}
