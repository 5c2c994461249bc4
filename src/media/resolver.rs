//! Search query construction and stream selection

use std::sync::Arc;
use tracing::debug;

use super::models::{SearchResult, StreamInfo};
use super::silence::StdioSilencer;
use super::source::MediaSource;
use crate::error::ResolveError;
use crate::tracks::Track;

const PLACEHOLDERS: [&str; 3] = ["NAME", "ARTIST", "ALBUM"];

/// Fill `NAME`, `ARTIST` and `ALBUM` in a search template
///
/// Only the first occurrence of each placeholder is replaced. Substituted
/// values are inserted verbatim and never rescanned, so a track called
/// "ALBUM" stays "ALBUM".
pub fn build_query(template: &str, track: &Track) -> String {
    let values = [track.name(), track.artist(), track.album()];
    let mut used = [false; 3];
    let mut query = String::with_capacity(template.len() + 32);
    let mut rest = template;

    'scan: while !rest.is_empty() {
        for (i, placeholder) in PLACEHOLDERS.iter().enumerate() {
            if !used[i] && rest.starts_with(placeholder) {
                query.push_str(values[i]);
                used[i] = true;
                rest = &rest[placeholder.len()..];
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            query.push(c);
        }
        rest = chars.as_str();
    }

    query
}

/// Highest-bitrate audio-only stream; ties go to the later stream
pub fn select_audio_stream(streams: &[StreamInfo]) -> Option<&StreamInfo> {
    streams
        .iter()
        .filter(|s| s.audio_only)
        .max_by_key(|s| s.bitrate_kbps().unwrap_or(0))
}

/// Resolves a track to the stream that should be downloaded
pub struct Resolver {
    source: Arc<dyn MediaSource>,
    silence_search: bool,
}

impl Resolver {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self {
            source,
            silence_search: true,
        }
    }

    /// Whether stdout/stderr are redirected while the source runs
    pub fn with_silenced_search(mut self, silence: bool) -> Self {
        self.silence_search = silence;
        self
    }

    /// Search once and pick the best audio stream of the first result
    ///
    /// Later results are never looked at, even when the first one cannot be
    /// served.
    pub async fn resolve(&self, track: &Track, template: &str) -> Result<StreamInfo, ResolveError> {
        let query = build_query(template, track);
        debug!("Searching for: {}", query);

        let (first, streams) = if self.silence_search {
            let _quiet = StdioSilencer::acquire()?;
            self.first_result_streams(&query).await?
        } else {
            self.first_result_streams(&query).await?
        };

        let stream = select_audio_stream(&streams)
            .cloned()
            .ok_or(ResolveError::NoStreamFound { query })?;

        debug!(
            "Selected stream {} ({}) from \"{}\"",
            stream.format_id, stream.bitrate, first.title
        );
        Ok(stream)
    }

    async fn first_result_streams(
        &self,
        query: &str,
    ) -> Result<(SearchResult, Vec<StreamInfo>), ResolveError> {
        let first = self
            .source
            .search(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NoResults {
                query: query.to_string(),
            })?;
        let streams = self.source.streams(&first).await?;
        Ok((first, streams))
    }
}
