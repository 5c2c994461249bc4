//! Media source backed by the `yt-dlp` executable

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use super::models::{SearchResult, StreamInfo};
use super::source::MediaSource;
use crate::error::{FetchError, SearchError};

/// Number of results requested per search
const SEARCH_RESULTS: usize = 5;

/// Fragments of yt-dlp error output that mean the video is age gated
const AGE_RESTRICTION_MARKERS: [&str; 4] = [
    "confirm your age",
    "age-restricted",
    "age restricted",
    "inappropriate for some users",
];

/// Search entry as printed by `--flat-playlist`, no formats attached
#[derive(Debug, Deserialize)]
struct FlatEntry {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl From<FlatEntry> for SearchResult {
    fn from(entry: FlatEntry) -> Self {
        let url = entry.url.unwrap_or_else(|| watch_url(&entry.id));
        SearchResult {
            title: entry.title.unwrap_or(entry.id),
            url,
        }
    }
}

/// Full extraction of a single video
#[derive(Debug, Deserialize)]
struct VideoInfo {
    id: String,
    webpage_url: Option<String>,
    #[serde(default)]
    formats: Vec<FormatInfo>,
}

impl VideoInfo {
    fn into_streams(self) -> Vec<StreamInfo> {
        let url = self.webpage_url.unwrap_or_else(|| watch_url(&self.id));
        self.formats
            .into_iter()
            .map(|format| format.into_stream(&url))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct FormatInfo {
    format_id: String,
    ext: String,
    acodec: Option<String>,
    vcodec: Option<String>,
    abr: Option<f64>,
}

impl FormatInfo {
    fn is_audio_only(&self) -> bool {
        self.vcodec.as_deref() == Some("none")
            && self.acodec.as_deref().is_some_and(|codec| codec != "none")
    }

    fn into_stream(self, source_url: &str) -> StreamInfo {
        let audio_only = self.is_audio_only();
        StreamInfo {
            bitrate: format!("{}kbps", self.abr.unwrap_or(0.0).round() as u32),
            format_id: self.format_id,
            source_url: source_url.to_string(),
            extension: self.ext,
            audio_only,
        }
    }
}

fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

/// yt-dlp search and download
pub struct YtDlp {
    program: String,
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl MediaSource for YtDlp {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        // Flat listing only ranks ids; a gated entry must not be dropped here
        let output = Command::new(&self.program)
            .args(["--flat-playlist", "--dump-json", "--no-warnings"])
            .arg(format!("ytsearch{}:{}", SEARCH_RESULTS, query))
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SearchError::Failed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let results = parse_search_output(&stdout)?;

        debug!("yt-dlp returned {} results for \"{}\"", results.len(), query);
        Ok(results)
    }

    async fn streams(&self, result: &SearchResult) -> Result<Vec<StreamInfo>, FetchError> {
        debug!("Extracting formats of {}", result.url);

        let output = Command::new(&self.program)
            .args(["--dump-json", "--no-warnings", "--no-playlist"])
            .arg(&result.url)
            .output()
            .await?;
        let stdout = checked_stdout(output)?;

        let line = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| FetchError::Failed(format!("no media info for {}", result.url)))?;
        let info: VideoInfo = serde_json::from_str(line)?;
        Ok(info.into_streams())
    }

    async fn fetch(&self, stream: &StreamInfo, dir: &Path) -> Result<PathBuf, FetchError> {
        debug!("Fetching format {} of {}", stream.format_id, stream.source_url);

        let output = Command::new(&self.program)
            .arg("-f")
            .arg(&stream.format_id)
            .args(["--no-progress", "--no-warnings", "--no-playlist", "--no-simulate"])
            .arg("-P")
            .arg(dir)
            .args(["-o", "%(title)s.%(ext)s", "--print", "after_move:filepath"])
            .arg(&stream.source_url)
            .output()
            .await?;
        let stdout = checked_stdout(output)?;

        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(PathBuf::from)
            .ok_or_else(|| FetchError::Failed("yt-dlp did not report a file".to_string()))
    }
}

/// Stdout of a finished extraction or download, or its classified failure
fn checked_stdout(output: Output) -> Result<String, FetchError> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(if is_age_restricted(&message) {
        FetchError::AgeRestricted(message)
    } else {
        FetchError::Failed(message)
    })
}

/// Parse `--flat-playlist --dump-json` output, one JSON document per line
fn parse_search_output(stdout: &str) -> Result<Vec<SearchResult>, SearchError> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str::<FlatEntry>(line)
                .map(SearchResult::from)
                .map_err(SearchError::from)
        })
        .collect()
}

fn is_age_restricted(message: &str) -> bool {
    let message = message.to_lowercase();
    AGE_RESTRICTION_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::media::resolver::Resolver;
    use crate::tracks::Track;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Arc;
    use tempfile::TempDir;

    const VIDEO_INFO: &str = r#"{"id": "FGBhQbmPwH8", "title": "Daft Punk - One More Time", "webpage_url": "https://www.youtube.com/watch?v=FGBhQbmPwH8", "formats": [
        {"format_id": "249", "ext": "webm", "acodec": "opus", "vcodec": "none", "abr": 50.4},
        {"format_id": "140", "ext": "m4a", "acodec": "mp4a.40.2", "vcodec": "none", "abr": 129.5},
        {"format_id": "18", "ext": "mp4", "acodec": "mp4a.40.2", "vcodec": "avc1.42001E", "abr": 96.0},
        {"format_id": "sb0", "ext": "mhtml", "acodec": "none", "vcodec": "none", "abr": null}
    ]}"#;

    const GATED_ENTRY: &str =
        r#"{"id": "AAA", "title": "Gated", "url": "https://www.youtube.com/watch?v=AAA"}"#;
    const OPEN_ENTRY: &str =
        r#"{"id": "BBB", "title": "Open", "url": "https://www.youtube.com/watch?v=BBB"}"#;

    /// Executable standing in for yt-dlp
    ///
    /// Flat searches print `entries`. Extracting AAA fails with the age gate
    /// message, extracting BBB prints one audio format. Every invocation is
    /// appended to `calls.log` next to the script.
    fn stub_ytdlp(dir: &TempDir, entries: &[&str]) -> String {
        let listing: String = entries
            .iter()
            .map(|entry| format!("    echo '{}'\n", entry))
            .collect();
        let script = format!(
            r#"#!/bin/sh
echo "$*" >> "$(dirname "$0")/calls.log"
case "$*" in
  *--flat-playlist*)
{listing}    ;;
  *v=AAA*)
    echo "ERROR: [youtube] AAA: Sign in to confirm your age. This video may be inappropriate for some users." >&2
    exit 1
    ;;
  *v=BBB*)
    echo '{{"id": "BBB", "webpage_url": "https://www.youtube.com/watch?v=BBB", "formats": [{{"format_id": "251", "ext": "webm", "acodec": "opus", "vcodec": "none", "abr": 160.0}}]}}'
    ;;
  *)
    echo "ERROR: unexpected arguments" >&2
    exit 2
    ;;
esac
"#
        );

        let path = dir.path().join("yt-dlp");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn calls(dir: &TempDir) -> String {
        std::fs::read_to_string(dir.path().join("calls.log")).unwrap_or_default()
    }

    fn track() -> Track {
        Track::new("id", "One More Time", "Daft Punk", "Discovery", "https://img/a.jpg").unwrap()
    }

    #[test]
    fn test_parse_search_output() {
        let output = format!("{}\n\n{}\n", OPEN_ENTRY, GATED_ENTRY);
        let results = parse_search_output(&output).unwrap();

        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Open", "Gated"]);
        assert_eq!(results[1].url, "https://www.youtube.com/watch?v=AAA");
    }

    #[test]
    fn test_missing_url_falls_back_to_watch_url() {
        let results = parse_search_output(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(results[0].url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(results[0].title, "abc");
    }

    #[test]
    fn test_video_info_streams() {
        let info: VideoInfo = serde_json::from_str(VIDEO_INFO).unwrap();
        let streams = info.into_streams();
        assert_eq!(streams.len(), 4);

        let audio: Vec<&str> = streams
            .iter()
            .filter(|s| s.audio_only)
            .map(|s| s.format_id.as_str())
            .collect();
        assert_eq!(audio, vec!["249", "140"]);
        assert_eq!(streams[1].bitrate, "130kbps");
        assert_eq!(
            streams[1].source_url,
            "https://www.youtube.com/watch?v=FGBhQbmPwH8"
        );
    }

    #[test]
    fn test_age_restriction_detection() {
        assert!(is_age_restricted(
            "ERROR: [youtube] abc: Sign in to confirm your age. This video may be inappropriate for some users."
        ));
        assert!(is_age_restricted("ERROR: This video is Age-Restricted"));
        assert!(!is_age_restricted("ERROR: [youtube] abc: Video unavailable"));
    }

    #[tokio::test]
    async fn test_search_keeps_gated_entries_in_rank_order() {
        let dir = TempDir::new().unwrap();
        let ytdlp = YtDlp::new(stub_ytdlp(&dir, &[GATED_ENTRY, OPEN_ENTRY]));

        let results = ytdlp.search("Daft Punk - One More Time").await.unwrap();

        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Gated", "Open"]);
        assert!(calls(&dir).contains("ytsearch5:Daft Punk - One More Time"));
    }

    #[tokio::test]
    async fn test_gated_first_result_is_age_restricted() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(YtDlp::new(stub_ytdlp(&dir, &[GATED_ENTRY, OPEN_ENTRY])));
        let resolver = Resolver::new(source).with_silenced_search(false);

        let err = resolver.resolve(&track(), "ARTIST - NAME").await.unwrap_err();

        match err {
            ResolveError::Extract(e) => {
                assert!(e.is_recoverable());
                assert!(e.to_string().contains("confirm your age"));
            }
            other => panic!("expected an age restriction, got {:?}", other),
        }
        assert!(!calls(&dir).contains("v=BBB"));
    }

    #[tokio::test]
    async fn test_only_gated_result_is_recoverable() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(YtDlp::new(stub_ytdlp(&dir, &[GATED_ENTRY])));
        let resolver = Resolver::new(source).with_silenced_search(false);

        let err = resolver.resolve(&track(), "ARTIST - NAME").await.unwrap_err();

        assert!(matches!(err, ResolveError::Extract(FetchError::AgeRestricted(_))));
    }

    #[tokio::test]
    async fn test_first_result_formats_extracted() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(YtDlp::new(stub_ytdlp(&dir, &[OPEN_ENTRY, GATED_ENTRY])));
        let resolver = Resolver::new(source).with_silenced_search(false);

        let stream = resolver.resolve(&track(), "ARTIST - NAME").await.unwrap();

        assert_eq!(stream.format_id, "251");
        assert_eq!(stream.source_url, "https://www.youtube.com/watch?v=BBB");
        assert!(!calls(&dir).contains("v=AAA"));
    }
}
