//! Fakes and fixtures shared by unit tests

use async_trait::async_trait;
use bytes::Bytes;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::artwork::ArtworkFetcher;
use crate::error::{ArtworkError, FetchError, SearchError, TranscodeError};
use crate::media::models::SearchResult;
use crate::media::{AudioFormat, MediaSource, StreamInfo, Transcoder};
use crate::sync::progress::ProgressDisplay;
use crate::tracks::{Track, TrackCollection};
use crate::utils::sanitize_filename;

const FAKE_SCHEME: &str = "fake://";

/// Audio-only stream with the given format id and bitrate
pub fn stream(format_id: &str, bitrate: &str) -> StreamInfo {
    StreamInfo {
        format_id: format_id.to_string(),
        source_url: format!("https://media.test/{}", format_id),
        bitrate: bitrate.to_string(),
        extension: "webm".to_string(),
        audio_only: true,
    }
}

/// Collection of tracks named `names`, one album per track
pub fn collection(names: &[&str]) -> TrackCollection {
    let mut tracks = TrackCollection::new();
    for (i, name) in names.iter().enumerate() {
        let track = Track::new(
            format!("id-{}", i),
            *name,
            "Artist",
            format!("Album {}", i),
            format!("https://img.test/{}.jpg", i),
        )
        .unwrap();
        tracks.add_track(track).unwrap();
    }
    tracks
}

/// Minimal PCM WAV: mono, 8 kHz, 16-bit, 100 ms of silence
pub fn wav_fixture() -> Vec<u8> {
    const SAMPLES: u32 = 800;
    let data_len = SAMPLES * 2;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // channels
    wav.extend_from_slice(&8000u32.to_le_bytes());
    wav.extend_from_slice(&16000u32.to_le_bytes()); // byte rate
    wav.extend_from_slice(&2u16.to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}

/// PNG-encoded solid image
pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 90]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// In-memory media source
///
/// Every search returns one result whose URL carries the query, so stream
/// extraction and fetches can name files after it.
pub struct FakeSource {
    streams: Vec<StreamInfo>,
    no_results: bool,
    age_restricted: Vec<String>,
    age_restricted_downloads: Vec<String>,
    fetch_failures: Vec<String>,
    searches: Mutex<Vec<String>>,
    fetches: Mutex<Vec<String>>,
}

impl Default for FakeSource {
    fn default() -> Self {
        Self {
            streams: vec![stream("140", "129kbps"), stream("251", "160kbps")],
            no_results: false,
            age_restricted: Vec::new(),
            age_restricted_downloads: Vec::new(),
            fetch_failures: Vec::new(),
            searches: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
        }
    }
}

impl FakeSource {
    pub fn with_streams(mut self, streams: Vec<StreamInfo>) -> Self {
        self.streams = streams;
        self
    }

    pub fn with_no_results(mut self) -> Self {
        self.no_results = true;
        self
    }

    /// Stream extraction for this query fails as age restricted
    pub fn with_age_restricted(mut self, query: &str) -> Self {
        self.age_restricted.push(query.to_string());
        self
    }

    /// Extraction succeeds but the download is refused as age restricted
    pub fn with_age_restricted_download(mut self, query: &str) -> Self {
        self.age_restricted_downloads.push(query.to_string());
        self
    }

    /// Downloads for this query fail outright
    pub fn with_fetch_failure(mut self, query: &str) -> Self {
        self.fetch_failures.push(query.to_string());
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

fn query_of(url: &str) -> String {
    url.strip_prefix(FAKE_SCHEME).unwrap_or(url).to_string()
}

fn age_gate(query: &str) -> FetchError {
    FetchError::AgeRestricted(format!("Sign in to confirm your age: {}", query))
}

#[async_trait]
impl MediaSource for FakeSource {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.searches.lock().unwrap().push(query.to_string());
        if self.no_results {
            return Ok(Vec::new());
        }

        Ok(vec![SearchResult {
            title: query.to_string(),
            url: format!("{}{}", FAKE_SCHEME, query),
        }])
    }

    async fn streams(&self, result: &SearchResult) -> Result<Vec<StreamInfo>, FetchError> {
        let query = query_of(&result.url);
        if self.age_restricted.contains(&query) {
            return Err(age_gate(&query));
        }

        Ok(self
            .streams
            .iter()
            .cloned()
            .map(|mut s| {
                s.source_url = result.url.clone();
                s
            })
            .collect())
    }

    async fn fetch(&self, stream: &StreamInfo, dir: &Path) -> Result<PathBuf, FetchError> {
        let query = query_of(&stream.source_url);
        self.fetches.lock().unwrap().push(query.clone());

        if self.age_restricted_downloads.contains(&query) {
            return Err(age_gate(&query));
        }
        if self.fetch_failures.contains(&query) {
            return Err(FetchError::Failed(format!("HTTP Error 403: Forbidden: {}", query)));
        }

        let path = dir.join(format!("{}.{}", sanitize_filename(&query), stream.extension));
        std::fs::write(&path, b"fake stream")?;
        Ok(path)
    }
}

/// Transcoder that writes a WAV fixture instead of encoding
#[derive(Default)]
pub struct FakeTranscoder {
    fail: bool,
    bitrates: Mutex<Vec<Option<u32>>>,
}

impl FakeTranscoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn bitrates(&self) -> Vec<Option<u32>> {
        self.bitrates.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        _format: AudioFormat,
        bitrate_kbps: Option<u32>,
    ) -> Result<(), TranscodeError> {
        self.bitrates.lock().unwrap().push(bitrate_kbps);
        if self.fail {
            // ffmpeg leaves a truncated output behind when it dies mid-encode
            std::fs::write(output, b"RIFF")?;
            return Err(TranscodeError::Failed {
                path: input.to_path_buf(),
                message: "Invalid data found when processing input".to_string(),
            });
        }
        std::fs::write(output, wav_fixture())?;
        Ok(())
    }
}

/// Serves the same image for every URL and counts requests
pub struct CountingFetcher {
    data: Bytes,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Bytes::from(data),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtworkFetcher for CountingFetcher {
    async fn fetch_image(&self, _url: &str) -> Result<Bytes, ArtworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.data.clone())
    }
}

/// Keeps every rendered line
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub lines: Vec<String>,
    pub cleared: bool,
}

impl ProgressDisplay for RecordingDisplay {
    fn render(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn clear(&mut self) {
        self.cleared = true;
    }
}
