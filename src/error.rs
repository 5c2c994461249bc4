//! Error types for the download pipeline
//!
//! Only [`FetchError::AgeRestricted`] is recovered from per track; everything
//! else aborts the batch through [`BatchError`].

use std::path::PathBuf;
use thiserror::Error;

/// A malformed track record, rejected before the collection is touched
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("track entry must have exactly 4 fields, found {0}")]
    FieldCount(usize),

    #[error("track field `{0}` must be a string")]
    NotAString(String),

    #[error("track field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("unknown track field `{0}`")]
    UnknownField(String),

    #[error("track id must not be empty")]
    EmptyId,

    #[error("track entry must be a JSON array or object")]
    InvalidShape,

    #[error("track list must be a JSON object keyed by track id: {0}")]
    Json(String),
}

/// Failure of the media search collaborator itself
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to run search: {0}")]
    Io(#[from] std::io::Error),

    #[error("search failed: {0}")]
    Failed(String),

    #[error("unreadable search output: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no search results for \"{query}\"")]
    NoResults { query: String },

    #[error("no audio-only stream found for \"{query}\"")]
    NoStreamFound { query: String },

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Extract(#[from] FetchError),

    #[error("failed to silence stdio around search: {0}")]
    Silence(#[from] nix::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("age restricted: {0}")]
    AgeRestricted(String),

    #[error("download failed: {0}")]
    Failed(String),

    #[error("download I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable media info: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    /// Whether the batch may continue past this failure
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FetchError::AgeRestricted(_))
    }
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to run encoder: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoder failed on {}: {message}", .path.display())]
    Failed { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("invalid artwork url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("artwork request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("artwork not available (status {0})")]
    Status(u16),

    #[error("failed to write artwork: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TagError {
    #[error("failed to read or write tags: {0}")]
    Lofty(#[from] lofty::error::LoftyError),

    #[error("failed to process artwork: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to read artwork: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} has no writable tag", .0.display())]
    NoWritableTag(PathBuf),

    #[error("tagging task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("download directory not set; run `tunegrab config --dir <DIR>` or pass --dir")]
    MissingDownloadDir,

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Any error that stops a batch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Artwork(#[from] ArtworkError),

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}
