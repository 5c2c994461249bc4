//! Media source collaborator seam

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::models::{SearchResult, StreamInfo};
use crate::error::{FetchError, SearchError};

/// Searches for media and downloads individual streams
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Free-text search, results in the source's ranking order
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;

    /// Fetchable streams of one search result
    ///
    /// Media the source refuses to serve, such as age gated videos, fails
    /// here with [`FetchError::AgeRestricted`].
    async fn streams(&self, result: &SearchResult) -> Result<Vec<StreamInfo>, FetchError>;

    /// Download a stream into `dir`, returning the written file
    ///
    /// The file name is chosen by the source.
    async fn fetch(&self, stream: &StreamInfo, dir: &Path) -> Result<PathBuf, FetchError>;
}
