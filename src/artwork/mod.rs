//! Batch-scoped cover art cache

mod cache;
mod fetcher;

pub use cache::ArtworkCache;
pub use fetcher::{ArtworkFetcher, HttpArtworkFetcher};
