//! Track records consumed by the download pipeline

mod collection;
mod models;

pub use collection::TrackCollection;
pub use models::{Track, TrackEntry};
