//! Batch download pipeline

pub mod downloader;
pub mod engine;
pub mod progress;
pub mod tagger;

pub use engine::{BatchEngine, BatchReport};
pub use progress::TerminalDisplay;
