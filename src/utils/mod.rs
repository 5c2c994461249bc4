//! Utility functions

pub mod cover_art;
mod files;
mod sanitize;

pub use files::find_by_extension;
pub use sanitize::sanitize_filename;
