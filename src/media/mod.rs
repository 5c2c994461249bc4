//! Media search, stream selection and transcoding

pub mod models;
pub mod resolver;
mod silence;
pub mod source;
pub mod transcode;
pub mod ytdlp;

pub use models::StreamInfo;
pub use resolver::Resolver;
pub use source::MediaSource;
pub use transcode::{AudioFormat, Ffmpeg, Transcoder};
pub use ytdlp::YtDlp;
