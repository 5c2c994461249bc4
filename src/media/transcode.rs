//! Audio transcoding through ffmpeg

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::TranscodeError;

/// Target container/codec of downloaded tracks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Ogg,
    Flac,
    Wav,
}

impl AudioFormat {
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }

    /// ffmpeg audio encoder for this format
    pub fn codec(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "libmp3lame",
            AudioFormat::M4a => "aac",
            AudioFormat::Ogg => "libvorbis",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "pcm_s16le",
        }
    }

    pub fn is_lossless(self) -> bool {
        matches!(self, AudioFormat::Flac | AudioFormat::Wav)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Re-encodes an audio file into another format
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Encode `input` into `output`; `bitrate_kbps` is ignored for lossless formats
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
        bitrate_kbps: Option<u32>,
    ) -> Result<(), TranscodeError>;
}

/// Transcoder backed by the `ffmpeg` executable
pub struct Ffmpeg {
    program: String,
}

impl Ffmpeg {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
        bitrate_kbps: Option<u32>,
    ) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"])
            .arg(input)
            .args(["-vn", "-c:a", format.codec()]);

        if let Some(kbps) = bitrate_kbps.filter(|_| !format.is_lossless()) {
            if format == AudioFormat::Mp3 {
                cmd.args(["-abr", "1"]);
            }
            cmd.arg("-b:a").arg(format!("{}k", kbps));
        }

        cmd.arg(output);
        cmd
    }
}

#[async_trait]
impl Transcoder for Ffmpeg {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
        bitrate_kbps: Option<u32>,
    ) -> Result<(), TranscodeError> {
        debug!(
            "Transcoding {} -> {} ({}, {:?} kbps)",
            input.display(),
            output.display(),
            format,
            bitrate_kbps
        );

        let result = self
            .command(input, output, format, bitrate_kbps)
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TranscodeError::Failed {
                path: input.to_path_buf(),
                message: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}
