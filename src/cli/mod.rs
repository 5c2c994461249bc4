//! CLI module for tunegrab

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;
use crate::media::AudioFormat;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "tunegrab", about = "Download tracks as tagged audio files")]
#[command(version, author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every track of a JSON track list
    Download {
        /// JSON objects mapping track id to [name, artist, album, artwork];
        /// later files update earlier ones
        #[arg(value_name = "TRACKS_JSON", required = true)]
        tracks: Vec<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Download a single track
    Track {
        /// Catalog id of the track
        #[arg(long)]
        id: String,

        /// Track title
        #[arg(long)]
        name: String,

        #[arg(long)]
        artist: String,

        #[arg(long)]
        album: String,

        /// Artwork image URL
        #[arg(long)]
        artwork: String,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Convert leftover files in the download directory to the target format
    Convert {
        /// Extension of the files to convert
        #[arg(long, default_value = "webm")]
        from: String,

        /// Only look at the top level of the download directory
        #[arg(long)]
        no_subfolders: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Show or update stored settings
    Config {
        /// Download directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Search template (NAME, ARTIST and ALBUM are substituted)
        #[arg(long)]
        template: Option<String>,

        /// Target audio format
        #[arg(long, value_enum)]
        format: Option<AudioFormat>,

        /// Embed album artwork
        #[arg(long, conflicts_with = "no_artwork")]
        artwork: bool,

        /// Do not embed album artwork
        #[arg(long)]
        no_artwork: bool,

        /// yt-dlp executable
        #[arg(long)]
        ytdlp: Option<String>,

        /// ffmpeg executable
        #[arg(long)]
        ffmpeg: Option<String>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Per-invocation overrides of stored settings
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Download directory
    #[arg(short, long, env = "TUNEGRAB_DIR")]
    pub dir: Option<PathBuf>,

    /// Search template (NAME, ARTIST and ALBUM are substituted)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Target audio format
    #[arg(short, long, value_enum)]
    pub format: Option<AudioFormat>,

    /// Do not embed album artwork
    #[arg(long)]
    pub no_artwork: bool,
}

impl Overrides {
    /// Settings with every given override applied
    pub fn apply(self, mut settings: Settings) -> Settings {
        if let Some(dir) = self.dir {
            settings.download_dir = Some(dir);
        }
        if let Some(template) = self.template {
            settings.search_template = template;
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
        if self.no_artwork {
            settings.embed_artwork = false;
        }
        settings
    }
}
