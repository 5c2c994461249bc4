//! tunegrab - Download catalog tracks as tagged audio files

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod artwork;
mod cli;
mod config;
mod error;
mod media;
mod sync;
mod tracks;
mod utils;

#[cfg(test)]
mod test_support;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "tunegrab=debug"
    } else {
        "tunegrab=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Download { tracks, overrides } => {
            cli::commands::download(tracks, overrides).await?;
        }
        Commands::Track {
            id,
            name,
            artist,
            album,
            artwork,
            overrides,
        } => {
            cli::commands::track(id, name, artist, album, artwork, overrides).await?;
        }
        Commands::Convert {
            from,
            no_subfolders,
            overrides,
        } => {
            cli::commands::convert(from, no_subfolders, overrides).await?;
        }
        Commands::Config {
            dir,
            template,
            format,
            artwork,
            no_artwork,
            ytdlp,
            ffmpeg,
        } => {
            cli::commands::config(dir, template, format, artwork, no_artwork, ytdlp, ffmpeg)?;
        }
        Commands::Completion { shell } => {
            cli::commands::completion(shell);
        }
    }

    Ok(())
}
