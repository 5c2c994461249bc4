//! CLI command handlers

use anyhow::{Context, Result};
use clap_complete::generate;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::Overrides;
use crate::artwork::HttpArtworkFetcher;
use crate::config::Settings;
use crate::media::{AudioFormat, Ffmpeg, YtDlp};
use crate::sync::downloader::transcode_replacing;
use crate::sync::{BatchEngine, BatchReport, TerminalDisplay};
use crate::tracks::{TrackCollection, TrackEntry};
use crate::utils::find_by_extension;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Handle the `download` command
pub async fn download(files: Vec<PathBuf>, overrides: Overrides) -> Result<()> {
    let mut tracks = TrackCollection::new();
    for file in &files {
        let contents = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read track list {:?}", file))?;
        let parsed = TrackCollection::from_json_str(&contents)
            .with_context(|| format!("Invalid track list {:?}", file))?;
        tracks.merge(&parsed)?;
    }

    run_batch(tracks, overrides).await
}

/// Handle the `track` command
pub async fn track(
    id: String,
    name: String,
    artist: String,
    album: String,
    artwork: String,
    overrides: Overrides,
) -> Result<()> {
    let entry = TrackEntry::new(name, artist, album, artwork)?;
    let mut tracks = TrackCollection::new();
    tracks.insert(&id, entry)?;

    run_batch(tracks, overrides).await
}

async fn run_batch(tracks: TrackCollection, overrides: Overrides) -> Result<()> {
    let settings = overrides.apply(Settings::load()?);
    let dir = settings.require_download_dir()?.to_path_buf();

    println!(
        "Downloading {} track(s) to {}",
        tracks.len(),
        dir.display().to_string().cyan()
    );

    let engine = BatchEngine::new(
        Arc::new(YtDlp::new(settings.ytdlp_path.clone())),
        Arc::new(Ffmpeg::new(settings.ffmpeg_path.clone())),
        Arc::new(HttpArtworkFetcher::new()?),
        settings.format,
        Some(dir),
    );

    let mut display = TerminalDisplay::new();
    let report = engine
        .process_batch(
            &tracks,
            &settings.search_template,
            settings.embed_artwork,
            &mut display,
        )
        .await?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!();
    println!(
        "{}",
        format!("{} songs downloaded", report.paths.len()).green().bold()
    );
    println!("{:.2} MBs used", report.bytes_used as f64 / BYTES_PER_MB);

    if !report.failures.is_empty() {
        println!();
        println!(
            "{}",
            format!(
                "{} tracks failed to download due to an age restriction:",
                report.failures.len()
            )
            .yellow()
        );
        for failure in &report.failures {
            println!("  - {} ({})", failure.name, failure.reason);
        }
    }
}

/// Handle the `convert` command
pub async fn convert(from: String, no_subfolders: bool, overrides: Overrides) -> Result<()> {
    let settings = overrides.apply(Settings::load()?);
    let dir = settings.require_download_dir()?;
    let format = settings.format;

    if from.trim_start_matches('.').eq_ignore_ascii_case(format.extension()) {
        anyhow::bail!("Files are already .{}; nothing to convert", format);
    }

    let files = find_by_extension(dir, &from, !no_subfolders);
    if files.is_empty() {
        println!("{}", format!("No .{} files found in {}", from, dir.display()).yellow());
        return Ok(());
    }

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("█▉ "),
    );

    let ffmpeg = Ffmpeg::new(settings.ffmpeg_path.clone());
    let mut converted = 0;
    for file in &files {
        let shown = file.strip_prefix(dir).unwrap_or(file);
        bar.set_message(format!("Converting {}", shown.display()));

        match transcode_replacing(&ffmpeg, file, format, None).await {
            Ok(_) => converted += 1,
            Err(e) => warn!("Failed to convert {}: {}", file.display(), e),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!("Converted {} of {} files", converted, files.len());
    println!(
        "{}",
        format!("Converted {} file(s) to .{}", converted, format).green()
    );
    Ok(())
}

/// Handle the `config` command
#[allow(clippy::too_many_arguments)]
pub fn config(
    dir: Option<PathBuf>,
    template: Option<String>,
    format: Option<AudioFormat>,
    artwork: bool,
    no_artwork: bool,
    ytdlp: Option<String>,
    ffmpeg: Option<String>,
) -> Result<()> {
    let mut settings = Settings::load()?;
    let changed = dir.is_some()
        || template.is_some()
        || format.is_some()
        || artwork
        || no_artwork
        || ytdlp.is_some()
        || ffmpeg.is_some();

    if let Some(dir) = dir {
        settings.download_dir = Some(dir);
    }
    if let Some(template) = template {
        settings.search_template = template;
    }
    if let Some(format) = format {
        settings.format = format;
    }
    if artwork {
        settings.embed_artwork = true;
    }
    if no_artwork {
        settings.embed_artwork = false;
    }
    if let Some(ytdlp) = ytdlp {
        settings.ytdlp_path = ytdlp;
    }
    if let Some(ffmpeg) = ffmpeg {
        settings.ffmpeg_path = ffmpeg;
    }

    if changed {
        settings.save()?;
        println!("{}", "Settings saved.".green().bold());
        println!();
    }

    let dir = settings
        .download_dir
        .as_ref()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "(not set)".yellow().to_string());

    println!("{}", "Settings:".bold());
    println!("  Download dir:    {}", dir);
    println!("  Search template: {}", settings.search_template);
    println!("  Format:          {}", settings.format);
    println!("  Embed artwork:   {}", settings.embed_artwork);
    println!("  yt-dlp:          {}", settings.ytdlp_path);
    println!("  ffmpeg:          {}", settings.ffmpeg_path);
    println!();
    println!("Stored in {}", Settings::config_path()?.display());

    Ok(())
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = super::Cli::command();
    generate(shell, &mut cmd, "tunegrab", &mut io::stdout());
}

// Extension trait for Cli to get clap Command
impl super::Cli {
    fn command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }
}
