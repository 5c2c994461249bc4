//! Per-batch progress state and the single-line progress display

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use tracing::warn;

use crate::tracks::TrackCollection;

/// Width of the bar in characters
const BAR_WIDTH: usize = 50;
const FILL_CHAR: char = '█';
const EMPTY_CHAR: char = ' ';
const CAP_CHAR: char = '|';

/// Phase of the track currently being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Searching,
    Downloading,
    Converting,
    Downloaded,
    MetadataAdded,
    Error,
}

impl TrackState {
    /// Terminal states move the cursor to the next track
    fn advances(self) -> bool {
        matches!(self, TrackState::MetadataAdded | TrackState::Error)
    }

    fn can_follow(self, previous: Option<TrackState>) -> bool {
        use TrackState::*;
        match (previous, self) {
            (None, Searching) => true,
            (Some(Searching), Downloading) => true,
            (Some(Downloading), Converting) => true,
            (Some(Converting), Downloaded) => true,
            (Some(Downloaded), MetadataAdded) => true,
            (Some(Searching | Downloading | Converting | Downloaded), Error) => true,
            _ => false,
        }
    }

    fn message(self, name: &str) -> String {
        match self {
            TrackState::Searching => format!("Searching for: {}", name),
            TrackState::Downloading => format!("Downloading: {}", name),
            TrackState::Converting => format!("Converting: {}", name),
            TrackState::Downloaded => format!("Song {} downloaded", name),
            TrackState::MetadataAdded => format!("Added metadata for: {}", name),
            TrackState::Error => format!("ERROR: Could not download {}", name),
        }
    }
}

/// Why a track was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    AgeRestricted,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::AgeRestricted => f.write_str("age restriction"),
        }
    }
}

/// A track that failed without aborting the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTrack {
    pub name: String,
    pub reason: FailureReason,
}

/// Where progress lines are shown
pub trait ProgressDisplay {
    /// Replace the current line
    fn render(&mut self, line: &str);

    /// Remove the line entirely
    fn clear(&mut self);
}

/// Single overwritten terminal line
pub struct TerminalDisplay {
    bar: ProgressBar,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{msg}") {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressDisplay for TerminalDisplay {
    fn render(&mut self, line: &str) {
        self.bar.set_message(line.to_string());
    }

    fn clear(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// `|{fill}{empty}| {pct}% [{done}/{total}] - {message}`
pub fn render_line(done: usize, total: usize, message: &str) -> String {
    let (fill, percent) = if total == 0 {
        (0, 0)
    } else {
        let done = done.min(total);
        (done * BAR_WIDTH / total, done * 100 / total)
    };

    let fill_str: String = std::iter::repeat_n(FILL_CHAR, fill).collect();
    let empty_str: String = std::iter::repeat_n(EMPTY_CHAR, BAR_WIDTH - fill).collect();

    format!(
        "{cap}{fill_str}{empty_str}{cap} {percent}% [{done}/{total}] - {message}",
        cap = CAP_CHAR
    )
}

/// Tracks the phase of each track in a batch and collects failures
///
/// Built per batch and consumed by [`ProgressTracker::completed`]. The cursor
/// advances exactly once per track, on `MetadataAdded` or `Error`.
pub struct ProgressTracker<'a> {
    names: Vec<String>,
    cursor: usize,
    state: Option<TrackState>,
    failures: Vec<FailedTrack>,
    display: &'a mut dyn ProgressDisplay,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(tracks: &TrackCollection, display: &'a mut dyn ProgressDisplay) -> Self {
        Self {
            names: tracks.names(),
            cursor: 0,
            state: None,
            failures: Vec::new(),
            display,
        }
    }

    pub fn searching(&mut self) {
        self.transition(TrackState::Searching);
    }

    pub fn downloading(&mut self) {
        self.transition(TrackState::Downloading);
    }

    pub fn converting(&mut self) {
        self.transition(TrackState::Converting);
    }

    pub fn downloaded(&mut self) {
        self.transition(TrackState::Downloaded);
    }

    pub fn metadata_added(&mut self) {
        self.transition(TrackState::MetadataAdded);
    }

    /// Record the current track as failed and move on
    pub fn error(&mut self, reason: FailureReason) {
        self.failures.push(FailedTrack {
            name: self.current_name().to_string(),
            reason,
        });
        self.transition(TrackState::Error);
    }

    pub fn total(&self) -> usize {
        self.names.len()
    }

    /// Finish the batch: clear the display and hand back the failures
    pub fn completed(self) -> Vec<FailedTrack> {
        let line = render_line(self.cursor, self.total(), "Completed");
        self.display.render(&line);
        self.display.clear();
        self.failures
    }

    fn transition(&mut self, next: TrackState) {
        if !next.can_follow(self.state) {
            warn!(
                "Unexpected progress transition {:?} -> {:?} for track {}",
                self.state, next, self.cursor
            );
        }

        let line = render_line(self.cursor, self.total(), &next.message(self.current_name()));
        self.display.render(&line);

        if next.advances() {
            self.cursor += 1;
            self.state = None;
        } else {
            self.state = Some(next);
        }
    }

    fn current_name(&self) -> &str {
        self.names.get(self.cursor).map(String::as_str).unwrap_or("")
    }
}
