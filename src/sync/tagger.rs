//! Metadata tagging of finished audio files

use lofty::config::WriteOptions;
use lofty::file::TaggedFile;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::TagError;
use crate::tracks::Track;
use crate::utils::cover_art::process_cover_art;

/// Text fields written to every downloaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl From<&Track> for TrackTags {
    fn from(track: &Track) -> Self {
        Self {
            title: track.name().to_string(),
            artist: track.artist().to_string(),
            album: track.album().to_string(),
        }
    }
}

/// Write title/artist/album and, optionally, front cover art in place
///
/// Text fields are saved before the artwork is touched, so an artwork failure
/// leaves a file that is already text-tagged.
pub fn tag_file(path: &Path, tags: &TrackTags, artwork: Option<&Path>) -> Result<(), TagError> {
    let mut tagged_file = Probe::open(path)?.read()?;

    let tag = writable_tag(&mut tagged_file, path)?;
    tag.set_title(tags.title.clone());
    tag.set_artist(tags.artist.clone());
    tag.set_album(tags.album.clone());
    tagged_file.save_to_path(path, WriteOptions::default())?;
    debug!("Wrote text tags to: {}", path.display());

    let Some(artwork) = artwork else {
        return Ok(());
    };

    let cover = process_cover_art(&fs::read(artwork)?)?;
    let picture = Picture::new_unchecked(PictureType::CoverFront, Some(MimeType::Jpeg), None, cover);

    let tag = writable_tag(&mut tagged_file, path)?;
    tag.remove_picture_type(PictureType::CoverFront);
    tag.push_picture(picture);
    tagged_file.save_to_path(path, WriteOptions::default())?;

    debug!("Embedded cover art in: {}", path.display());
    Ok(())
}

/// [`tag_file`] on the blocking pool (image work is CPU-bound)
pub async fn tag_file_async(
    path: PathBuf,
    tags: TrackTags,
    artwork: Option<PathBuf>,
) -> Result<(), TagError> {
    tokio::task::spawn_blocking(move || tag_file(&path, &tags, artwork.as_deref()))
        .await
        .map_err(|e| TagError::Task(e.to_string()))?
}

/// The file's primary tag, else its first tag, else a newly inserted one
fn writable_tag<'a>(tagged_file: &'a mut TaggedFile, path: &Path) -> Result<&'a mut Tag, TagError> {
    if tagged_file.primary_tag().is_none() && tagged_file.first_tag().is_none() {
        let tag_type = tagged_file.primary_tag_type();
        tagged_file.insert_tag(Tag::new(tag_type));
    }

    let tag_type = match (tagged_file.primary_tag(), tagged_file.first_tag()) {
        (Some(tag), _) | (None, Some(tag)) => tag.tag_type(),
        (None, None) => tagged_file.primary_tag_type(),
    };

    tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| TagError::NoWritableTag(path.to_path_buf()))
}
