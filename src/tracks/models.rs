//! Validated track values

use serde::Serialize;

use crate::error::ValidationError;

/// Field names of a track entry, in positional order
pub(crate) const ENTRY_FIELDS: [&str; 4] = ["name", "artist", "album", "artwork"];

/// Metadata stored per track id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackEntry {
    name: String,
    artist: String,
    album: String,
    artwork_url: String,
}

impl TrackEntry {
    /// Create an entry, rejecting empty fields
    pub fn new(
        name: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        artwork_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let entry = Self {
            name: name.into(),
            artist: artist.into(),
            album: album.into(),
            artwork_url: artwork_url.into(),
        };
        entry.validate()?;
        Ok(entry)
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        let fields = [&self.name, &self.artist, &self.album, &self.artwork_url];
        for (field, value) in ENTRY_FIELDS.iter().zip(fields) {
            if value.is_empty() {
                return Err(ValidationError::EmptyField(field));
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn artwork_url(&self) -> &str {
        &self.artwork_url
    }
}

/// A single catalog track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    id: String,
    entry: TrackEntry,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        artwork_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        let entry = TrackEntry::new(name, artist, album, artwork_url)?;
        Ok(Self { id, entry })
    }

    pub(crate) fn from_parts(id: &str, entry: &TrackEntry) -> Self {
        Self {
            id: id.to_string(),
            entry: entry.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.entry.name()
    }

    pub fn artist(&self) -> &str {
        self.entry.artist()
    }

    pub fn album(&self) -> &str {
        self.entry.album()
    }

    pub fn artwork_url(&self) -> &str {
        self.entry.artwork_url()
    }

    pub fn entry(&self) -> &TrackEntry {
        &self.entry
    }
}
