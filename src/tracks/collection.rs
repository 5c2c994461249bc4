//! Ordered, validated track collection keyed by catalog id

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use super::models::{ENTRY_FIELDS, Track, TrackEntry};
use crate::error::ValidationError;

/// Tracks keyed by id, iterated in insertion order
///
/// Every mutation validates its input completely before touching the
/// collection, so a rejected insert or merge leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackCollection {
    order: Vec<String>,
    entries: HashMap<String, TrackEntry>,
}

impl TrackCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of `id -> entry` in document order
    ///
    /// Entries may be `[name, artist, album, artwork]` arrays or objects with
    /// exactly those four keys.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ValidationError::Json(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(ValidationError::Json("top level is not an object".to_string()));
        };

        let mut collection = Self::new();
        collection.update_raw(&map)?;
        Ok(collection)
    }

    /// Insert or update an entry; updates keep the original position
    pub fn insert(&mut self, id: &str, entry: TrackEntry) -> Result<(), ValidationError> {
        if id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        entry.validate()?;
        self.store(id, entry);
        Ok(())
    }

    /// Insert or update from an untyped JSON value
    pub fn insert_raw(&mut self, id: &str, value: &Value) -> Result<(), ValidationError> {
        if id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        let entry = entry_from_value(value)?;
        self.store(id, entry);
        Ok(())
    }

    pub fn add_track(&mut self, track: Track) -> Result<(), ValidationError> {
        let id = track.id().to_string();
        self.insert(&id, track.entry().clone())
    }

    /// Merge another collection into this one
    ///
    /// Existing ids are updated in place, new ids are appended in the order of
    /// `other`. Nothing is applied unless every entry validates.
    pub fn merge(&mut self, other: &TrackCollection) -> Result<(), ValidationError> {
        for (id, entry) in other.entries_in_order() {
            if id.is_empty() {
                return Err(ValidationError::EmptyId);
            }
            entry.validate()?;
        }
        for (id, entry) in other.entries_in_order() {
            self.store(id, entry.clone());
        }
        Ok(())
    }

    /// Merge untyped entries, all-or-nothing
    pub fn update_raw(&mut self, map: &Map<String, Value>) -> Result<(), ValidationError> {
        let mut staged = Vec::with_capacity(map.len());
        for (id, value) in map {
            if id.is_empty() {
                return Err(ValidationError::EmptyId);
            }
            staged.push((id.as_str(), entry_from_value(value)?));
        }
        for (id, entry) in staged {
            self.store(id, entry);
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&TrackEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tracks in insertion order
    pub fn iter(&self) -> impl Iterator<Item = Track> + '_ {
        self.entries_in_order()
            .map(|(id, entry)| Track::from_parts(id, entry))
    }

    /// Track names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.entries_in_order()
            .map(|(_, entry)| entry.name().to_string())
            .collect()
    }

    fn entries_in_order(&self) -> impl Iterator<Item = (&str, &TrackEntry)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| (id.as_str(), entry)))
    }

    fn store(&mut self, id: &str, entry: TrackEntry) {
        if self.entries.insert(id.to_string(), entry).is_none() {
            self.order.push(id.to_string());
        } else {
            debug!("Updated track entry {}", id);
        }
    }
}

fn entry_from_value(value: &Value) -> Result<TrackEntry, ValidationError> {
    let fields: Vec<&str> = match value {
        Value::Array(items) => {
            if items.len() != ENTRY_FIELDS.len() {
                return Err(ValidationError::FieldCount(items.len()));
            }
            items
                .iter()
                .zip(ENTRY_FIELDS)
                .map(|(item, field)| {
                    item.as_str()
                        .ok_or_else(|| ValidationError::NotAString(field.to_string()))
                })
                .collect::<Result<_, _>>()?
        }
        Value::Object(map) => {
            if map.len() != ENTRY_FIELDS.len() {
                return Err(ValidationError::FieldCount(map.len()));
            }
            if let Some(key) = map.keys().find(|k| !ENTRY_FIELDS.contains(&k.as_str())) {
                return Err(ValidationError::UnknownField(key.clone()));
            }
            ENTRY_FIELDS
                .iter()
                .map(|field| {
                    map.get(*field)
                        .and_then(Value::as_str)
                        .ok_or_else(|| ValidationError::NotAString(field.to_string()))
                })
                .collect::<Result<_, _>>()?
        }
        _ => return Err(ValidationError::InvalidShape),
    };

    TrackEntry::new(fields[0], fields[1], fields[2], fields[3])
}
