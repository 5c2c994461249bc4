//! Search results and stream descriptors returned by a media source

/// One ranked hit of a media search
///
/// Streams are extracted separately, and only for the hit that is used.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub title: String,
    /// Page URL the streams are extracted from
    pub url: String,
}

/// A fetchable variant of a search result
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    /// Source-specific format selector
    pub format_id: String,
    /// Page or media URL the format belongs to
    pub source_url: String,
    /// Bitrate as reported by the source, e.g. "128kbps"
    pub bitrate: String,
    /// Container extension of the fetched file
    pub extension: String,
    pub audio_only: bool,
}

impl StreamInfo {
    /// Reported bitrate with its unit suffix trimmed ("128kbps" -> 128)
    pub fn bitrate_kbps(&self) -> Option<u32> {
        let digits: String = self
            .bitrate
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}
