//! Filename sanitization utilities

/// Characters that are unsafe in file names on at least one major platform
const UNSAFE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace every filesystem-unsafe character with `_`
///
/// The result never contains an unsafe character, so sanitizing twice is the
/// same as sanitizing once.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}
