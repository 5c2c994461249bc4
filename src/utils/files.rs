//! Locating stray audio files in the download directory

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files under `dir` whose extension matches `extension` (case-insensitive)
///
/// With `recursive` unset only the top level of `dir` is scanned. Results are
/// sorted by path so conversions run in a stable order.
pub fn find_by_extension(dir: &Path, extension: &str, recursive: bool) -> Vec<PathBuf> {
    let extension = extension.trim_start_matches('.');
    let walker = if recursive {
        WalkDir::new(dir)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn layout() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("Live")).unwrap();
        for name in ["b.webm", "a.WEBM", "c.mp3", "Live/d.webm"] {
            fs::write(tmp.path().join(name), b"x").unwrap();
        }
        tmp
    }

    #[test]
    fn test_recursive_scan() {
        let tmp = layout();
        let found = find_by_extension(tmp.path(), "webm", true);

        assert_eq!(
            found,
            vec![
                tmp.path().join("Live/d.webm"),
                tmp.path().join("a.WEBM"),
                tmp.path().join("b.webm"),
            ]
        );
    }

    #[test]
    fn test_top_level_only() {
        let tmp = layout();
        let found = find_by_extension(tmp.path(), ".webm", false);

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.parent() == Some(tmp.path())));
    }
}
