use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::{DirEntry, WalkDir};

use crate::model::config::ScanConfig;
use crate::model::source::SourceFile;

/// Error type for source file I/O
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
}

/// Write file content atomically: write to a temp file in the same directory,
/// then rename over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a source file into lines.
pub fn read_source(path: &Path) -> Result<SourceFile, SourceError> {
    let text = fs::read_to_string(path).map_err(|e| SourceError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(SourceFile::from_text(path, &text))
}

/// Write a source file back to disk if any line changed.
/// Returns whether a write happened.
pub fn save_source(file: &mut SourceFile) -> Result<bool, SourceError> {
    if !file.dirty {
        return Ok(false);
    }
    atomic_write(&file.path, file.to_text().as_bytes()).map_err(|e| SourceError::WriteError {
        path: file.path.clone(),
        source: e,
    })?;
    file.mark_clean();
    tracing::info!(file = %file.path.display(), "source updated");
    Ok(true)
}

/// Find candidate source files under `root`, sorted by path.
///
/// Directories named in `scan.exclude` are not descended into. When
/// `scan.extensions` is non-empty, only files with one of those extensions
/// are returned.
pub fn discover_sources(root: &Path, scan: &ScanConfig) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, scan))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_wanted_extension(path, scan))
        .collect();
    paths.sort();
    paths
}

fn is_excluded(entry: &DirEntry, scan: &ScanConfig) -> bool {
    // The walk root itself is never excluded
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| scan.exclude.iter().any(|x| x == name))
}

fn has_wanted_extension(path: &Path, scan: &ScanConfig) -> bool {
    if scan.extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| scan.extensions.iter().any(|x| x == ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::source::LineStore;
    use tempfile::TempDir;

    #[test]
    fn test_read_and_save_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("main.rs");
        fs::write(&path, "fn main() {}\n// TODO: x\n").unwrap();

        let mut file = read_source(&path).unwrap();
        assert_eq!(file.lines().len(), 2);

        // Clean files are not rewritten
        assert!(!save_source(&mut file).unwrap());

        file.change_line(1, "// TODO [#1]: x".to_string()).unwrap();
        assert!(save_source(&mut file).unwrap());
        assert!(!file.dirty);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "fn main() {}\n// TODO [#1]: x\n"
        );
    }

    #[test]
    fn test_save_keeps_crlf_line_endings() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("win.rs");
        fs::write(&path, "fn a() {}\r\n// TODO: x\r\nfn b() {}\r\n").unwrap();

        let mut file = read_source(&path).unwrap();
        let mut todo = crate::parse::parse_todos(&file).remove(0);
        assert_eq!(todo.title(), "x");
        crate::ops::reference::apply_reference(&mut file, &mut todo, Some("#1")).unwrap();
        save_source(&mut file).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "fn a() {}\r\n// TODO [#1]: x\r\nfn b() {}\r\n"
        );
    }

    #[test]
    fn test_read_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_source(&tmp.path().join("nope.rs")).unwrap_err();
        assert!(matches!(err, SourceError::ReadError { .. }));
    }

    #[test]
    fn test_discover_sources_filters() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::write(root.join("src/lib.rs"), "").unwrap();
        fs::write(root.join("src/nested/mod.rs"), "").unwrap();
        fs::write(root.join("src/notes.txt"), "").unwrap();
        fs::write(root.join("target/debug/gen.rs"), "").unwrap();

        let scan = ScanConfig {
            extensions: vec!["rs".to_string()],
            ..ScanConfig::default()
        };
        let found = discover_sources(root, &scan);
        assert_eq!(
            found,
            vec![root.join("src/lib.rs"), root.join("src/nested/mod.rs")]
        );

        let all = discover_sources(root, &ScanConfig::default());
        assert_eq!(all.len(), 3);
    }
}
