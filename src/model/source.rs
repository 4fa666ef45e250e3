use std::path::{Path, PathBuf};

/// Error type for line store access
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LineStoreError {
    #[error("line {index} is out of range (file has {len} lines)")]
    OutOfRange { index: usize, len: usize },
}

/// An ordered, indexable sequence of text lines that can be edited in place.
///
/// The scanner only reads through `lines()`; reference write-back goes
/// through `change_line()`.
pub trait LineStore {
    /// Path identifying this store. Parsed todos keep it as their handle.
    fn path(&self) -> &Path;

    /// All lines, 0-indexed, without line terminators.
    fn lines(&self) -> &[String];

    /// Replace the text of line `index`.
    fn change_line(&mut self, index: usize, text: String) -> Result<(), LineStoreError>;
}

/// A source file loaded into memory as lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path the file was read from (and will be written back to)
    pub path: PathBuf,
    lines: Vec<String>,
    /// Terminator of each line as read (`"\r\n"`, `"\n"`, or `""` for a
    /// final line without one)
    endings: Vec<&'static str>,
    /// Whether any line changed since load
    pub dirty: bool,
}

impl SourceFile {
    /// Build a source file from its full text.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        let mut lines = Vec::new();
        let mut endings = Vec::new();
        for chunk in text.split_inclusive('\n') {
            let (line, ending) = if let Some(line) = chunk.strip_suffix("\r\n") {
                (line, "\r\n")
            } else if let Some(line) = chunk.strip_suffix('\n') {
                (line, "\n")
            } else {
                (chunk, "")
            };
            lines.push(line.to_string());
            endings.push(ending);
        }
        SourceFile {
            path: path.into(),
            lines,
            endings,
            dirty: false,
        }
    }

    /// Render the lines back into file text, each with its original terminator.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (line, ending) in self.lines.iter().zip(&self.endings) {
            out.push_str(line);
            out.push_str(ending);
        }
        out
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl LineStore for SourceFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn lines(&self) -> &[String] {
        &self.lines
    }

    fn change_line(&mut self, index: usize, text: String) -> Result<(), LineStoreError> {
        let len = self.lines.len();
        let slot = self
            .lines
            .get_mut(index)
            .ok_or(LineStoreError::OutOfRange { index, len })?;
        if *slot != text {
            *slot = text;
            self.dirty = true;
        }
        Ok(())
    }
}
