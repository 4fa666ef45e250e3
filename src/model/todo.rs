use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Which annotation keyword opened a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Keyword {
    Todo,
    Fixme,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Todo => "TODO",
            Keyword::Fixme => "FIXME",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotation parsed from a source file.
///
/// `prefix` and `suffix` are captured from the marker line and never change.
/// `title` and `body` only grow while the scanner feeds continuation lines
/// into [`Todo::handle_line`]. The reference is read with
/// [`Todo::reference`] and changed with
/// [`apply_reference`](crate::ops::reference::apply_reference), which also
/// rewrites the marker line in the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    file: PathBuf,
    line: usize,
    keyword: Keyword,
    prefix: String,
    reference: Option<String>,
    suffix: String,
    title: String,
    body: String,
}

impl Todo {
    pub fn new(
        file: impl Into<PathBuf>,
        line: usize,
        keyword: Keyword,
        prefix: impl Into<String>,
        reference: Option<String>,
        suffix: impl Into<String>,
    ) -> Self {
        let suffix = suffix.into();
        Todo {
            file: file.into(),
            line,
            keyword,
            prefix: prefix.into(),
            reference,
            title: suffix.trim().to_string(),
            suffix,
            body: String::new(),
        }
    }

    /// Path of the line store this todo was parsed from
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// 0-based index of the marker line
    pub fn line(&self) -> usize {
        self.line
    }

    /// First line of continuation content
    pub fn start_line(&self) -> usize {
        self.line + 1
    }

    pub fn keyword(&self) -> Keyword {
        self.keyword
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Accumulate the payload of one continuation line.
    ///
    /// A blank marker suffix means the first continuation line becomes the
    /// title. After that, blank lines are dropped until the body has started.
    pub fn handle_line(&mut self, line: &str) {
        if self.title.is_empty() {
            self.title = line.to_string();
        } else if !self.body.is_empty() || !line.is_empty() {
            if !self.body.is_empty() {
                self.body.push('\n');
            }
            self.body.push_str(line);
        }
    }

    /// Render the marker line for the given reference.
    ///
    /// Always emits the `TODO` keyword, even for todos opened with `FIXME`.
    pub fn marker_line(&self, reference: Option<&str>) -> String {
        match reference.filter(|r| !r.is_empty()) {
            Some(r) => format!("{}TODO [{}]:{}", self.prefix, r, self.suffix),
            None => format!("{}TODO:{}", self.prefix, self.suffix),
        }
    }

    pub(crate) fn set_reference(&mut self, reference: Option<String>) {
        self.reference = reference;
    }
}
