use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::source::LineStore;
use crate::model::todo::{Keyword, Todo};

/// `<non-word run><one whitespace>TODO[ [ref]]:<suffix>`
static TODO_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex("TODO"));
static FIXME_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex("FIXME"));

fn marker_regex(keyword: &str) -> Regex {
    // Word characters are ASCII only; anything else may be part of a prefix.
    let pattern = format!(r"^([^A-Za-z0-9_]+\s){}(?: \[([^\]\s]+)\])?:(.*)$", keyword);
    Regex::new(&pattern).expect("marker pattern is valid")
}

/// Scanner state between lines
enum ScanState {
    Idle,
    /// Index into the output of the todo still taking continuation lines
    Accumulating(usize),
}

/// Parse every TODO / FIXME annotation in the store, in file order.
///
/// Calling this again after the store changes reflects the new contents.
pub fn parse_todos<S: LineStore + ?Sized>(store: &S) -> Vec<Todo> {
    let mut todos: Vec<Todo> = Vec::new();
    let mut state = ScanState::Idle;

    for (idx, line) in store.lines().iter().enumerate() {
        if let Some(todo) = match_marker(store, idx, line) {
            tracing::debug!(
                file = %store.path().display(),
                line = idx + 1,
                keyword = %todo.keyword(),
                title = todo.title(),
                "annotation found"
            );
            todos.push(todo);
            state = ScanState::Accumulating(todos.len() - 1);
            continue;
        }

        if let ScanState::Accumulating(open) = state {
            let todo = &mut todos[open];
            match continuation_payload(todo.prefix(), line) {
                Some(payload) => todo.handle_line(payload),
                None => state = ScanState::Idle,
            }
        }
    }

    todos
}

/// Try to open a new todo on this line. TODO is tried before FIXME.
fn match_marker<S: LineStore + ?Sized>(store: &S, idx: usize, line: &str) -> Option<Todo> {
    if let Some(caps) = TODO_RE.captures(line) {
        return Some(todo_from_captures(store, idx, Keyword::Todo, &caps));
    }
    FIXME_RE
        .captures(line)
        .map(|caps| todo_from_captures(store, idx, Keyword::Fixme, &caps))
}

fn todo_from_captures<S: LineStore + ?Sized>(
    store: &S,
    idx: usize,
    keyword: Keyword,
    caps: &Captures<'_>,
) -> Todo {
    let group = |i: usize| caps.get(i).map(|m| m.as_str());
    Todo::new(
        store.path(),
        idx,
        keyword,
        group(1).unwrap_or_default(),
        group(2).map(|r| r.to_string()),
        group(3).unwrap_or_default(),
    )
}

/// Decide whether `line` continues a todo opened with `prefix`.
///
/// Returns the text after the prefix when it does. The line's first N
/// characters (N = character count of the prefix) must equal the prefix
/// once trailing whitespace is ignored, and unless nothing follows, that
/// region must end in whitespace.
pub fn continuation_payload<'a>(prefix: &str, line: &'a str) -> Option<&'a str> {
    let split = line
        .char_indices()
        .nth(prefix.chars().count())
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    let (before, after) = line.split_at(split);

    if before.trim_end() != prefix.trim_end() {
        return None;
    }
    if !after.is_empty() && !before.ends_with(char::is_whitespace) {
        return None;
    }
    Some(after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::source::SourceFile;

    fn parse(text: &str) -> Vec<Todo> {
        parse_todos(&SourceFile::from_text("src/main.rs", text))
    }

    #[test]
    fn test_no_annotations() {
        let todos = parse("fn main() {\n    // just a comment\n    let todo = 1;\n}\n");
        assert!(todos.is_empty());
    }

    #[test]
    fn test_empty_file() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_single_line_todo() {
        let todos = parse("// TODO: fix this");
        assert_eq!(todos.len(), 1);
        let t = &todos[0];
        assert_eq!(t.prefix(), "// ");
        assert_eq!(t.reference(), None);
        assert_eq!(t.title(), "fix this");
        assert_eq!(t.body(), "");
        assert_eq!(t.suffix(), " fix this");
        assert_eq!(t.line(), 0);
        assert_eq!(t.keyword(), Keyword::Todo);
        assert_eq!(t.file(), std::path::Path::new("src/main.rs"));
    }

    #[test]
    fn test_reference_capture() {
        let todos = parse("// TODO [ISSUE-7]: refactor");
        assert_eq!(todos[0].reference(), Some("ISSUE-7"));
        assert_eq!(todos[0].title(), "refactor");
    }

    #[test]
    fn test_fixme() {
        let todos = parse("# FIXME [#3]: flaky on windows");
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].keyword(), Keyword::Fixme);
        assert_eq!(todos[0].prefix(), "# ");
        assert_eq!(todos[0].reference(), Some("#3"));
        assert_eq!(todos[0].title(), "flaky on windows");
    }

    #[test]
    fn test_indented_prefix_includes_leading_whitespace() {
        let todos = parse("    // TODO: nested");
        assert_eq!(todos[0].prefix(), "    // ");
    }

    #[test]
    fn test_prefix_requires_non_word_run() {
        // No non-word run before the keyword
        assert!(parse("TODO: bare").is_empty());
        // Word characters in the prefix
        assert!(parse("x = 1 // TODO: trailing").is_empty());
        // Missing colon
        assert!(parse("// TODO fix").is_empty());
        // Lowercase keyword
        assert!(parse("// todo: fix").is_empty());
    }

    #[test]
    fn test_malformed_reference_is_not_a_marker() {
        assert!(parse("// TODO [has space]: x").is_empty());
        assert!(parse("// TODO []: x").is_empty());
        assert!(parse("// TODO[#1]: x").is_empty());
    }

    #[test]
    fn test_continuation_accumulation() {
        let todos = parse(
            "// TODO: short title\n\
             //\n\
             // first body line\n\
             // second body line\n",
        );
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title(), "short title");
        assert_eq!(todos[0].body(), "first body line\nsecond body line");
    }

    #[test]
    fn test_blank_suffix_takes_title_from_next_line() {
        let todos = parse("# TODO:\n# The title\n# the body\n");
        assert_eq!(todos[0].title(), "The title");
        assert_eq!(todos[0].body(), "the body");
    }

    #[test]
    fn test_prefix_mismatch_closes_todo() {
        let todos = parse(
            "// TODO: title\n\
             // body\n\
             fn main() {}\n\
             // not part of it\n",
        );
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].body(), "body");
    }

    #[test]
    fn test_prefix_without_space_after_closes_todo() {
        let todos = parse("// TODO: title\n//body\n// later\n");
        assert_eq!(todos[0].body(), "");
    }

    #[test]
    fn test_deeper_indent_inside_body_is_kept() {
        let todos = parse("// TODO: title\n//   indented\n");
        assert_eq!(todos[0].body(), "  indented");
    }

    #[test]
    fn test_adjacent_markers_are_independent() {
        let todos = parse(
            "// TODO: first\n\
             // FIXME: second\n\
             // body of second\n",
        );
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].title(), "first");
        assert_eq!(todos[0].body(), "");
        assert_eq!(todos[1].title(), "second");
        assert_eq!(todos[1].body(), "body of second");
        assert_eq!(todos[1].line(), 1);
    }

    #[test]
    fn test_todo_after_inert_lines() {
        let todos = parse("fn a() {}\n\n    # TODO: python style\n    #   more\n");
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].line(), 2);
        assert_eq!(todos[0].body(), "  more");
    }

    #[test]
    fn test_continuation_payload_rules() {
        assert_eq!(continuation_payload("// ", "// text"), Some("text"));
        assert_eq!(continuation_payload("// ", "//"), Some(""));
        assert_eq!(continuation_payload("// ", "// "), Some(""));
        assert_eq!(continuation_payload("// ", "//x"), None);
        assert_eq!(continuation_payload("// ", "#  text"), None);
        assert_eq!(continuation_payload("// ", "/"), None);
        assert_eq!(continuation_payload("  // ", "// text"), None);
    }

    #[test]
    fn test_continuation_payload_counts_chars() {
        assert_eq!(continuation_payload("→ ", "→ suite"), Some("suite"));
        assert_eq!(continuation_payload("// ", "//é"), None);
    }

    #[test]
    fn test_reparse_reflects_changes() {
        let mut file = SourceFile::from_text("a.rs", "// TODO: x\n");
        assert_eq!(parse_todos(&file)[0].reference(), None);
        file.change_line(0, "// TODO [#1]: x".to_string()).unwrap();
        assert_eq!(parse_todos(&file)[0].reference(), Some("#1"));
    }
}
