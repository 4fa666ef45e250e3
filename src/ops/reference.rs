use crate::model::source::{LineStore, LineStoreError};
use crate::model::todo::Todo;

/// Error type for reference write-back
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("todo from {todo} cannot be written to {store}")]
    ForeignStore { todo: String, store: String },
    #[error(transparent)]
    LineStore(#[from] LineStoreError),
}

/// Set (or clear, with `None`) a todo's reference and rewrite its marker
/// line in `store`.
///
/// The line is replaced exactly once. The todo only takes the new value
/// after the store accepted the rewritten line.
pub fn apply_reference<S: LineStore + ?Sized>(
    store: &mut S,
    todo: &mut Todo,
    reference: Option<&str>,
) -> Result<(), ReferenceError> {
    if todo.file() != store.path() {
        return Err(ReferenceError::ForeignStore {
            todo: todo.file().display().to_string(),
            store: store.path().display().to_string(),
        });
    }

    let text = todo.marker_line(reference);
    store.change_line(todo.line(), text)?;
    todo.set_reference(reference.map(|r| r.to_string()));

    tracing::debug!(
        file = %store.path().display(),
        line = todo.line() + 1,
        reference = reference.unwrap_or(""),
        "reference written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::source::SourceFile;
    use crate::parse::parse_todos;

    fn file_with_todo_at_line_4() -> SourceFile {
        SourceFile::from_text("src/lib.rs", "a\nb\nc\nd\n// TODO: x\ne\n")
    }

    #[test]
    fn test_apply_reference_rewrites_marker_line() {
        let mut file = file_with_todo_at_line_4();
        let mut todo = parse_todos(&file).remove(0);
        assert_eq!(todo.line(), 4);

        apply_reference(&mut file, &mut todo, Some("ISSUE-9")).unwrap();

        assert_eq!(file.lines()[4], "// TODO [ISSUE-9]: x");
        assert_eq!(todo.reference(), Some("ISSUE-9"));
        assert!(file.dirty);

        let reparsed = parse_todos(&file);
        assert_eq!(reparsed[0].reference(), Some("ISSUE-9"));
    }

    #[test]
    fn test_apply_reference_leaves_other_lines_alone() {
        let mut file = file_with_todo_at_line_4();
        let mut todo = parse_todos(&file).remove(0);
        apply_reference(&mut file, &mut todo, Some("#1")).unwrap();
        assert_eq!(file.to_text(), "a\nb\nc\nd\n// TODO [#1]: x\ne\n");
    }

    #[test]
    fn test_clear_reference() {
        let mut file = SourceFile::from_text("a.rs", "// TODO [#5]: done soon\n");
        let mut todo = parse_todos(&file).remove(0);
        apply_reference(&mut file, &mut todo, None).unwrap();
        assert_eq!(file.lines()[0], "// TODO: done soon");
        assert_eq!(todo.reference(), None);
    }

    #[test]
    fn test_fixme_is_rewritten_as_todo() {
        let mut file = SourceFile::from_text("a.py", "# FIXME: broken\n");
        let mut todo = parse_todos(&file).remove(0);
        apply_reference(&mut file, &mut todo, Some("#2")).unwrap();
        assert_eq!(file.lines()[0], "# TODO [#2]: broken");
    }

    #[test]
    fn test_suffix_is_preserved_verbatim() {
        let mut file = SourceFile::from_text("a.rs", "  //  TODO:   spaced out  \n");
        let mut todo = parse_todos(&file).remove(0);
        apply_reference(&mut file, &mut todo, Some("#4")).unwrap();
        assert_eq!(file.lines()[0], "  //  TODO [#4]:   spaced out  ");
    }

    #[test]
    fn test_foreign_store_is_rejected() {
        let file = SourceFile::from_text("a.rs", "// TODO: x\n");
        let mut todo = parse_todos(&file).remove(0);
        let mut other = SourceFile::from_text("b.rs", "// TODO: x\n");

        let err = apply_reference(&mut other, &mut todo, Some("#1")).unwrap_err();
        assert!(matches!(err, ReferenceError::ForeignStore { .. }));
        assert_eq!(todo.reference(), None);
        assert!(!other.dirty);
    }

    #[test]
    fn test_shrunk_store_reports_out_of_range() {
        let file = file_with_todo_at_line_4();
        let mut todo = parse_todos(&file).remove(0);
        let mut shrunk = SourceFile::from_text("src/lib.rs", "a\n");

        let err = apply_reference(&mut shrunk, &mut todo, Some("#1")).unwrap_err();
        assert_eq!(
            err,
            ReferenceError::LineStore(LineStoreError::OutOfRange { index: 4, len: 1 })
        );
        assert_eq!(todo.reference(), None);
    }
}
