use std::fs;
use std::io::Write;
use std::process::Command;

use crate::model::IssueDraft;
use crate::ops::issue_text::{IssueTextError, parse_issue_text, render_issue_text};

/// Error type for the external editor round trip
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("could not prepare temp file: {0}")]
    TempFile(#[source] std::io::Error),
    #[error("could not start editor `{editor}`: {source}")]
    Spawn {
        editor: String,
        source: std::io::Error,
    },
    #[error("editor exited with {0}")]
    Exit(std::process::ExitStatus),
    #[error("empty editor command")]
    NoEditor,
    #[error(transparent)]
    Parse(#[from] IssueTextError),
}

/// Pick the editor: configured value, then $VISUAL, then $EDITOR, then `vi`.
pub fn resolve_editor(configured: Option<&str>) -> String {
    configured
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| std::env::var("VISUAL").ok().filter(|s| !s.trim().is_empty()))
        .or_else(|| std::env::var("EDITOR").ok().filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_string())
}

/// Open `initial` in the editor and return the saved text.
///
/// Blocks until the editor exits; the caller must hand the terminal over
/// first. The editor command may carry arguments (`code --wait`).
pub fn edit_text(editor: &str, initial: &str) -> Result<String, EditorError> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().ok_or(EditorError::NoEditor)?;

    let mut file = tempfile::Builder::new()
        .prefix("beadboard-")
        .suffix(".md")
        .tempfile()
        .map_err(EditorError::TempFile)?;
    file.write_all(initial.as_bytes())
        .and_then(|_| file.flush())
        .map_err(EditorError::TempFile)?;

    tracing::info!(editor = %editor, path = %file.path().display(), "launching editor");
    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .map_err(|source| EditorError::Spawn {
            editor: editor.to_string(),
            source,
        })?;
    if !status.success() {
        return Err(EditorError::Exit(status));
    }

    fs::read_to_string(file.path()).map_err(EditorError::TempFile)
}

/// Full round trip for a draft: render, edit, parse on top of the original.
pub fn edit_draft(editor: &str, draft: &IssueDraft) -> Result<IssueDraft, EditorError> {
    let edited = edit_text(editor, &render_issue_text(draft))?;
    Ok(parse_issue_text(&edited, draft)?)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::model::Status;

    #[test]
    fn explicit_editor_wins() {
        assert_eq!(resolve_editor(Some("nano -w")), "nano -w");
    }

    #[test]
    fn true_editor_returns_text_unchanged() {
        let out = edit_text("true", "hello\n").unwrap();
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn failing_editor_is_error() {
        assert!(matches!(edit_text("false", "x"), Err(EditorError::Exit(_))));
    }

    #[test]
    fn scripted_edit_is_parsed() {
        let draft = IssueDraft {
            title: "Old".into(),
            ..Default::default()
        };
        // `sed -i` stands in for a human editing the file.
        let edited = edit_draft("sed -i -e s/Old/New/ -e s/^status:.*/status:closed/", &draft).unwrap();
        assert_eq!(edited.title, "New");
        assert_eq!(edited.status, Status::Closed);
    }

    #[test]
    fn corrupted_header_is_parse_error() {
        let draft = IssueDraft::default();
        let err = edit_draft("sed -i -e /^---$/d", &draft).unwrap_err();
        assert!(matches!(err, EditorError::Parse(IssueTextError::MissingHeader)));
    }
}
