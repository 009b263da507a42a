//! Plain-text form of an issue used for the external editor round trip.
//!
//! ```text
//! ---
//! title: Fix login
//! status: open
//! priority: 1
//! type: bug
//! assignee: dana
//! labels: auth, web
//! parent: bd-12
//! ---
//! Free-text description, kept verbatim.
//! ```

use crate::model::{ISSUE_TYPES, IssueDraft, Status};

use super::normalize::parse_priority;

const DELIMITER: &str = "---";

/// Errors from parsing an edited issue file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssueTextError {
    #[error("missing header: file must start with a `---` line")]
    MissingHeader,
    #[error("unterminated header: no closing `---` line")]
    UnterminatedHeader,
    #[error("line {line}: expected `key: value`")]
    MalformedLine { line: usize },
    #[error("line {line}: unknown field `{key}`")]
    UnknownField { line: usize, key: String },
    #[error("unknown status `{0}` (open, in_progress, blocked, closed)")]
    InvalidStatus(String),
    #[error("unknown type `{0}` (task, bug, feature, epic, chore)")]
    InvalidType(String),
    #[error("invalid priority `{0}` (0-4)")]
    InvalidPriority(String),
}

/// Render a draft as an editable document. The body is followed by exactly
/// one newline, which `parse_issue_text` strips again.
pub fn render_issue_text(draft: &IssueDraft) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    push_field(&mut out, "title", draft.title.trim());
    push_field(&mut out, "status", draft.status.as_str());
    push_field(&mut out, "priority", &draft.priority.to_string());
    push_field(&mut out, "type", &draft.issue_type);
    push_field(&mut out, "assignee", draft.assignee.trim());
    push_field(&mut out, "labels", draft.labels.trim());
    push_field(&mut out, "parent", draft.parent.trim());
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&draft.description);
    out.push('\n');
    out
}

fn push_field(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

/// Parse an edited document on top of `base`. Header keys that are absent
/// keep the base value; the body always replaces the description.
pub fn parse_issue_text(text: &str, base: &IssueDraft) -> Result<IssueDraft, IssueTextError> {
    let mut lines = text.split_inclusive('\n');
    let header_start = match lines.next() {
        Some(first) if is_delimiter(first) => first.len(),
        _ => return Err(IssueTextError::MissingHeader),
    };

    // Locate the closing delimiter before reading any field, so a deleted
    // `---` is reported as such rather than as a bad body line.
    let mut offset = header_start;
    let mut header_end = None;
    for raw in lines {
        if is_delimiter(raw) {
            header_end = Some((offset, offset + raw.len()));
            break;
        }
        offset += raw.len();
    }
    let (header_end, body_start) = header_end.ok_or(IssueTextError::UnterminatedHeader)?;

    let mut draft = base.clone();
    for (i, raw) in text[header_start..header_end].lines().enumerate() {
        let line_no = i + 2;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (key, value) = trimmed
            .split_once(':')
            .ok_or(IssueTextError::MalformedLine { line: line_no })?;
        apply_field(&mut draft, key.trim(), value.trim(), line_no)?;
    }

    let body = &text[body_start..];
    draft.description = body.strip_suffix('\n').unwrap_or(body).to_string();
    Ok(draft)
}

fn is_delimiter(raw: &str) -> bool {
    raw.trim_end() == DELIMITER
}

fn apply_field(
    draft: &mut IssueDraft,
    key: &str,
    value: &str,
    line: usize,
) -> Result<(), IssueTextError> {
    match key.to_ascii_lowercase().as_str() {
        "title" => draft.title = value.to_string(),
        "status" => {
            draft.status =
                Status::parse(value).ok_or_else(|| IssueTextError::InvalidStatus(value.into()))?;
        }
        "priority" => {
            draft.priority =
                parse_priority(value).ok_or_else(|| IssueTextError::InvalidPriority(value.into()))?;
        }
        "type" | "issue_type" => {
            let lower = value.to_ascii_lowercase();
            if !ISSUE_TYPES.contains(&lower.as_str()) {
                return Err(IssueTextError::InvalidType(value.into()));
            }
            draft.issue_type = lower;
        }
        "assignee" => draft.assignee = value.to_string(),
        "labels" => draft.labels = value.to_string(),
        "parent" => draft.parent = value.to_string(),
        other => {
            return Err(IssueTextError::UnknownField {
                line,
                key: other.to_string(),
            });
        }
    }
    Ok(())
}
