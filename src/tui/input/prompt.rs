use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;
use crate::tui::cmd::Cmd;
use crate::tui::state::{ModeState, PromptKind};

pub(super) fn handle_prompt(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ModeState::Prompt(ref mut prompt) = app.mode else {
        return None;
    };

    match key.code {
        KeyCode::Esc => {
            app.mode = ModeState::Board;
            None
        }
        KeyCode::Enter => {
            let other = prompt.input.text.trim().to_string();
            let (kind, issue) = (prompt.kind, prompt.issue.clone());
            if let Err(e) = check_target(app, kind, &issue, &other) {
                app.toast_error(e);
                return None;
            }
            app.mode = ModeState::Board;
            Some(match kind {
                PromptKind::AddBlocker => Cmd::AddBlocker {
                    issue,
                    blocker: other,
                },
                PromptKind::RemoveBlocker => Cmd::RemoveBlocker {
                    issue,
                    blocker: other,
                },
            })
        }
        _ => {
            prompt.input.handle_key(key, false);
            None
        }
    }
}

fn check_target(app: &App, kind: PromptKind, issue: &str, other: &str) -> Result<(), String> {
    if other.is_empty() {
        return Err("enter an issue id".into());
    }
    if other == issue {
        return Err(format!("{issue} cannot block itself"));
    }
    if app.issue(other).is_none() {
        return Err(format!("unknown issue {other}"));
    }
    if kind == PromptKind::RemoveBlocker
        && app
            .issue(issue)
            .is_some_and(|i| !i.blocked_by.iter().any(|b| b == other))
    {
        return Err(format!("{other} does not block {issue}"));
    }
    Ok(())
}
