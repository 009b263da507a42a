use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::IssueChanges;
use crate::tui::app::App;
use crate::tui::cmd::Cmd;
use crate::tui::state::ModeState;

fn step(cursor: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (cursor as isize + delta).clamp(0, len as isize - 1) as usize
}

/// Type to narrow the candidates, arrows to move, Enter to reparent.
pub(super) fn handle_parent_picker(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ModeState::ParentPicker(ref mut picker) = app.mode else {
        return None;
    };
    let visible = picker.visible(&app.issues, &app.index);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => app.mode = ModeState::Board,
        KeyCode::Down => picker.cursor = step(picker.cursor, visible.len(), 1),
        KeyCode::Up => picker.cursor = step(picker.cursor, visible.len(), -1),
        KeyCode::Char('n') if ctrl => picker.cursor = step(picker.cursor, visible.len(), 1),
        KeyCode::Char('p') if ctrl => picker.cursor = step(picker.cursor, visible.len(), -1),
        KeyCode::Enter => {
            let Some(&chosen) = visible.get(picker.cursor) else {
                app.toast_info("no matching issue");
                return None;
            };
            let id = picker.issue.clone();
            let to = app.issues[chosen].id.clone();
            let from = app.issue(&id).and_then(|i| i.parent.clone());
            app.mode = ModeState::Board;
            if from.as_deref() == Some(to.as_str()) {
                app.toast_info(format!("{to} is already the parent"));
                return None;
            }
            return Some(Cmd::Update {
                id,
                changes: IssueChanges::parent(from, Some(to)),
            });
        }
        _ => {
            if picker.query.handle_key(key, false) {
                picker.cursor = 0;
            }
        }
    }
    None
}

pub(super) fn handle_tmux_picker(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ModeState::TmuxPicker(ref mut picker) = app.mode else {
        return None;
    };
    let len = picker.panes.as_ref().map_or(0, Vec::len);

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.mode = ModeState::Board,
        KeyCode::Char('j') | KeyCode::Down => picker.cursor = step(picker.cursor, len, 1),
        KeyCode::Char('k') | KeyCode::Up => picker.cursor = step(picker.cursor, len, -1),
        KeyCode::Enter => {
            let pane = picker.selected()?.pane_id.clone();
            let text = picker.issue.clone();
            app.mode = ModeState::Board;
            return Some(Cmd::SendToPane { pane, text });
        }
        KeyCode::Char('m') => {
            let pane = picker.selected()?;
            return Some(Cmd::SetPaneMark {
                pane: pane.pane_id.clone(),
                marked: !pane.marked,
            });
        }
        _ => {}
    }
    None
}
