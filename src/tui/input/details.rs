use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;
use crate::tui::cmd::Cmd;
use crate::tui::state::{ModeState, PromptKind};

use super::{actions, scroll_key};

pub(super) fn handle_details(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ModeState::Details(ref mut details) = app.mode else {
        return None;
    };
    if scroll_key(&mut details.scroll, key) {
        return None;
    }
    let id = details.id.clone();

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => {
            app.mode = ModeState::Board;
            None
        }
        KeyCode::Char('e') => actions::open_edit(app, &id),
        KeyCode::Char('E') => actions::open_external_editor(app, &id, true),
        KeyCode::Char('a') => actions::open_create_child(app, &id),
        KeyCode::Char('s') => actions::cycle_status(app, &id, 1),
        KeyCode::Char('S') => actions::cycle_status(app, &id, -1),
        KeyCode::Char('c') => actions::close(app, &id),
        KeyCode::Char('o') => actions::reopen(app, &id),
        KeyCode::Char('D') => actions::confirm_delete(app, &id),
        KeyCode::Char('B') => actions::prompt_blocker(app, &id, PromptKind::AddBlocker),
        KeyCode::Char('U') => actions::prompt_blocker(app, &id, PromptKind::RemoveBlocker),
        KeyCode::Char('y') => actions::copy_id(app, &id),
        KeyCode::Char('t') => actions::open_tmux(app, &id),
        _ => None,
    }
}
