use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;
use crate::tui::cmd::Cmd;
use crate::tui::state::ModeState;

use super::scroll_key;

pub(super) fn handle_help(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ModeState::Help { ref mut scroll } = app.mode else {
        return None;
    };
    if !scroll_key(scroll, key) && is_close(key) {
        app.mode = ModeState::Board;
    }
    None
}

pub(super) fn handle_dep_list(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ModeState::DepList(ref mut list) = app.mode else {
        return None;
    };
    if !scroll_key(&mut list.scroll, key) && is_close(key) {
        app.mode = ModeState::Board;
    }
    None
}

fn is_close(key: KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?')
    )
}
