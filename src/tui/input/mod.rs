mod actions;
mod board;
mod confirm;
mod details;
mod filter;
pub mod form;
mod overlay;
mod pickers;
mod prompt;
mod search;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;
use super::cmd::Cmd;
use super::state::Mode;

pub use actions::{open_create_child, select_ghost};

/// Handle a key press in the current mode.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return None;
    }

    match app.mode_kind() {
        Mode::Board => board::handle_board(app, key),
        Mode::Details => details::handle_details(app, key),
        Mode::Help => overlay::handle_help(app, key),
        Mode::Search => search::handle_search(app, key),
        Mode::Filter => filter::handle_filter(app, key),
        Mode::Create | Mode::Edit => form::handle_form(app, key),
        Mode::Prompt => prompt::handle_prompt(app, key),
        Mode::ParentPicker => pickers::handle_parent_picker(app, key),
        Mode::TmuxPicker => pickers::handle_tmux_picker(app, key),
        Mode::DepList => overlay::handle_dep_list(app, key),
        Mode::ConfirmDelete => confirm::handle_confirm_delete(app, key),
        Mode::ConfirmClosedParentCreate => confirm::handle_confirm_closed_parent(app, key),
    }
}

/// Scroll step for PageUp/PageDown in text overlays
const PAGE_LINES: u16 = 10;

/// Shared line scrolling for read-only overlays. Returns false for other keys.
fn scroll_key(scroll: &mut u16, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => *scroll = scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => *scroll = scroll.saturating_sub(1),
        KeyCode::PageDown => *scroll = scroll.saturating_add(PAGE_LINES),
        KeyCode::PageUp => *scroll = scroll.saturating_sub(PAGE_LINES),
        KeyCode::Char('g') | KeyCode::Home => *scroll = 0,
        _ => return false,
    }
    true
}

#[cfg(test)]
pub(crate) mod keys {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub fn shift_tab() -> KeyEvent {
        KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)
    }
}
