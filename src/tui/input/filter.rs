use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;
use crate::tui::cmd::Cmd;
use crate::tui::state::ModeState;

/// The filter form edits a copy; nothing changes until Enter.
pub(super) fn handle_filter(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ModeState::Filter(ref mut form) = app.mode else {
        return None;
    };

    match key.code {
        KeyCode::Esc => app.mode = ModeState::Board,
        KeyCode::Enter => {
            app.filter = form.to_filter();
            app.mode = ModeState::Board;
            app.recompute();
            if !app.filter.is_empty() {
                app.toast_info(format!("filter: {}", app.filter.summary()));
            }
        }
        KeyCode::Tab | KeyCode::Down => form.field = form.field.next(),
        KeyCode::BackTab | KeyCode::Up => form.field = form.field.prev(),
        _ => match form.active_input() {
            Some(input) => {
                input.handle_key(key, false);
            }
            None => match key.code {
                KeyCode::Left | KeyCode::Char('h') => form.cycle(-1),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => form.cycle(1),
                KeyCode::Backspace | KeyCode::Delete => form.clear_field(),
                _ => {}
            },
        },
    }
    None
}
