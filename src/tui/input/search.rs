use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;
use crate::tui::cmd::Cmd;
use crate::tui::state::ModeState;

/// Live search: the board narrows as the query is typed.
pub(super) fn handle_search(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ModeState::Search {
        ref mut input,
        ref original,
    } = app.mode
    else {
        return None;
    };

    match key.code {
        KeyCode::Enter => {
            app.mode = ModeState::Board;
        }
        KeyCode::Esc => {
            app.search = original.clone();
            app.mode = ModeState::Board;
            app.recompute();
        }
        _ => {
            if input.handle_key(key, false) && input.text != app.search {
                app.search = input.text.clone();
                app.recompute();
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use crate::tui::input::handle_key;
    use crate::tui::input::keys::*;
    use crate::tui::state::Mode;
    use crate::tui::test_helpers::*;

    fn open_count(app: &App) -> usize {
        app.columns.get(Status::Open).len()
    }

    #[test]
    fn typing_narrows_and_enter_keeps() {
        let mut app = loaded_app(THREE_OPEN);
        handle_key(&mut app, ch('/'));
        assert_eq!(app.mode_kind(), Mode::Search);
        for c in "login".chars() {
            handle_key(&mut app, ch(c));
        }
        assert_eq!(open_count(&app), 1);
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode_kind(), Mode::Board);
        assert_eq!(app.search, "login");
        assert_eq!(app.selected_id().as_deref(), Some("bd-2"));
    }

    #[test]
    fn esc_restores_previous_query() {
        let mut app = loaded_app(THREE_OPEN);
        app.search = "docs".into();
        app.recompute();
        handle_key(&mut app, ch('/'));
        handle_key(&mut app, ctrl('u'));
        assert_eq!(open_count(&app), 3);
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.search, "docs");
        assert_eq!(open_count(&app), 1);
    }
}
