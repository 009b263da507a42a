use crossterm::event::{KeyCode, KeyEvent};

use crate::io::backend::DeleteMode;
use crate::model::{IssueChanges, Status};
use crate::tui::app::App;
use crate::tui::cmd::Cmd;
use crate::tui::state::ModeState;

use super::actions::child_form;

pub(super) fn handle_confirm_delete(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ModeState::ConfirmDelete { ref id, .. } = app.mode else {
        return None;
    };
    let id = id.clone();
    let mode = match key.code {
        KeyCode::Char('y') => DeleteMode::Plain,
        KeyCode::Char('c') => DeleteMode::Cascade,
        KeyCode::Char('f') => DeleteMode::Force,
        KeyCode::Char('n') | KeyCode::Esc => {
            app.mode = ModeState::Board;
            return None;
        }
        _ => return None,
    };
    app.mode = ModeState::Board;
    Some(Cmd::Delete { id, mode })
}

/// Creating under a closed parent reopens it (as in progress) first.
pub(super) fn handle_confirm_closed_parent(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ModeState::ConfirmClosedParentCreate { ref parent } = app.mode else {
        return None;
    };
    let parent = parent.clone();
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.mode = ModeState::Create(child_form(&parent));
            Some(Cmd::Update {
                id: parent,
                changes: IssueChanges::status(Status::InProgress),
            })
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.mode = ModeState::Board;
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::mpsc;

    use super::*;
    use crate::tui::cmd::Worker;
    use crate::tui::input::handle_key;
    use crate::tui::input::keys::*;
    use crate::tui::state::Mode;
    use crate::tui::test_helpers::*;

    fn closed_parent_app() -> App {
        let mut app = loaded_app(FAMILY);
        super::super::actions::open_create_child(&mut app, "bd-10");
        app
    }

    #[test]
    fn delete_modes_by_key() {
        for (c, mode) in [
            ('y', DeleteMode::Plain),
            ('c', DeleteMode::Cascade),
            ('f', DeleteMode::Force),
        ] {
            let mut app = loaded_app(THREE_OPEN);
            app.mode = ModeState::ConfirmDelete {
                id: "bd-1".into(),
                preview: None,
            };
            assert_eq!(
                handle_key(&mut app, ch(c)),
                Some(Cmd::Delete {
                    id: "bd-1".into(),
                    mode,
                })
            );
            assert_eq!(app.mode_kind(), Mode::Board);
        }
    }

    #[test]
    fn delete_cancel_makes_no_call() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::ConfirmDelete {
            id: "bd-1".into(),
            preview: Some(Ok("would delete bd-1".into())),
        };
        assert_eq!(handle_key(&mut app, ch('x')), None);
        assert_eq!(app.mode_kind(), Mode::ConfirmDelete);
        assert_eq!(handle_key(&mut app, key(KeyCode::Esc)), None);
        assert_eq!(app.mode_kind(), Mode::Board);
    }

    #[test]
    fn confirming_closed_parent_reopens_exactly_once() {
        let mut app = closed_parent_app();
        let cmd = handle_key(&mut app, ch('y')).expect("reopen command");
        let form = app.mode.form().expect("create form");
        assert_eq!(form.parent.text, "bd-10");
        assert_eq!(app.mode_kind(), Mode::Create);

        let backend = Arc::new(FakeBackend::with_listing(FAMILY));
        let (tx, _rx) = mpsc::channel();
        let worker = Worker::new(backend.clone(), None, tx);
        for cmd in cmd.flatten() {
            worker.execute(cmd);
        }
        assert_eq!(backend.calls().len(), 1);
        assert!(backend.calls()[0].starts_with("update bd-10"));
        assert!(backend.calls()[0].contains("InProgress"));
    }

    #[test]
    fn declining_closed_parent_makes_no_call() {
        let mut app = closed_parent_app();
        assert_eq!(handle_key(&mut app, ch('n')), None);
        assert_eq!(app.mode_kind(), Mode::Board);

        let mut app = closed_parent_app();
        assert_eq!(handle_key(&mut app, key(KeyCode::Esc)), None);
        assert_eq!(app.mode_kind(), Mode::Board);
    }
}
