use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::tui::cmd::Cmd;
use crate::tui::form::{FormField, FormTarget};
use crate::tui::state::ModeState;

/// Key handling for the Create and Edit forms.
pub fn handle_form(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let form = app.mode.form_mut()?;

    match key.code {
        KeyCode::Char('s') if ctrl => return save(app),
        KeyCode::Char('e') if ctrl => return Some(Cmd::OpenEditor(form.draft())),
        KeyCode::Esc => {
            if form.title.is_blank() {
                app.mode = ModeState::Board;
                return None;
            }
            return save(app);
        }
        KeyCode::Tab => form.field = form.field.next(),
        KeyCode::BackTab => form.field = form.field.prev(),
        KeyCode::Enter if form.field != FormField::Description => return save(app),
        KeyCode::Left | KeyCode::Char('h') if form.field.is_choice() => form.cycle(-1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') if form.field.is_choice() => {
            form.cycle(1)
        }
        _ => {
            let multiline = form.field == FormField::Description;
            if let Some(input) = form.active_input() {
                input.handle_key(key, multiline);
            }
        }
    }
    None
}

/// Submit the open form. Stays open with a toast when validation fails.
fn save(app: &mut App) -> Option<Cmd> {
    match submission(app) {
        Ok(cmd) => {
            if cmd.is_none() {
                app.toast_info("no changes");
            }
            app.mode = ModeState::Board;
            cmd
        }
        Err(e) => {
            app.toast_error(e);
            None
        }
    }
}

/// The backend command for the open form, `Ok(None)` when an edit changes
/// nothing.
pub fn submission(app: &App) -> Result<Option<Cmd>, String> {
    let form = app
        .mode
        .form()
        .ok_or_else(|| "no form is open".to_string())?;
    let draft = form.draft();
    draft
        .validate(form.edit_id(), |id| app.index.contains_key(id))
        .map_err(|e| e.to_string())?;

    match form.target {
        FormTarget::Create { ref blocker } => Ok(Some(Cmd::Create {
            draft,
            blocker: blocker.clone(),
        })),
        FormTarget::Edit { ref id } => {
            let issue = app
                .issue(id)
                .ok_or_else(|| format!("{id} no longer exists"))?;
            if let Some(parent) = draft.parent_id()
                && app.is_descendant(parent, id)
            {
                return Err(format!("{parent} is a descendant of {id}"));
            }
            let changes = draft.changes_from(issue);
            if changes.is_empty() {
                return Ok(None);
            }
            Ok(Some(Cmd::Update {
                id: id.clone(),
                changes,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IssueDraft, Status};
    use crate::tui::form::IssueForm;
    use crate::tui::input::handle_key;
    use crate::tui::input::keys::*;
    use crate::tui::state::Mode;
    use crate::tui::test_helpers::*;

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, ch(c));
        }
    }

    fn edit_form(app: &mut App, id: &str) {
        let issue = app.issue(id).unwrap().clone();
        app.mode = ModeState::Edit(IssueForm::edit(id, &IssueDraft::from_issue(&issue)));
    }

    #[test]
    fn create_submits_typed_title() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Create(IssueForm::create(&IssueDraft::default()));
        type_text(&mut app, "New thing");
        match handle_key(&mut app, key(KeyCode::Enter)) {
            Some(Cmd::Create { draft, blocker }) => {
                assert_eq!(draft.title, "New thing");
                assert_eq!(blocker, None);
            }
            other => panic!("expected create, got {other:?}"),
        }
        assert_eq!(app.mode_kind(), Mode::Board);
    }

    #[test]
    fn esc_with_empty_title_cancels() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Create(IssueForm::create(&IssueDraft::default()));
        assert_eq!(handle_key(&mut app, key(KeyCode::Esc)), None);
        assert_eq!(app.mode_kind(), Mode::Board);
        assert!(app.toast.is_none());
    }

    #[test]
    fn esc_with_title_saves() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Create(IssueForm::create(&IssueDraft::default()));
        type_text(&mut app, "Keep me");
        assert!(matches!(
            handle_key(&mut app, key(KeyCode::Esc)),
            Some(Cmd::Create { .. })
        ));
    }

    #[test]
    fn edit_sends_only_changed_fields() {
        let mut app = loaded_app(THREE_OPEN);
        edit_form(&mut app, "bd-2");
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Right));
        match handle_key(&mut app, ctrl('s')) {
            Some(Cmd::Update { id, changes }) => {
                assert_eq!(id, "bd-2");
                assert_eq!(changes.status, Some(Status::InProgress));
                assert_eq!(changes.title, None);
                assert_eq!(changes.priority, None);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn unchanged_edit_makes_no_call() {
        let mut app = loaded_app(THREE_OPEN);
        edit_form(&mut app, "bd-1");
        assert_eq!(handle_key(&mut app, ctrl('s')), None);
        assert_eq!(app.mode_kind(), Mode::Board);
    }

    #[test]
    fn unknown_parent_keeps_form_open() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Create(IssueForm::create(&IssueDraft::default()));
        type_text(&mut app, "Orphan");
        app.mode.form_mut().unwrap().parent.set("bd-404");
        assert_eq!(handle_key(&mut app, ctrl('s')), None);
        assert_eq!(app.mode_kind(), Mode::Create);
        assert!(app.toast.as_ref().is_some_and(|t| t.text.contains("bd-404")));
    }

    #[test]
    fn descendant_parent_is_rejected() {
        let mut app = loaded_app(FAMILY);
        edit_form(&mut app, "bd-10");
        app.mode.form_mut().unwrap().parent.set("bd-12");
        assert!(submission(&app).is_err());
    }

    #[test]
    fn enter_in_description_inserts_newline() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Create(IssueForm::create(&IssueDraft::default()));
        type_text(&mut app, "T");
        for _ in 0..7 {
            handle_key(&mut app, key(KeyCode::Tab));
        }
        type_text(&mut app, "a");
        assert_eq!(handle_key(&mut app, key(KeyCode::Enter)), None);
        type_text(&mut app, "b");
        assert_eq!(app.mode.form().unwrap().description.text, "a\nb");
    }

    #[test]
    fn ctrl_e_opens_editor_with_current_values() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Create(IssueForm::create(&IssueDraft::default()));
        type_text(&mut app, "Draft");
        match handle_key(&mut app, ctrl('e')) {
            Some(Cmd::OpenEditor(draft)) => assert_eq!(draft.title, "Draft"),
            other => panic!("expected editor, got {other:?}"),
        }
        assert_eq!(app.mode_kind(), Mode::Create);
    }

    #[test]
    fn shift_tab_wraps_to_description() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Create(IssueForm::create(&IssueDraft::default()));
        handle_key(&mut app, shift_tab());
        assert_eq!(app.mode.form().unwrap().field, FormField::Description);
    }
}
