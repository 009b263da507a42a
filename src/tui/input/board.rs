use crossterm::event::{KeyCode, KeyEvent};

use crate::model::Status;
use crate::tui::app::App;
use crate::tui::cmd::Cmd;
use crate::tui::refresh::ReloadSource;
use crate::tui::state::{DetailsState, FilterForm, ModeState, PromptKind};
use crate::tui::text_input::TextInput;

use super::actions;

pub(super) fn handle_board(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    if app.leader {
        app.leader = false;
        return handle_leader(app, key);
    }

    let page = app.items_per_page() as isize;
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => focus_column(app, -1),
        KeyCode::Char('l') | KeyCode::Right => focus_column(app, 1),
        KeyCode::Char('j') | KeyCode::Down => move_selection(app, 1),
        KeyCode::Char('k') | KeyCode::Up => move_selection(app, -1),
        KeyCode::PageDown => move_selection(app, page),
        KeyCode::PageUp => move_selection(app, -page),
        KeyCode::Char('g') | KeyCode::Home => {
            app.selection.select_first(app.focus);
            keep_visible(app);
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.selection.select_last(app.columns.get(app.focus));
            keep_visible(app);
        }
        KeyCode::Char(' ') => app.leader = true,
        KeyCode::Char('n') => return actions::open_create(app),
        KeyCode::Char('/') => {
            app.mode = ModeState::Search {
                input: TextInput::new(app.search.clone()),
                original: app.search.clone(),
            };
        }
        KeyCode::Char('f') => app.mode = ModeState::Filter(FilterForm::from_filter(&app.filter)),
        KeyCode::Char('F') => {
            app.clear_search_and_filters();
            app.toast_info("cleared search and filters");
        }
        KeyCode::Char('r') => return Some(app.reload(ReloadSource::Manual)),
        KeyCode::Char('?') => app.mode = ModeState::Help { scroll: 0 },
        KeyCode::Char('q') => app.should_quit = true,
        _ => return on_selected(app, key),
    }
    None
}

/// Bindings that act on the focused issue.
fn on_selected(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    let id = app.selected_id()?;
    match key.code {
        KeyCode::Enter => {
            app.mode = ModeState::Details(DetailsState::new(id));
            None
        }
        KeyCode::Char('a') => actions::open_create_child(app, &id),
        KeyCode::Char('b') => actions::open_create_blocked(app, &id),
        KeyCode::Char('C') => actions::open_clone(app, &id),
        KeyCode::Char('e') => actions::open_edit(app, &id),
        KeyCode::Char('E') => actions::open_external_editor(app, &id, false),
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

fn handle_leader(app: &mut App, key: KeyEvent) -> Option<Cmd> {
    if key.code == KeyCode::Char('s') {
        return actions::toggle_sort(app);
    }
    let id = app.selected_id()?;
    match key.code {
        KeyCode::Char('p') => actions::open_parent_picker(app, &id),
        KeyCode::Char('P') => actions::clear_parent(app, &id),
        KeyCode::Char('d') => actions::open_dep_list(app, &id),
        _ => None,
    }
}

fn focus_column(app: &mut App, dir: isize) {
    let idx = app.focus.column_index() as isize + dir;
    if let Some(status) = usize::try_from(idx).ok().and_then(Status::from_column_index) {
        app.focus = status;
        keep_visible(app);
    }
}

fn move_selection(app: &mut App, delta: isize) {
    app.selection.move_by(app.columns.get(app.focus), delta);
    keep_visible(app);
}

fn keep_visible(app: &mut App) {
    let page = app.items_per_page();
    app.selection.ensure_visible(app.columns.get(app.focus), page);
}
