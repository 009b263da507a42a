//! Mouse input. Clicks resolve through the same geometry the renderer
//! draws with.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::model::Status;

use super::app::App;
use super::cmd::Cmd;
use super::input::select_ghost;
use super::state::ModeState;

/// Lines per wheel notch in text overlays
const WHEEL_LINES: u16 = 3;

pub fn handle_mouse(app: &mut App, event: MouseEvent) -> Option<Cmd> {
    let delta: i8 = match event.kind {
        MouseEventKind::ScrollDown => 1,
        MouseEventKind::ScrollUp => -1,
        MouseEventKind::Down(MouseButton::Left) => {
            if matches!(app.mode, ModeState::Board) {
                click(app, event.column, event.row);
            }
            return None;
        }
        _ => return None,
    };

    match app.mode {
        ModeState::Board => wheel(app, event.column, event.row, delta as isize),
        ModeState::Details(ref mut d) => d.scroll = scroll_text(d.scroll, delta),
        ModeState::Help { ref mut scroll } => *scroll = scroll_text(*scroll, delta),
        ModeState::DepList(ref mut l) => l.scroll = scroll_text(l.scroll, delta),
        _ => {}
    }
    None
}

fn scroll_text(scroll: u16, delta: i8) -> u16 {
    if delta > 0 {
        scroll.saturating_add(WHEEL_LINES)
    } else {
        scroll.saturating_sub(WHEEL_LINES)
    }
}

/// Select the row under the pointer. Ghost rows select their issue's real
/// row; clicks below the last row only focus the column.
fn click(app: &mut App, x: u16, y: u16) {
    app.leader = false;
    let Some((col, row)) = app.geometry.hit(x, y) else {
        return;
    };
    let Some(status) = Status::from_column_index(col) else {
        return;
    };
    let column = app.columns.get(status);
    let index = app.selection.get(status).scroll + row;
    let Some(&hit) = column.rows.get(index) else {
        app.focus = status;
        return;
    };

    if hit.ghost {
        if !select_ghost(app, hit.issue) {
            tracing::warn!(issue = hit.issue, "ghost row has no visible issue");
        }
        return;
    }
    if let Some(sel) = column.selection_index_of(hit.issue) {
        app.focus = status;
        app.selection.select(status, sel);
        let page = app.items_per_page();
        app.selection.ensure_visible(app.columns.get(status), page);
    }
}

fn wheel(app: &mut App, x: u16, y: u16, delta: isize) {
    let Some(status) = app.geometry.column_at(x, y).and_then(Status::from_column_index) else {
        return;
    };
    app.focus = status;
    let page = app.items_per_page();
    let column = app.columns.get(status);
    app.selection.move_by(column, delta);
    app.selection.ensure_visible(column, page);
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::model::Filter;
    use crate::tui::state::DetailsState;
    use crate::tui::test_helpers::*;

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn left_click(app: &mut App, col: usize, row: usize) {
        let (x, y) = app.geometry.cell_for(col, row);
        handle_mouse(app, mouse(MouseEventKind::Down(MouseButton::Left), x, y));
    }

    #[test]
    fn click_selects_row_and_focuses_column() {
        let mut app = loaded_app(THREE_OPEN);
        let third = app.issues[app.columns.get(Status::Open).issues[2]].id.clone();
        app.focus = Status::Closed;
        left_click(&mut app, 0, 2);
        assert_eq!(app.focus, Status::Open);
        assert_eq!(app.selected_id(), Some(third));
    }

    #[test]
    fn click_on_header_is_ignored() {
        let mut app = loaded_app(THREE_OPEN);
        let before = app.selection.clone();
        let (x, y) = app.geometry.cell_for(0, 0);
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), x, y - 1));
        assert_eq!(app.selection, before);
    }

    #[test]
    fn click_on_ghost_selects_ancestor() {
        let mut app = loaded_app(FAMILY);
        // Open column: Standalone, then ghost bd-10, bd-11, bd-12.
        let column = app.columns.get(Status::Open);
        let ghost_row = column.rows.iter().position(|r| r.ghost).unwrap();
        let ghost_issue = column.rows[ghost_row].issue;
        left_click(&mut app, 0, ghost_row);
        assert_eq!(app.focus, Status::Closed);
        assert_eq!(app.selected_index(), Some(ghost_issue));
    }

    #[test]
    fn ghost_hidden_by_filter_clears_filters() {
        let mut app = loaded_app(FAMILY);
        app.filter = Filter {
            status: Some(Status::Open),
            ..Default::default()
        };
        app.search = "child".into();
        app.recompute();
        let column = app.columns.get(Status::Open);
        let ghost_row = column.rows.iter().position(|r| r.ghost).unwrap();
        let ghost_issue = column.rows[ghost_row].issue;
        assert_eq!(app.issues[ghost_issue].id, "bd-10");

        left_click(&mut app, 0, ghost_row);
        assert!(app.filter.is_empty());
        assert!(app.search.is_empty());
        assert_eq!(app.selected_id().as_deref(), Some("bd-10"));
        assert!(app.toast.is_some());
    }

    /// 30 loose open issues, then two low-priority children of a closed
    /// epic, so the ghost sits below the first page.
    fn long_column_with_ghost() -> App {
        let mut payload = many_open(30);
        payload.push_str(concat!(
            r#"{"id":"bd-90","title":"Epic","status":"closed","issue_type":"epic"}"#,
            "\n",
            r#"{"id":"bd-91","title":"Part one","parent":"bd-90","priority":4}"#,
            "\n",
            r#"{"id":"bd-92","title":"Part two","parent":"bd-90","priority":4}"#,
            "\n",
        ));
        loaded_app(&payload)
    }

    #[test]
    fn clicks_in_scrolled_column_resolve_to_the_drawn_row() {
        let mut app = long_column_with_ghost();
        let page = app.items_per_page();
        let last = app.columns.get(Status::Open).len() - 1;
        app.selection.select(Status::Open, last);
        app.selection.ensure_visible(app.columns.get(Status::Open), page);
        let scroll = app.selection.get(Status::Open).scroll;
        assert!(scroll > 0);

        let column = app.columns.get(Status::Open).clone();
        let ghost_row = column.rows.iter().position(|r| r.ghost).unwrap();
        assert!(ghost_row >= scroll && ghost_row < scroll + page);

        for rendered in scroll..column.rows.len().min(scroll + page) {
            let row = column.rows[rendered];
            if row.ghost {
                continue;
            }
            app.focus = Status::Closed;
            let y = rendered - app.selection.get(Status::Open).scroll;
            left_click(&mut app, 0, y);
            assert_eq!(app.focus, Status::Open);
            assert_eq!(app.selected_index(), Some(row.issue), "rendered row {rendered}");
        }

        app.selection.select(Status::Open, last);
        app.selection.ensure_visible(app.columns.get(Status::Open), page);
        let scroll = app.selection.get(Status::Open).scroll;
        left_click(&mut app, 0, ghost_row - scroll);
        assert_eq!(app.focus, Status::Closed);
        assert_eq!(app.selected_id().as_deref(), Some("bd-90"));
    }

    #[test]
    fn wheel_moves_selection_in_column_under_pointer() {
        let mut app = loaded_app(THREE_OPEN);
        let (x, y) = app.geometry.cell_for(0, 0);
        handle_mouse(&mut app, mouse(MouseEventKind::ScrollDown, x, y));
        assert_eq!(app.selection.get(Status::Open).selected, 1);
        handle_mouse(&mut app, mouse(MouseEventKind::ScrollUp, x, y));
        assert_eq!(app.selection.get(Status::Open).selected, 0);
    }

    #[test]
    fn wheel_scrolls_details() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Details(DetailsState::new("bd-1"));
        handle_mouse(&mut app, mouse(MouseEventKind::ScrollDown, 10, 10));
        assert!(matches!(app.mode, ModeState::Details(ref d) if d.scroll == WHEEL_LINES));
    }
}
