use std::collections::HashMap;

use crate::model::{Issue, Status};
use crate::ops::columns::{Column, Columns};

/// Selection and scroll state for one column.
///
/// `selected` indexes the column's real issues; `scroll` is measured in
/// rendered rows, ghosts included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnCursor {
    pub selected: usize,
    pub scroll: usize,
}

/// Per-status cursors, remembered independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    cursors: [ColumnCursor; 4],
}

/// Selected issue id of every column, captured before a recompute.
pub type Remembered = [Option<String>; 4];

impl Selection {
    pub fn get(&self, status: Status) -> ColumnCursor {
        self.cursors[status.column_index()]
    }

    pub fn get_mut(&mut self, status: Status) -> &mut ColumnCursor {
        &mut self.cursors[status.column_index()]
    }

    /// Snapshot index of the selected issue in `status`.
    pub fn selected_issue(&self, columns: &Columns, status: Status) -> Option<usize> {
        columns.get(status).issues.get(self.get(status).selected).copied()
    }

    pub fn select(&mut self, status: Status, index: usize) {
        self.get_mut(status).selected = index;
    }

    /// Move the selection by `delta` real rows, clamped to the column.
    pub fn move_by(&mut self, column: &Column, delta: isize) {
        let len = column.len();
        let cur = self.get_mut(column.status);
        if len == 0 {
            cur.selected = 0;
            return;
        }
        let target = cur.selected as isize + delta;
        cur.selected = target.clamp(0, len as isize - 1) as usize;
    }

    pub fn select_first(&mut self, status: Status) {
        self.get_mut(status).selected = 0;
    }

    pub fn select_last(&mut self, column: &Column) {
        self.get_mut(column.status).selected = column.len().saturating_sub(1);
    }

    /// Keep the selected rendered row inside the viewport:
    /// `scroll <= row < scroll + items_per_page`.
    pub fn ensure_visible(&mut self, column: &Column, items_per_page: usize) {
        let cur = self.get_mut(column.status);
        if column.is_empty() {
            *cur = ColumnCursor::default();
            return;
        }
        cur.selected = cur.selected.min(column.len() - 1);
        let page = items_per_page.max(1);
        let row = column.rendered_row_of_selection(cur.selected).unwrap_or(0);
        if row < cur.scroll {
            cur.scroll = row;
        } else if row >= cur.scroll + page {
            cur.scroll = row + 1 - page;
        }
        let max_scroll = column.rows.len().saturating_sub(page);
        cur.scroll = cur.scroll.min(max_scroll);
    }

    pub fn ensure_all_visible(&mut self, columns: &Columns, items_per_page: usize) {
        for column in columns.iter() {
            self.ensure_visible(column, items_per_page);
        }
    }

    /// Scroll the viewport by whole rows, dragging the selection along when
    /// it would fall off screen.
    pub fn scroll_by(&mut self, column: &Column, delta: isize, items_per_page: usize) {
        let page = items_per_page.max(1);
        let max_scroll = column.rows.len().saturating_sub(page);
        let cur = self.get_mut(column.status);
        cur.scroll = (cur.scroll as isize + delta).clamp(0, max_scroll as isize) as usize;
        let (top, bottom) = (cur.scroll, cur.scroll + page);
        let row = column.rendered_row_of_selection(cur.selected).unwrap_or(0);
        if row < top || row >= bottom {
            let pick = column
                .issues
                .iter()
                .enumerate()
                .filter_map(|(i, &issue)| column.rendered_row_of(issue).map(|r| (i, r)))
                .find(|&(_, r)| (top..bottom).contains(&r))
                .map(|(i, _)| i);
            if let Some(i) = pick {
                cur.selected = i;
            }
        }
        self.ensure_visible(column, items_per_page);
    }

    /// Capture each column's selected issue id.
    pub fn remember(&self, columns: &Columns, issues: &[Issue]) -> Remembered {
        let mut out: Remembered = Default::default();
        for status in Status::ALL {
            out[status.column_index()] = self
                .selected_issue(columns, status)
                .and_then(|i| issues.get(i))
                .map(|issue| issue.id.clone());
        }
        out
    }

    /// Re-resolve selections by id after the columns were rebuilt. Columns
    /// whose issue vanished keep their index, clamped.
    pub fn restore(&mut self, columns: &Columns, index: &HashMap<String, usize>, remembered: &Remembered) {
        for status in Status::ALL {
            let column = columns.get(status);
            let found = remembered[status.column_index()]
                .as_ref()
                .and_then(|id| index.get(id))
                .and_then(|&i| column.selection_index_of(i));
            let cur = self.get_mut(status);
            match found {
                Some(i) => cur.selected = i,
                None => cur.selected = cur.selected.min(column.len().saturating_sub(1)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Filter, SortMode};
    use crate::ops::columns::compute_columns;

    fn issue(id: &str, parent: Option<&str>, status: Status) -> Issue {
        let mut i = Issue::new(id, id);
        i.status = status;
        i.parent = parent.map(str::to_string);
        i.derive_display();
        i
    }

    fn columns(issues: &[Issue]) -> Columns {
        compute_columns(issues, "", &Filter::default(), SortMode::StatusDateOnly)
    }

    fn index(issues: &[Issue]) -> HashMap<String, usize> {
        issues.iter().enumerate().map(|(i, x)| (x.id.clone(), i)).collect()
    }

    fn open_issues(n: usize) -> Vec<Issue> {
        (0..n).map(|i| issue(&format!("a{i:02}"), None, Status::Open)).collect()
    }

    #[test]
    fn viewport_follows_selection_down_and_up() {
        let issues = open_issues(20);
        let cols = columns(&issues);
        let open = cols.get(Status::Open);
        let mut sel = Selection::default();

        sel.move_by(open, 7);
        sel.ensure_visible(open, 5);
        assert_eq!(sel.get(Status::Open), ColumnCursor { selected: 7, scroll: 3 });

        sel.move_by(open, -6);
        sel.ensure_visible(open, 5);
        assert_eq!(sel.get(Status::Open), ColumnCursor { selected: 1, scroll: 1 });
    }

    #[test]
    fn invariant_holds_for_every_position() {
        let issues = open_issues(13);
        let cols = columns(&issues);
        let open = cols.get(Status::Open);
        for page in 1..6 {
            let mut sel = Selection::default();
            for step in [3isize, 5, -2, 9, -13, 13, -1] {
                sel.move_by(open, step);
                sel.ensure_visible(open, page);
                let cur = sel.get(Status::Open);
                let row = open.rendered_row_of_selection(cur.selected).unwrap();
                assert!(cur.scroll <= row && row < cur.scroll + page, "page {page}: {cur:?}");
            }
        }
    }

    #[test]
    fn ghost_rows_count_toward_scroll() {
        // Closed parent shows as a ghost above its open child.
        let issues = vec![
            issue("p", None, Status::Closed),
            issue("c", Some("p"), Status::Open),
        ];
        let cols = columns(&issues);
        let open = cols.get(Status::Open);
        assert_eq!(open.rows.len(), 2);
        let mut sel = Selection::default();
        sel.get_mut(Status::Open).scroll = 5;
        sel.ensure_visible(open, 1);
        // The real row is rendered row 1, behind the ghost.
        assert_eq!(sel.get(Status::Open), ColumnCursor { selected: 0, scroll: 1 });
    }

    #[test]
    fn empty_column_resets_cursor() {
        let cols = columns(&[]);
        let mut sel = Selection::default();
        *sel.get_mut(Status::Blocked) = ColumnCursor { selected: 4, scroll: 2 };
        sel.ensure_visible(cols.get(Status::Blocked), 5);
        assert_eq!(sel.get(Status::Blocked), ColumnCursor::default());
    }

    #[test]
    fn restore_tracks_issue_across_reorder() {
        let issues = open_issues(4);
        let cols = columns(&issues);
        let mut sel = Selection::default();
        sel.select(Status::Open, 2);
        let remembered = sel.remember(&cols, &issues);
        assert_eq!(remembered[0].as_deref(), Some("a02"));

        // a00 and a01 vanish; a02 is now first.
        let after: Vec<Issue> = issues[2..].to_vec();
        let cols = columns(&after);
        sel.restore(&cols, &index(&after), &remembered);
        assert_eq!(sel.get(Status::Open).selected, 0);
    }

    #[test]
    fn restore_clamps_when_issue_vanishes() {
        let issues = open_issues(4);
        let cols = columns(&issues);
        let mut sel = Selection::default();
        sel.select(Status::Open, 3);
        let remembered = sel.remember(&cols, &issues);

        let after: Vec<Issue> = issues[..2].to_vec();
        let cols = columns(&after);
        sel.restore(&cols, &index(&after), &remembered);
        assert_eq!(sel.get(Status::Open).selected, 1);
    }

    #[test]
    fn scroll_by_drags_selection_into_view() {
        let issues = open_issues(20);
        let cols = columns(&issues);
        let open = cols.get(Status::Open);
        let mut sel = Selection::default();
        sel.scroll_by(open, 10, 5);
        let cur = sel.get(Status::Open);
        assert_eq!(cur.scroll, 10);
        assert_eq!(cur.selected, 10);
    }
}
