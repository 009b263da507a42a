//! Screen geometry shared by the board renderer and the mouse mapper.
//!
//! Screen: header bar (1 row), board, status row (1 row). The board holds
//! four bordered panels side by side separated by a gap. Inside each panel
//! the first `HEADER_ROWS` rows are the summary line and a divider; issue
//! rows follow.

use ratatui::layout::Rect;

use crate::model::Status;

/// Summary line plus divider inside each panel
pub const HEADER_ROWS: u16 = 2;
/// Columns between adjacent panels
pub const COLUMN_GAP: u16 = 1;
/// Panels never shrink below this; extra panels are clipped instead.
pub const MIN_PANEL_WIDTH: u16 = 16;

/// Split the full screen into header bar, board and status row.
pub fn screen_areas(screen: Rect) -> (Rect, Rect, Rect) {
    let header = Rect {
        height: screen.height.min(1),
        ..screen
    };
    let status_h = if screen.height >= 2 { 1 } else { 0 };
    let board_h = screen.height.saturating_sub(header.height + status_h);
    let board = Rect {
        x: screen.x,
        y: screen.y + header.height,
        width: screen.width,
        height: board_h,
    };
    let status = Rect {
        x: screen.x,
        y: board.y + board_h,
        width: screen.width,
        height: status_h,
    };
    (header, board, status)
}

/// Panel placement for one board area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    pub area: Rect,
    pub panel_width: u16,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        BoardGeometry::for_screen(Rect::new(0, 0, 80, 24))
    }
}

impl BoardGeometry {
    pub fn new(area: Rect) -> Self {
        let panels = Status::ALL.len() as u16;
        let gaps = COLUMN_GAP * (panels - 1);
        let panel_width = (area.width.saturating_sub(gaps) / panels).max(MIN_PANEL_WIDTH);
        BoardGeometry { area, panel_width }
    }

    pub fn for_screen(screen: Rect) -> Self {
        BoardGeometry::new(screen_areas(screen).1)
    }

    /// Panel width plus the gap after it
    pub fn outer_width(&self) -> u16 {
        self.panel_width + COLUMN_GAP
    }

    /// Issue rows visible in each panel
    pub fn items_per_page(&self) -> usize {
        self.area.height.saturating_sub(2 + HEADER_ROWS) as usize
    }

    /// Rect of the panel for column `col`, clipped to the board. None when
    /// the panel is entirely off-screen.
    pub fn panel_rect(&self, col: usize) -> Option<Rect> {
        let offset = self.outer_width() as u32 * col as u32;
        if offset >= self.area.width as u32 {
            return None;
        }
        let x = self.area.x + offset as u16;
        let width = self.panel_width.min(self.area.right() - x);
        Some(Rect {
            x,
            y: self.area.y,
            width,
            height: self.area.height,
        })
    }

    /// Map a cell to `(column, row within the viewport)`. Borders, gaps,
    /// panel headers and anything outside the board map to None.
    pub fn hit(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        let a = self.area;
        if x < a.x || x >= a.right() || y < a.y || y >= a.bottom() {
            return None;
        }
        let rel_x = x - a.x;
        let col = (rel_x / self.outer_width()) as usize;
        if col >= Status::ALL.len() {
            return None;
        }
        let within = rel_x % self.outer_width();
        if within == 0 || within >= self.panel_width - 1 {
            return None;
        }

        let rel_y = y - a.y;
        // Top border, then the panel header rows.
        if rel_y < 1 + HEADER_ROWS {
            return None;
        }
        let row = (rel_y - 1 - HEADER_ROWS) as usize;
        if row >= self.items_per_page() {
            return None;
        }
        Some((col, row))
    }

    /// Column whose panel (borders and gap included) spans `x`, for wheel
    /// events anywhere over the board.
    pub fn column_at(&self, x: u16, y: u16) -> Option<usize> {
        let a = self.area;
        if x < a.x || x >= a.right() || y < a.y || y >= a.bottom() {
            return None;
        }
        let col = ((x - a.x) / self.outer_width()) as usize;
        (col < Status::ALL.len()).then_some(col)
    }

    /// First content cell of a viewport row; inverse of `hit`.
    pub fn cell_for(&self, col: usize, row: usize) -> (u16, u16) {
        let x = self.area.x + self.outer_width() * col as u16 + 1;
        let y = self.area.y + 1 + HEADER_ROWS + row as u16;
        (x, y)
    }
}
