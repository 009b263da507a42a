use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::io::mux::Pane;
use crate::tui::app::App;
use crate::tui::state::{ParentPicker, TmuxPicker};
use crate::util::unicode;

use super::helpers::{centered_rect, popup_block};

/// First row of a `height`-row window that keeps `cursor` in view.
fn window_start(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    cursor.saturating_sub(height - 1)
}

fn row_style(app: &App, selected: bool) -> Style {
    let theme = &app.theme;
    if selected {
        Style::default()
            .fg(theme.selection_fg)
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text).bg(theme.background)
    }
}

pub fn render_parent_picker(frame: &mut Frame, app: &App, picker: &ParentPicker, area: Rect) {
    let popup = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup);
    let block = popup_block(app, format!("Parent for {}", picker.issue));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let theme = &app.theme;
    let bg = theme.background;
    let width = inner.width as usize;
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" > ", Style::default().fg(theme.highlight).bg(bg)),
            Span::styled(
                picker.query.text.clone(),
                Style::default().fg(theme.text_bright).bg(bg),
            ),
        ]),
        Line::from(Span::styled(
            "\u{2500}".repeat(width),
            Style::default().fg(theme.border).bg(bg),
        )),
    ];
    let col = 3 + unicode::byte_offset_to_display_col(&picker.query.text, picker.query.cursor) as u16;
    if col < inner.width {
        frame.set_cursor_position(Position::new(inner.x + col, inner.y));
    }

    let visible = picker.visible(&app.issues, &app.index);
    if visible.is_empty() {
        lines.push(Line::from(Span::styled(
            " no matching issues",
            Style::default().fg(theme.dim).bg(bg),
        )));
    }
    let height = (inner.height as usize).saturating_sub(2);
    let start = window_start(picker.cursor, height);
    for (i, &idx) in visible.iter().enumerate().skip(start).take(height) {
        let issue = &app.issues[idx];
        let text = format!(" {}  {}", issue.id, issue.title);
        lines.push(Line::from(Span::styled(
            unicode::fit_to_width(&text, width),
            row_style(app, i == picker.cursor),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

pub fn render_tmux_picker(frame: &mut Frame, app: &App, picker: &TmuxPicker, area: Rect) {
    let popup = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup);
    let block = popup_block(app, format!("Send {} to pane", picker.issue));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let dim = Style::default().fg(app.theme.dim).bg(app.theme.background);
    let width = inner.width as usize;
    let lines: Vec<Line> = match picker.panes {
        None => vec![Line::from(Span::styled(" listing panes\u{2026}", dim))],
        Some(ref panes) if panes.is_empty() => vec![Line::from(Span::styled(" no panes", dim))],
        Some(ref panes) => {
            let height = inner.height as usize;
            let start = window_start(picker.cursor, height);
            panes
                .iter()
                .enumerate()
                .skip(start)
                .take(height)
                .map(|(i, pane)| {
                    Line::from(Span::styled(
                        unicode::fit_to_width(&pane_label(pane), width),
                        row_style(app, i == picker.cursor),
                    ))
                })
                .collect()
        }
    };
    frame.render_widget(Paragraph::new(lines), inner);
}

/// `* work:%3  vim  notes (attached)`; the star marks the marked pane.
fn pane_label(pane: &Pane) -> String {
    let mark = if pane.marked { '*' } else { ' ' };
    let attached = if pane.attached { " (attached)" } else { "" };
    format!(
        "{mark} {}:{}  {}  {}{attached}",
        pane.session_name, pane.pane_id, pane.command, pane.title
    )
}
