use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use regex::Regex;

use crate::model::{Issue, Status};
use crate::ops::columns::BoardRow;
use crate::tui::app::App;
use crate::util::unicode;

use super::helpers::{priority_badge, spans_width, with_right_hint};
use super::{push_highlighted_spans, search_regex};

/// Indent per tree level
const INDENT: usize = 2;

/// Render the four status panels.
pub fn render_board(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    if !app.loaded {
        let text = match app.load_error {
            Some(ref e) => format!(" could not load issues: {e}"),
            None => " loading issues\u{2026}".to_string(),
        };
        let placeholder = Paragraph::new(text).style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(placeholder, area);
        return;
    }

    let search_re = search_regex(&app.search);
    for status in Status::ALL {
        if let Some(rect) = app.geometry.panel_rect(status.column_index()) {
            render_column(frame, app, status, rect, search_re.as_ref());
        }
    }
}

fn render_column(frame: &mut Frame, app: &App, status: Status, rect: Rect, search_re: Option<&Regex>) {
    let theme = &app.theme;
    let bg = theme.background;
    let bg_style = Style::default().bg(bg);
    let dim_style = Style::default().fg(theme.dim).bg(bg);
    let focused = app.focus == status;
    let accent = theme.status_color(status);

    let border_fg = if focused { accent } else { theme.border };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_fg).bg(bg))
        .style(bg_style);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let column = app.columns.get(status);
    let cursor = app.selection.get(status);
    let width = inner.width as usize;
    let page = app.items_per_page();
    let mut lines: Vec<Line> = Vec::with_capacity(inner.height as usize);

    // Summary line: heading, count, and the visible window when scrolled
    let mut title_style = Style::default().fg(accent).bg(bg).add_modifier(Modifier::BOLD);
    if focused {
        title_style = title_style.add_modifier(Modifier::UNDERLINED);
    }
    let summary = vec![
        Span::styled(format!(" {}", status.label()), title_style),
        Span::styled(format!(" {}", column.len()), dim_style),
    ];
    let total = column.rows.len();
    let window = if total > page && page > 0 {
        let last = (cursor.scroll + page).min(total);
        format!("{}-{}/{} ", cursor.scroll + 1, last, total)
    } else {
        String::new()
    };
    lines.push(with_right_hint(summary, &window, width, bg_style, dim_style));
    lines.push(Line::from(Span::styled(
        "\u{2500}".repeat(width),
        Style::default().fg(theme.border).bg(bg),
    )));

    if column.rows.is_empty() {
        lines.push(Line::from(Span::styled(" (empty)", dim_style)));
    }

    let selected_row = column.rendered_row_of_selection(cursor.selected);
    for (row_idx, row) in column.rows.iter().enumerate().skip(cursor.scroll).take(page) {
        let issue = &app.issues[row.issue];
        let selected = !row.ghost && Some(row_idx) == selected_row;
        lines.push(issue_line(app, issue, row, selected, focused, width, search_re));
    }

    frame.render_widget(Paragraph::new(lines).style(bg_style), inner);
}

/// One board row: indent, priority badge, id, title. Ghost rows are dimmed
/// and carry no badge.
fn issue_line<'a>(
    app: &App,
    issue: &Issue,
    row: &BoardRow,
    selected: bool,
    focused: bool,
    width: usize,
    search_re: Option<&Regex>,
) -> Line<'a> {
    let theme = &app.theme;
    let row_bg = if selected && focused {
        theme.selection_bg
    } else {
        theme.background
    };
    let base = Style::default().bg(row_bg);
    let indent = " ".repeat(1 + row.depth * INDENT);

    if row.ghost {
        let ghost = base.fg(theme.ghost).add_modifier(Modifier::ITALIC);
        let text = format!("{indent}\u{2506} {} {}", issue.id, issue.title);
        return Line::from(Span::styled(unicode::truncate_to_width(&text, width), ghost));
    }

    let title_fg = if selected && focused {
        theme.selection_fg
    } else {
        theme.text
    };
    let mut title_style = base.fg(title_fg);
    if selected {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }
    let highlight = base.fg(theme.highlight).add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(indent, base),
        Span::styled(
            priority_badge(issue.priority),
            base.fg(theme.priority_color(issue.priority)),
        ),
        Span::styled(" ", base),
        Span::styled(issue.id.clone(), base.fg(theme.dim)),
        Span::styled(" ", base),
    ];
    let room = width.saturating_sub(spans_width(&spans));
    let title = unicode::truncate_to_width(&issue.title, room);
    push_highlighted_spans(&mut spans, &title, title_style, highlight, search_re);

    let used = spans_width(&spans);
    if used < width && selected && focused {
        spans.push(Span::styled(" ".repeat(width - used), base));
    }
    Line::from(spans)
}
