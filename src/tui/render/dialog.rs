use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::tui::app::App;
use crate::tui::state::{DepListState, PromptState};
use crate::util::unicode;

use super::helpers::{centered_rect, fixed_rect, popup_block};

/// Single-line id prompt.
pub fn render_prompt(frame: &mut Frame, app: &App, prompt: &PromptState, area: Rect) {
    let popup = fixed_rect(56, 5, area);
    frame.render_widget(Clear, popup);
    let block = popup_block(app, prompt.title());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let bg = app.theme.background;
    let lines = vec![
        Line::from(Span::styled(
            " issue id:",
            Style::default().fg(app.theme.dim).bg(bg),
        )),
        Line::from(Span::styled(
            format!(" {}", prompt.input.text),
            Style::default().fg(app.theme.text_bright).bg(bg),
        )),
    ];
    let col = 1 + unicode::byte_offset_to_display_col(&prompt.input.text, prompt.input.cursor) as u16;
    if col < inner.width && inner.height > 1 {
        frame.set_cursor_position(Position::new(inner.x + col, inner.y + 1));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Delete confirmation with the backend's dry-run preview.
pub fn render_confirm_delete(
    frame: &mut Frame,
    app: &App,
    id: &str,
    preview: Option<&Result<String, String>>,
    area: Rect,
) {
    let popup = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup);
    let block = popup_block(app, format!("Delete {id}?"));

    let theme = &app.theme;
    let bg = theme.background;
    let dim = Style::default().fg(theme.dim).bg(bg);
    let mut lines: Vec<Line> = match preview {
        None => vec![Line::from(Span::styled(" fetching preview\u{2026}", dim))],
        Some(Ok(text)) => text
            .lines()
            .map(|l| Line::from(Span::styled(format!(" {l}"), Style::default().fg(theme.text).bg(bg))))
            .collect(),
        Some(Err(e)) => vec![Line::from(Span::styled(
            format!(" preview failed: {e}"),
            Style::default().fg(theme.red).bg(bg),
        ))],
    };
    lines.push(Line::from(""));
    lines.push(choice_line(
        app,
        &[("y", "delete"), ("c", "cascade"), ("f", "force"), ("n", "cancel")],
    ));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}

pub fn render_confirm_closed_parent(frame: &mut Frame, app: &App, parent: &str, area: Rect) {
    let popup = fixed_rect(60, 7, area);
    frame.render_widget(Clear, popup);
    let block = popup_block(app, "Parent is closed");

    let text = Style::default().fg(app.theme.text).bg(app.theme.background);
    let title = app.issue(parent).map_or("", |i| i.title.as_str());
    let lines = vec![
        Line::from(Span::styled(format!(" {parent} {title}"), text)),
        Line::from(Span::styled(
            " is closed. Reopen it as in progress and add a child?",
            text,
        )),
        Line::from(""),
        choice_line(app, &[("y", "reopen and create"), ("n", "cancel")]),
    ];
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}

/// Dependency listing text from the backend.
pub fn render_dep_list(frame: &mut Frame, app: &App, list: &DepListState, area: Rect) {
    let popup = centered_rect(70, 70, area);
    frame.render_widget(Clear, popup);
    let block = popup_block(app, format!("Dependencies of {}", list.id));

    let theme = &app.theme;
    let bg = theme.background;
    let lines: Vec<Line> = match list.text {
        None => vec![Line::from(Span::styled(
            " loading\u{2026}",
            Style::default().fg(theme.dim).bg(bg),
        ))],
        Some(Ok(ref text)) if text.trim().is_empty() => vec![Line::from(Span::styled(
            " (no dependencies)",
            Style::default().fg(theme.dim).bg(bg),
        ))],
        Some(Ok(ref text)) => text
            .lines()
            .map(|l| Line::from(Span::styled(format!(" {l}"), Style::default().fg(theme.text).bg(bg))))
            .collect(),
        Some(Err(ref e)) => vec![Line::from(Span::styled(
            format!(" {e}"),
            Style::default().fg(theme.red).bg(bg),
        ))],
    };
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((list.scroll, 0));
    frame.render_widget(paragraph, popup);
}

fn choice_line<'a>(app: &App, choices: &[(&str, &str)]) -> Line<'a> {
    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.dim).bg(bg);
    let mut spans = Vec::new();
    for (key, desc) in choices {
        spans.push(Span::styled(format!(" {key}"), key_style));
        spans.push(Span::styled(format!(" {desc} "), desc_style));
    }
    Line::from(spans)
}
