use chrono::{DateTime, Local, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::model::Issue;
use crate::tui::app::App;
use crate::tui::state::DetailsState;

use super::helpers::{popup_block, priority_badge};

/// Width of the field-name column
const LABEL_WIDTH: usize = 10;

/// Read-only view of one issue, drawn over the board.
pub fn render_details(frame: &mut Frame, app: &App, details: &DetailsState, area: Rect) {
    let Some(issue) = app.issue(&details.id) else {
        return;
    };
    frame.render_widget(Clear, area);

    let lines = detail_lines(app, issue);
    let block = popup_block(app, &issue.id);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((details.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn detail_lines<'a>(app: &App, issue: &Issue) -> Vec<Line<'a>> {
    let theme = &app.theme;
    let bg = theme.background;
    let label_style = Style::default().fg(theme.dim).bg(bg);
    let value_style = Style::default().fg(theme.text).bg(bg);
    let header_style = Style::default()
        .fg(theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let field = |name: &str, value: String, style: Style| {
        Line::from(vec![
            Span::styled(format!(" {:<width$}", name, width = LABEL_WIDTH), label_style),
            Span::styled(value, style),
        ])
    };
    let title_of = |id: &str| {
        app.issue(id)
            .map_or_else(|| id.to_string(), |i| format!("{}  {}", i.id, i.title))
    };

    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", issue.title), header_style)),
        Line::from(""),
    ];

    let mut status = issue.status.label().to_string();
    if issue.display != issue.status {
        status.push_str(&format!(" (shown as {})", issue.display.label()));
    }
    lines.push(field(
        "Status",
        status,
        value_style.fg(theme.status_color(issue.display)),
    ));
    lines.push(field(
        "Priority",
        priority_badge(issue.priority),
        value_style.fg(theme.priority_color(issue.priority)),
    ));
    lines.push(field("Type", issue.issue_type.clone(), value_style));
    if !issue.assignee.is_empty() {
        lines.push(field("Assignee", issue.assignee.clone(), value_style));
    }
    if !issue.labels.is_empty() {
        lines.push(field("Labels", issue.labels_joined(), value_style.fg(theme.purple)));
    }
    if let Some(ref parent) = issue.parent {
        lines.push(field("Parent", title_of(parent), value_style));
    }
    for (name, ids) in [
        ("Children", &issue.children),
        ("Blocked by", &issue.blocked_by),
        ("Blocks", &issue.blocks),
    ] {
        for (i, id) in ids.iter().enumerate() {
            let name = if i == 0 { name } else { "" };
            lines.push(field(name, title_of(id), value_style));
        }
    }
    for (name, at) in [
        ("Created", issue.created_at),
        ("Updated", issue.updated_at),
        ("Closed", issue.closed_at),
    ] {
        if let Some(at) = at {
            lines.push(field(name, format_time(at), label_style));
        }
    }

    lines.push(Line::from(""));
    if issue.description.trim().is_empty() {
        lines.push(Line::from(Span::styled(" (no description)", label_style)));
    } else {
        for text in issue.description.lines() {
            lines.push(Line::from(Span::styled(format!(" {text}"), value_style)));
        }
    }
    lines
}

fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
