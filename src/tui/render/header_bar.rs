use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;

use crate::tui::app::App;

use super::helpers::with_right_hint;

/// Top row: board name on the left; sort, search, filter and backend state
/// on the right.
pub fn render_header_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let bg_style = Style::default().bg(bg);

    let mut left = vec![Span::styled(
        " beadboard",
        Style::default()
            .fg(theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    if !app.title.is_empty() {
        left.push(Span::styled(
            format!(" \u{00B7} {}", app.title),
            Style::default().fg(theme.text_bright).bg(bg),
        ));
    }
    if app.loaded {
        left.push(Span::styled(
            format!("  {} issues", app.issues.len()),
            Style::default().fg(theme.dim).bg(bg),
        ));
    }
    if app.load_error.is_some() {
        left.push(Span::styled(
            "  \u{26A0} backend unreachable",
            Style::default().fg(theme.red).bg(bg),
        ));
    }

    let mut right = Vec::new();
    if !app.search.is_empty() {
        right.push(format!("/{}", app.search));
    }
    if !app.filter.is_empty() {
        right.push(app.filter.summary());
    }
    right.push(format!("sort: {}", app.sort_mode.label()));
    let hint = format!("{} ", right.join("  "));

    let line = with_right_hint(
        left,
        &hint,
        area.width as usize,
        bg_style,
        Style::default().fg(theme.dim).bg(bg),
    );
    frame.render_widget(Paragraph::new(line).style(bg_style), area);
}

#[cfg(test)]
mod tests {
    use crate::model::Filter;
    use crate::tui::test_helpers::*;

    #[test]
    fn header_shows_title_count_and_active_filters() {
        let mut app = loaded_app(THREE_OPEN);
        app.title = "myproj".into();
        app.search = "docs".into();
        app.filter = Filter {
            priority: Some(1),
            ..Default::default()
        };
        let out = render_app(&mut app);
        let header = out.lines().next().unwrap();
        assert!(header.contains("beadboard \u{00B7} myproj"));
        assert!(header.contains("3 issues"));
        assert!(header.contains("/docs"));
        assert!(header.contains("p1"));
        assert!(header.contains("sort:"));
    }
}
