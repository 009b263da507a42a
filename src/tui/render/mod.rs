pub mod board_view;
pub mod detail_view;
pub mod dialog;
pub mod form_view;
pub mod header_bar;
pub mod help_overlay;
mod helpers;
pub mod picker;
pub mod status_row;

use ratatui::Frame;
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use regex::{Regex, RegexBuilder};

use super::app::App;
use super::layout::{BoardGeometry, screen_areas};
use super::state::ModeState;

/// Main render function: board underneath, then the active overlay.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let (header, board, status) = screen_areas(area);

    // Mouse hit-testing reads the geometry of the last frame drawn.
    let geometry = BoardGeometry::new(board);
    if geometry != app.geometry {
        app.geometry = geometry;
        let page = app.items_per_page();
        app.selection.ensure_all_visible(&app.columns, page);
    }

    header_bar::render_header_bar(frame, app, header);
    board_view::render_board(frame, app, board);

    match app.mode {
        ModeState::Board | ModeState::Search { .. } => {}
        ModeState::Details(ref details) => detail_view::render_details(frame, app, details, board),
        ModeState::Help { scroll } => help_overlay::render_help_overlay(frame, app, scroll, area),
        ModeState::Filter(ref form) => form_view::render_filter_form(frame, app, form, area),
        ModeState::Create(ref form) | ModeState::Edit(ref form) => {
            form_view::render_issue_form(frame, app, form, area)
        }
        ModeState::Prompt(ref prompt) => dialog::render_prompt(frame, app, prompt, area),
        ModeState::ParentPicker(ref picker) => {
            picker::render_parent_picker(frame, app, picker, area)
        }
        ModeState::TmuxPicker(ref picker) => picker::render_tmux_picker(frame, app, picker, area),
        ModeState::DepList(ref list) => dialog::render_dep_list(frame, app, list, area),
        ModeState::ConfirmDelete { ref id, ref preview } => {
            dialog::render_confirm_delete(frame, app, id, preview.as_ref(), area)
        }
        ModeState::ConfirmClosedParentCreate { ref parent } => {
            dialog::render_confirm_closed_parent(frame, app, parent, area)
        }
    }

    status_row::render_status_row(frame, app, status);
}

/// Case-insensitive literal matcher for the active search, if any.
pub(super) fn search_regex(search: &str) -> Option<Regex> {
    let needle = search.trim();
    if needle.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let Some(re) = search_re else {
        spans.push(Span::styled(text.to_string(), base_style));
        return;
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() > last_end {
            spans.push(Span::styled(text[last_end..m.start()].to_string(), base_style));
        }
        spans.push(Span::styled(m.as_str().to_string(), highlight_style));
        last_end = m.end();
    }
    if last_end < text.len() || text.is_empty() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::*;

    #[test]
    fn highlight_splits_on_case_insensitive_matches() {
        let re = search_regex("LOG");
        let base = Style::default();
        let hi = Style::default().fg(Color::Red);
        let mut spans = Vec::new();
        push_highlighted_spans(&mut spans, "fix login log", base, hi, re.as_ref());
        let parts: Vec<(&str, bool)> = spans
            .iter()
            .map(|s| (s.content.as_ref(), s.style == hi))
            .collect();
        assert_eq!(
            parts,
            vec![("fix ", false), ("log", true), ("in ", false), ("log", true)]
        );
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let re = search_regex("a.b").unwrap();
        assert!(re.is_match("xa.by"));
        assert!(!re.is_match("axb"));
        assert!(search_regex("   ").is_none());
    }
}
