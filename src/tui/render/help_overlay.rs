use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::tui::app::App;

use super::helpers::{centered_rect, popup_block};

const BOARD_KEYS: &[(&str, &str)] = &[
    ("\u{2190}\u{2192}/hl", "Previous/next column"),
    ("\u{2191}\u{2193}/jk", "Move selection"),
    ("g/G", "First/last issue"),
    ("PgUp/PgDn", "Page up/down"),
    ("Enter", "Issue details"),
    ("/", "Search"),
    ("f / F", "Filter / clear search and filters"),
    ("r", "Refresh now"),
];

const ISSUE_KEYS: &[(&str, &str)] = &[
    ("n", "New issue"),
    ("a", "New child of selected"),
    ("b", "New issue blocked by selected"),
    ("C", "Clone selected into a new issue"),
    ("e / E", "Edit in form / in $EDITOR"),
    ("s / S", "Status forward / back"),
    ("c / o", "Close / reopen"),
    ("D", "Delete (with preview)"),
    ("B / U", "Add / remove blocker"),
    ("y", "Copy id to clipboard"),
    ("t", "Send id to a tmux pane"),
];

const LEADER_KEYS: &[(&str, &str)] = &[
    ("Space p", "Choose parent"),
    ("Space P", "Clear parent"),
    ("Space d", "List dependencies"),
    ("Space s", "Toggle sort: priority / updated"),
];

const FORM_KEYS: &[(&str, &str)] = &[
    ("Tab/S-Tab", "Next/previous field"),
    ("\u{2190}\u{2192}", "Cycle status, priority, type"),
    ("Ctrl-S", "Save"),
    ("Ctrl-E", "Edit in $EDITOR"),
    ("Esc", "Save if titled, else cancel"),
];

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, scroll: u16, area: Rect) {
    let overlay_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    for (heading, keys) in [
        ("Board", BOARD_KEYS),
        ("Issues", ISSUE_KEYS),
        ("Leader", LEADER_KEYS),
        ("Forms", FORM_KEYS),
    ] {
        lines.push(Line::from(Span::styled(format!(" {heading}"), header_style)));
        for (key, desc) in keys {
            add_binding(&mut lines, key, desc, key_style, desc_style);
        }
        lines.push(Line::from(""));
    }
    add_binding(&mut lines, "?/Esc", "Close help", key_style, desc_style);
    add_binding(&mut lines, "q", "Quit", key_style, desc_style);

    let paragraph = Paragraph::new(lines)
        .block(popup_block(app, "Key Bindings"))
        .scroll((scroll, 0));
    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 14;
    let padded_key = format!("  {:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

#[cfg(test)]
mod tests {
    use crate::tui::state::ModeState;
    use crate::tui::test_helpers::*;

    #[test]
    fn help_lists_leader_bindings() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Help { scroll: 0 };
        let out = render_app(&mut app);
        assert!(out.contains("Key Bindings"));
        assert!(out.contains("Previous/next column"));
    }

    #[test]
    fn scrolled_help_drops_first_rows() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Help { scroll: 12 };
        let out = render_app(&mut app);
        assert!(!out.contains("Previous/next column"));
        assert!(out.contains("Choose parent") || out.contains("Clone selected"));
    }
}
