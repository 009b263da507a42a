use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, ToastKind};
use crate::tui::state::{Mode, ModeState};
use crate::util::unicode;

use super::helpers::with_right_hint;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let bg_style = Style::default().bg(bg);
    let dim_style = Style::default().fg(theme.dim).bg(bg);
    let width = area.width as usize;

    let line = if let ModeState::Search { ref input, .. } = app.mode {
        // Search prompt: /pattern with the terminal cursor inside it
        let spans = vec![Span::styled(
            format!("/{}", input.text),
            Style::default().fg(theme.text_bright).bg(bg),
        )];
        let col = 1 + unicode::byte_offset_to_display_col(&input.text, input.cursor);
        if col < width {
            frame.set_cursor_position(Position::new(area.x + col as u16, area.y));
        }
        with_right_hint(spans, "Enter keep  Esc cancel ", width, bg_style, dim_style)
    } else if let Some(ref toast) = app.toast {
        let fg = match toast.kind {
            ToastKind::Info => theme.text_bright,
            ToastKind::Error => theme.red,
        };
        let text = unicode::truncate_to_width(&format!(" {}", toast.text), width);
        Line::from(Span::styled(
            text,
            Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
        ))
    } else if app.leader {
        Line::from(Span::styled(
            " SPC  p parent  P clear parent  d deps  s sort",
            Style::default().fg(theme.highlight).bg(bg),
        ))
    } else {
        with_right_hint(Vec::new(), mode_hint(app.mode_kind()), width, bg_style, dim_style)
    };

    let paragraph = Paragraph::new(line).style(bg_style);
    frame.render_widget(paragraph, area);
}

/// Key reminder for the right side of the status row
fn mode_hint(mode: Mode) -> &'static str {
    match mode {
        Mode::Board => "? help  / search  f filter  n new  q quit ",
        Mode::Details => "e edit  E editor  j/k scroll  Esc back ",
        Mode::Help | Mode::DepList => "j/k scroll  Esc close ",
        Mode::Search => "Enter keep  Esc cancel ",
        Mode::Filter => "Tab field  \u{2190}\u{2192} cycle  Enter apply  Esc cancel ",
        Mode::Create | Mode::Edit => "Tab field  Ctrl-S save  Ctrl-E editor  Esc save/cancel ",
        Mode::Prompt => "Enter confirm  Esc cancel ",
        Mode::ParentPicker => "type to filter  \u{2191}\u{2193} move  Enter pick  Esc cancel ",
        Mode::TmuxPicker => "j/k move  Enter send  m mark  Esc close ",
        Mode::ConfirmDelete => "y delete  c cascade  f force  n cancel ",
        Mode::ConfirmClosedParentCreate => "y reopen and create  n cancel ",
    }
}
