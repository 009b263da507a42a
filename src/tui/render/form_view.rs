use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::tui::app::App;
use crate::tui::form::{FormField, FormTarget, IssueForm};
use crate::tui::state::{FilterField, FilterForm};
use crate::tui::text_input::TextInput;
use crate::util::unicode;

use super::helpers::{centered_rect, fixed_rect, popup_block};

/// Width of the label column, including padding
const LABEL_WIDTH: u16 = 13;

/// Create/Edit form: one row per field, description below.
pub fn render_issue_form(frame: &mut Frame, app: &App, form: &IssueForm, area: Rect) {
    let popup = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup);

    let title = match form.target {
        FormTarget::Create { blocker: None } => "New issue".to_string(),
        FormTarget::Create {
            blocker: Some(ref b),
        } => format!("New issue blocked by {b}"),
        FormTarget::Edit { ref id } => format!("Edit {id}"),
    };
    let block = popup_block(app, title);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let value_width = inner.width.saturating_sub(LABEL_WIDTH) as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor = None;

    for field in FormField::ALL {
        let focused = form.field == field;
        if field == FormField::Description {
            lines.push(Line::from(""));
            lines.push(label_line(app, field.label(), focused, ""));
            let first = lines.len();
            for text in form.description.text.split('\n') {
                lines.push(Line::from(Span::styled(
                    format!(" {}", unicode::truncate_to_width(text, inner.width.saturating_sub(1) as usize)),
                    value_style(app, focused),
                )));
            }
            if focused {
                let (line, col) = form.description.cursor_position();
                cursor = Some((1 + col as u16, (first + line) as u16));
            }
            continue;
        }

        let mut value = form.value(field);
        if field.is_choice() {
            value = format!("\u{2039} {value} \u{203A}");
        }
        let value = unicode::truncate_to_width(&value, value_width);
        if focused && !field.is_choice() {
            cursor = Some((LABEL_WIDTH + input_col(form_input(form, field)), lines.len() as u16));
        }
        lines.push(label_line(app, field.label(), focused, &value));
    }

    if let Some((x, y)) = cursor
        && x < inner.width
        && y < inner.height
    {
        frame.set_cursor_position(Position::new(inner.x + x, inner.y + y));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Filter form: text fields for assignee and label, cycled choices for
/// the rest.
pub fn render_filter_form(frame: &mut Frame, app: &App, form: &FilterForm, area: Rect) {
    let popup = fixed_rect(50, FilterField::ALL.len() as u16 + 4, area);
    frame.render_widget(Clear, popup);
    let block = popup_block(app, "Filter");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines = vec![Line::from(Span::styled(
        " empty or \"any\" matches everything",
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    ))];
    for field in FilterField::ALL {
        let focused = form.field == field;
        let value = match field {
            FilterField::Assignee | FilterField::Label => form.value(field),
            _ => format!("\u{2039} {} \u{203A}", form.value(field)),
        };
        if focused {
            let input = match field {
                FilterField::Assignee => Some(&form.assignee),
                FilterField::Label => Some(&form.label),
                _ => None,
            };
            if let Some(input) = input {
                let y = inner.y + lines.len() as u16;
                let x = inner.x + LABEL_WIDTH + input_col(input);
                if x < inner.right() && y < inner.bottom() {
                    frame.set_cursor_position(Position::new(x, y));
                }
            }
        }
        lines.push(label_line(app, field.label(), focused, &value));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn form_input(form: &IssueForm, field: FormField) -> &TextInput {
    match field {
        FormField::Assignee => &form.assignee,
        FormField::Labels => &form.labels,
        FormField::Parent => &form.parent,
        _ => &form.title,
    }
}

fn input_col(input: &TextInput) -> u16 {
    unicode::byte_offset_to_display_col(&input.text, input.cursor) as u16
}

fn value_style(app: &App, focused: bool) -> Style {
    let fg = if focused {
        app.theme.text_bright
    } else {
        app.theme.text
    };
    Style::default().fg(fg).bg(app.theme.background)
}

fn label_line<'a>(app: &App, label: &str, focused: bool, value: &str) -> Line<'a> {
    let bg = app.theme.background;
    let marker = if focused { "\u{25B8}" } else { " " };
    let mut label_style = Style::default().fg(app.theme.dim).bg(bg);
    if focused {
        label_style = label_style
            .fg(app.theme.highlight)
            .add_modifier(Modifier::BOLD);
    }
    Line::from(vec![
        Span::styled(
            format!("{marker}{:<width$}", label, width = LABEL_WIDTH as usize - 1),
            label_style,
        ),
        Span::styled(value.to_string(), value_style(app, focused)),
    ])
}

#[cfg(test)]
mod tests {
    use crate::model::IssueDraft;
    use crate::tui::form::IssueForm;
    use crate::tui::state::{FilterForm, ModeState};
    use crate::tui::test_helpers::*;

    #[test]
    fn edit_form_shows_fields_and_values() {
        let mut app = loaded_app(THREE_OPEN);
        let issue = app.issue("bd-2").unwrap().clone();
        app.mode = ModeState::Edit(IssueForm::edit("bd-2", &IssueDraft::from_issue(&issue)));
        let out = render_app(&mut app);
        assert!(out.contains("Edit bd-2"));
        assert!(out.contains("Fix login"));
        assert!(out.contains("\u{2039} Open \u{203A}"));
        assert!(out.contains("\u{2039} P2 \u{203A}"));
        assert!(out.contains("Description"));
    }

    #[test]
    fn filter_form_shows_any_for_unset_choices() {
        let mut app = loaded_app(THREE_OPEN);
        app.mode = ModeState::Filter(FilterForm::from_filter(&app.filter));
        let out = render_app(&mut app);
        assert!(out.contains("Filter"));
        assert!(out.contains("\u{2039} any \u{203A}"));
        assert!(out.contains("Assignee"));
    }
}
