use std::collections::HashMap;

use ratatui::style::Color;

use crate::model::Status;

/// Board palette. Every entry can be overridden from `[colors]` in
/// `board.toml`.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    /// Focused column border, keys in help, active form field
    pub highlight: Color,
    pub dim: Color,
    pub border: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub purple: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    /// Ghost (context-only) ancestor rows
    pub ghost: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x14, 0x17, 0x1F),
            text: Color::Rgb(0xC8, 0xCE, 0xD9),
            text_bright: Color::Rgb(0xF2, 0xF4, 0xF8),
            highlight: Color::Rgb(0xF5, 0xA9, 0x3B),
            dim: Color::Rgb(0x7A, 0x82, 0x94),
            border: Color::Rgb(0x3A, 0x40, 0x4E),
            red: Color::Rgb(0xE8, 0x5D, 0x5D),
            yellow: Color::Rgb(0xE6, 0xC3, 0x4A),
            green: Color::Rgb(0x6C, 0xC6, 0x7E),
            cyan: Color::Rgb(0x5C, 0xB8, 0xE0),
            purple: Color::Rgb(0xB3, 0x8B, 0xE8),
            selection_bg: Color::Rgb(0x2B, 0x35, 0x4A),
            selection_fg: Color::Rgb(0xFF, 0xFF, 0xFF),
            ghost: Color::Rgb(0x58, 0x5F, 0x70),
        }
    }
}

/// `#RRGGBB` or the short `#RGB` form.
fn parse_hex_color(value: &str) -> Option<Color> {
    let digits = value.trim().strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        6 => Some(Color::Rgb(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        3 => {
            let expand = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
            Some(Color::Rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

impl Theme {
    /// Create a theme from `[colors]` overrides, falling back to defaults.
    /// Unknown names and malformed values are ignored.
    pub fn from_colors(colors: &HashMap<String, String>) -> Self {
        let mut theme = Theme::default();
        for (key, value) in colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::warn!(key = %key, value = %value, "ignoring malformed color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "border" => theme.border = color,
                "red" => theme.red = color,
                "yellow" => theme.yellow = color,
                "green" => theme.green = color,
                "cyan" => theme.cyan = color,
                "purple" => theme.purple = color,
                "selection_bg" => theme.selection_bg = color,
                "selection_fg" => theme.selection_fg = color,
                "ghost" => theme.ghost = color,
                _ => {}
            }
        }
        theme
    }

    /// Accent color of a status column
    pub fn status_color(&self, status: Status) -> Color {
        match status {
            Status::Open => self.cyan,
            Status::InProgress => self.highlight,
            Status::Blocked => self.red,
            Status::Closed => self.green,
        }
    }

    /// Color for a priority badge; P0 is loudest.
    pub fn priority_color(&self, priority: u8) -> Color {
        match priority {
            0 => self.red,
            1 => self.yellow,
            2 => self.text,
            _ => self.dim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_long_and_short() {
        assert_eq!(parse_hex_color("#1a2B3c"), Some(Color::Rgb(0x1A, 0x2B, 0x3C)));
        assert_eq!(parse_hex_color(" #f80 "), Some(Color::Rgb(0xFF, 0x88, 0x00)));
        assert_eq!(parse_hex_color("1a2b3c"), None);
        assert_eq!(parse_hex_color("#1a2b"), None);
        assert_eq!(parse_hex_color("#ggg"), None);
    }

    #[test]
    fn overrides_apply_by_name_and_skip_bad_values() {
        let defaults = Theme::default();
        let colors = HashMap::from([
            ("ghost".to_string(), "#123".to_string()),
            ("nonsense".to_string(), "#112233".to_string()),
            ("text".to_string(), "blue".to_string()),
        ]);

        let theme = Theme::from_colors(&colors);
        assert_eq!(theme.ghost, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.text, defaults.text);
        assert_eq!(theme.background, defaults.background);
    }

    #[test]
    fn columns_and_priorities_have_distinct_accents() {
        let theme = Theme::default();
        assert_eq!(theme.status_color(Status::InProgress), theme.highlight);
        assert_eq!(theme.status_color(Status::Blocked), theme.red);
        assert_eq!(theme.priority_color(0), theme.red);
        assert_eq!(theme.priority_color(4), theme.dim);
    }
}
