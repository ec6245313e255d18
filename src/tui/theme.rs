use indexmap::IndexMap;
use ratatui::style::Color;

use crate::model::UiConfig;
use crate::ops::theme_pref::ThemeMode;

/// Parsed color palette for the TUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub green: Color,
    pub selection_bg: Color,
    pub border: Color,
    pub search_match_bg: Color,
    pub search_match_fg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            background: Color::Rgb(0x25, 0x25, 0x25),
            text: Color::Rgb(0xF7, 0xF7, 0xF7),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0x6C, 0x63, 0xFF),
            dim: Color::Rgb(0x8A, 0x8A, 0x8A),
            red: Color::Rgb(0xFF, 0x5C, 0x5C),
            green: Color::Rgb(0x44, 0xDD, 0x88),
            selection_bg: Color::Rgb(0x3A, 0x36, 0x6E),
            border: Color::Rgb(0x53, 0x4C, 0xC2),
            search_match_bg: Color::Rgb(0x6C, 0x63, 0xFF),
            search_match_fg: Color::Rgb(0xF7, 0xF7, 0xF7),
        }
    }

    pub fn light() -> Self {
        Theme {
            background: Color::Rgb(0xF7, 0xF7, 0xF7),
            text: Color::Rgb(0x25, 0x25, 0x25),
            text_bright: Color::Rgb(0x00, 0x00, 0x00),
            highlight: Color::Rgb(0x6C, 0x63, 0xFF),
            dim: Color::Rgb(0x9A, 0x9A, 0x9A),
            red: Color::Rgb(0xD0, 0x30, 0x30),
            green: Color::Rgb(0x20, 0x99, 0x55),
            selection_bg: Color::Rgb(0xDD, 0xDB, 0xFF),
            border: Color::Rgb(0x53, 0x4C, 0xC2),
            search_match_bg: Color::Rgb(0x6C, 0x63, 0xFF),
            search_match_fg: Color::Rgb(0xF7, 0xF7, 0xF7),
        }
    }

    /// Palette for `mode` with the matching `[ui.dark]`/`[ui.light]`
    /// overrides applied. Unknown names and malformed colors are ignored.
    pub fn for_mode(mode: ThemeMode, ui: &UiConfig) -> Self {
        match mode {
            ThemeMode::Dark => Theme::dark().with_overrides(&ui.dark),
            ThemeMode::Light => Theme::light().with_overrides(&ui.light),
        }
    }

    fn with_overrides(mut self, colors: &IndexMap<String, String>) -> Self {
        for (key, value) in colors {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => self.background = color,
                "text" => self.text = color,
                "text_bright" => self.text_bright = color,
                "highlight" => self.highlight = color,
                "dim" => self.dim = color,
                "red" => self.red = color,
                "green" => self.green = color,
                "selection_bg" => self.selection_bg = color,
                "border" => self.border = color,
                "search_match_bg" => self.search_match_bg = color,
                "search_match_fg" => self.search_match_fg = color,
                _ => {}
            }
        }
        self
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#FF4444"),
            Some(Color::Rgb(0xFF, 0x44, 0x44))
        );
        assert_eq!(parse_hex_color("FF4444"), None); // missing #
        assert_eq!(parse_hex_color("#FF44"), None); // too short
        assert_eq!(parse_hex_color("#ZZZZZZ"), None);
        assert_eq!(parse_hex_color("#ÿÿÿ"), None);
    }

    #[test]
    fn modes_have_distinct_backgrounds() {
        let ui = UiConfig::default();
        assert_ne!(
            Theme::for_mode(ThemeMode::Dark, &ui).background,
            Theme::for_mode(ThemeMode::Light, &ui).background
        );
    }

    #[test]
    fn overrides_apply_to_their_own_palette_only() {
        let mut ui = UiConfig::default();
        ui.dark.insert("highlight".into(), "#FB4196".into());
        ui.dark.insert("nonsense".into(), "#000000".into());
        ui.dark.insert("text".into(), "blue".into());

        let dark = Theme::for_mode(ThemeMode::Dark, &ui);
        assert_eq!(dark.highlight, Color::Rgb(0xFB, 0x41, 0x96));
        assert_eq!(dark.text, Theme::dark().text);

        let light = Theme::for_mode(ThemeMode::Light, &ui);
        assert_eq!(light, Theme::light());
    }
}
