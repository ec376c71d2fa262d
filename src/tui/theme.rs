use std::collections::HashMap;

use ratatui::style::Color;

use crate::model::config::UiConfig;
use crate::model::vocab::Tone;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    /// Badge colors for vocabulary and source tones
    pub tones: HashMap<Tone, Color>,
}

impl Default for Theme {
    fn default() -> Self {
        let tones = HashMap::from([
            (Tone::Gray, Color::Rgb(0x9C, 0xA3, 0xAF)),
            (Tone::Blue, Color::Rgb(0x60, 0xA5, 0xFA)),
            (Tone::Emerald, Color::Rgb(0x34, 0xD3, 0x99)),
            (Tone::Rose, Color::Rgb(0xFB, 0x71, 0x85)),
            (Tone::Amber, Color::Rgb(0xFB, 0xBF, 0x24)),
            (Tone::Orange, Color::Rgb(0xFB, 0x92, 0x3C)),
            (Tone::Violet, Color::Rgb(0xA7, 0x8B, 0xFA)),
            (Tone::Pink, Color::Rgb(0xF4, 0x72, 0xB6)),
            (Tone::Indigo, Color::Rgb(0x81, 0x8C, 0xF8)),
        ]);

        Theme {
            background: Color::Rgb(0x11, 0x18, 0x27),
            text: Color::Rgb(0xD1, 0xD5, 0xDB),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0x60, 0xA5, 0xFA),
            dim: Color::Rgb(0x6B, 0x72, 0x80),
            red: Color::Rgb(0xF8, 0x71, 0x71),
            selection_bg: Color::Rgb(0x1F, 0x29, 0x37),
            selection_border: Color::Rgb(0x60, 0xA5, 0xFA),
            tones,
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

const TONES: [Tone; 9] = [
    Tone::Gray,
    Tone::Blue,
    Tone::Emerald,
    Tone::Rose,
    Tone::Amber,
    Tone::Orange,
    Tone::Violet,
    Tone::Pink,
    Tone::Indigo,
];

impl Theme {
    /// Light palette; tones are darkened so badges stay readable on white.
    pub fn light() -> Self {
        let tones = HashMap::from([
            (Tone::Gray, Color::Rgb(0x4B, 0x55, 0x63)),
            (Tone::Blue, Color::Rgb(0x25, 0x63, 0xEB)),
            (Tone::Emerald, Color::Rgb(0x05, 0x96, 0x69)),
            (Tone::Rose, Color::Rgb(0xE1, 0x1D, 0x48)),
            (Tone::Amber, Color::Rgb(0xB4, 0x53, 0x09)),
            (Tone::Orange, Color::Rgb(0xC2, 0x41, 0x0C)),
            (Tone::Violet, Color::Rgb(0x6D, 0x28, 0xD9)),
            (Tone::Pink, Color::Rgb(0xBE, 0x18, 0x5D)),
            (Tone::Indigo, Color::Rgb(0x43, 0x38, 0xCA)),
        ]);

        Theme {
            background: Color::Rgb(0xF9, 0xFA, 0xFB),
            text: Color::Rgb(0x37, 0x41, 0x51),
            text_bright: Color::Rgb(0x11, 0x18, 0x27),
            highlight: Color::Rgb(0x25, 0x63, 0xEB),
            dim: Color::Rgb(0x9C, 0xA3, 0xAF),
            red: Color::Rgb(0xDC, 0x26, 0x26),
            selection_bg: Color::Rgb(0xE5, 0xE7, 0xEB),
            selection_border: Color::Rgb(0x25, 0x63, 0xEB),
            tones,
        }
    }

    /// Create a theme from workspace UI config, falling back to the dark or
    /// light defaults. `[ui.colors]` keys are either base roles or tone names.
    pub fn from_config(ui: &UiConfig, dark: bool) -> Self {
        let mut theme = if dark { Theme::default() } else { Theme::light() };

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "selection_bg" => theme.selection_bg = color,
                "selection_border" => theme.selection_border = color,
                other => {
                    if let Some(tone) = TONES.iter().find(|t| t.as_str() == other) {
                        theme.tones.insert(*tone, color);
                    }
                }
            }
        }

        theme
    }

    pub fn tone(&self, tone: Tone) -> Color {
        self.tones.get(&tone).copied().unwrap_or(self.text)
    }
}
