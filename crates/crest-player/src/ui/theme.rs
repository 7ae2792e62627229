//! Theme colors for the player
//!
//! The accent color and palette flag come from the player config and are
//! installed into a global once at startup so canvas code can read them
//! without threading config through every widget.

use std::sync::OnceLock;

use iced::Color;

use crest_core::config::ThemeConfig;

/// Global theme instance (initialized once at startup)
static THEME: OnceLock<ThemeConfig> = OnceLock::new();

/// Install the theme from config. Call once before the UI starts.
pub fn init_theme(theme: ThemeConfig) {
    if THEME.set(theme).is_err() {
        log::warn!("Theme already initialized");
    }
}

fn theme() -> &'static ThemeConfig {
    static FALLBACK: OnceLock<ThemeConfig> = OnceLock::new();
    THEME
        .get()
        .unwrap_or_else(|| FALLBACK.get_or_init(ThemeConfig::default))
}

/// Accent color for the waveform fill and playhead
pub fn accent() -> Color {
    parse_hex_color(&theme().accent)
}

/// Dimmed accent for the unfilled waveform region
pub fn accent_dim() -> Color {
    let accent = accent();
    Color {
        a: 0.35,
        ..accent
    }
}

/// The iced palette to use
pub fn app_theme(dark: bool) -> iced::Theme {
    if dark {
        iced::Theme::Dark
    } else {
        iced::Theme::Light
    }
}

/// Parse a hex color string ("#RRGGBB" or "RRGGBB"); white on failure
pub fn parse_hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    // Length is in bytes; reject non-ASCII before byte-slicing below
    if hex.len() != 6 || !hex.is_ascii() {
        log::warn!("Invalid hex color '{}', using white", hex);
        return Color::WHITE;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);

    Color::from_rgb8(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        let color = parse_hex_color("#4DA6FF");
        assert!((color.r - 0x4D as f32 / 255.0).abs() < 1e-6);
        assert!((color.g - 0xA6 as f32 / 255.0).abs() < 1e-6);
        assert!((color.b - 1.0).abs() < 1e-6);

        assert_eq!(parse_hex_color("zzz"), Color::WHITE);
        assert_eq!(parse_hex_color("33CC66"), Color::from_rgb8(0x33, 0xCC, 0x66));
    }

    #[test]
    fn test_multibyte_input_falls_back_to_white() {
        // Six bytes but not six ASCII chars; must not panic on a slice
        assert_eq!(parse_hex_color("€abc"), Color::WHITE);
        assert_eq!(parse_hex_color("#€abc"), Color::WHITE);
    }
}
