use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub header_bg: String,
    pub header_fg: String,
    pub focus_bg: String,
    pub focus_fg: String,
    pub section_title: String,
    pub disabled: String,
    pub border: String,
    pub border_focused: String,
    pub accent: String,
    pub warning: String,
    pub error: String,
    pub success: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // Operator-provided themes take precedence over bundled ones.
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("kioska")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path) {
                if let Ok(theme) = toml::from_str::<Theme>(&content) {
                    return Some(theme);
                }
            }
        }

        let filename = format!("{name}.toml");
        if let Some(file) = ThemeAssets::get(&filename) {
            if let Ok(content) = std::str::from_utf8(file.data.as_ref()) {
                if let Ok(theme) = toml::from_str::<Theme>(content) {
                    return Some(theme);
                }
            }
        }

        None
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }

    /// Fixed black-on-yellow scheme used while the high-contrast switch is
    /// on, regardless of the configured theme.
    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast".to_string(),
            colors: ThemeColors {
                bg: "#000000".to_string(),
                fg: "#ffffff".to_string(),
                header_bg: "#ffff00".to_string(),
                header_fg: "#000000".to_string(),
                focus_bg: "#ffff00".to_string(),
                focus_fg: "#000000".to_string(),
                section_title: "#ffff00".to_string(),
                disabled: "#808080".to_string(),
                border: "#ffffff".to_string(),
                border_focused: "#ffff00".to_string(),
                accent: "#ffff00".to_string(),
                warning: "#ffff00".to_string(),
                error: "#ff4040".to_string(),
                success: "#40ff40".to_string(),
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("kiosk-dark").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            focus_bg: "#89b4fa".to_string(),
            focus_fg: "#1e1e2e".to_string(),
            section_title: "#f9e2af".to_string(),
            disabled: "#585b70".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            accent: "#89b4fa".to_string(),
            warning: "#f9e2af".to_string(),
            error: "#f38ba8".to_string(),
            success: "#a6e3a1".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn focus_bg(&self) -> Color { Self::parse_color(&self.focus_bg) }
    pub fn focus_fg(&self) -> Color { Self::parse_color(&self.focus_fg) }
    pub fn section_title(&self) -> Color { Self::parse_color(&self.section_title) }
    pub fn disabled(&self) -> Color { Self::parse_color(&self.disabled) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_hex() {
        assert_eq!(ThemeColors::parse_color("#ff8000"), Color::Rgb(255, 128, 0));
        assert_eq!(ThemeColors::parse_color("ff8000"), Color::Rgb(255, 128, 0));
        // Malformed input falls back rather than panicking.
        assert_eq!(ThemeColors::parse_color("#xyz"), Color::White);
    }

    #[test]
    fn test_bundled_theme_loads() {
        let themes = Theme::available_themes();
        assert!(themes.contains(&"kiosk-dark".to_string()));
        let theme = Theme::load("kiosk-dark").unwrap();
        assert_eq!(theme.name, "kiosk-dark");
    }

    #[test]
    fn test_high_contrast_is_black_and_yellow() {
        let theme = Theme::high_contrast();
        assert_eq!(theme.colors.bg(), Color::Rgb(0, 0, 0));
        assert_eq!(theme.colors.focus_bg(), Color::Rgb(255, 255, 0));
    }
}
