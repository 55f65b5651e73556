//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

/// Color palette.
pub struct Theme;

impl Theme {
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    // Entity header (view name) colors
    pub const ENTITY_FG: Color = Color::Rgb(0xFA, 0xFA, 0xFA);
    pub const ENTITY_BG: Color = Color::Rgb(0x7D, 0x56, 0xF4);

    // Unfilled part of completion bars
    pub const BAR_EMPTY: Color = Color::Rgb(0x60, 0x60, 0x60);

    pub const HIGHLIGHT_WARNING: Color = Color::Yellow;
    pub const HIGHLIGHT_CRITICAL: Color = Color::Red;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Theme::FG)
    }

    /// Header line naming a tracked operation.
    pub fn entity_header() -> Style {
        Style::default()
            .fg(Theme::ENTITY_FG)
            .bg(Theme::ENTITY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Dimmed text style.
    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    /// Help text style.
    pub fn help() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    /// Status line for recoverable problems (fetch errors).
    pub fn warning() -> Style {
        Style::default().fg(Theme::HIGHLIGHT_WARNING)
    }

    /// Status line for kinds disabled for the session.
    pub fn critical() -> Style {
        Style::default()
            .fg(Theme::HIGHLIGHT_CRITICAL)
            .add_modifier(Modifier::BOLD)
    }

    /// Unfilled bar cells.
    pub fn bar_empty() -> Style {
        Style::default().fg(Theme::BAR_EMPTY)
    }
}

/// Parses `#RRGGBB` (or `RRGGBB`) into an RGB color.
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
