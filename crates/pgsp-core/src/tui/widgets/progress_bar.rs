//! Gradient completion bar.
//!
//! A `ProgressBar` is the render state attached to one tracked operation.
//! It is built once when the operation is first seen and kept for the life
//! of the entry; only its width changes (on terminal resize).

use std::fmt;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::tui::style::{Styles, parse_hex_color};

const FILLED: char = '█';
const EMPTY: char = '░';

/// Width of the `" 100%"` suffix.
const PERCENT_WIDTH: u16 = 5;

/// Error building a completion bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarError {
    /// A gradient stop is not a `#RRGGBB` color.
    InvalidColor(String),
}

impl fmt::Display for BarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarError::InvalidColor(c) => write!(f, "invalid bar color '{}'", c),
        }
    }
}

impl std::error::Error for BarError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressBar {
    start: (u8, u8, u8),
    end: (u8, u8, u8),
    width: u16,
}

impl ProgressBar {
    /// Builds a bar with a two-stop gradient. `width` includes the percentage.
    pub fn new(gradient: (&str, &str), width: u16) -> Result<Self, BarError> {
        let start =
            parse_hex_color(gradient.0).ok_or_else(|| BarError::InvalidColor(gradient.0.into()))?;
        let end =
            parse_hex_color(gradient.1).ok_or_else(|| BarError::InvalidColor(gradient.1.into()))?;
        Ok(Self { start, end, width })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
    }

    /// Renders the bar filled to `ratio` (clamped to `[0, 1]`).
    ///
    /// The gradient is scaled over the filled part, so a short bar still
    /// runs through both colors.
    pub fn line(&self, ratio: f64) -> Line<'static> {
        let ratio = if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        };
        let cells = self.width.saturating_sub(PERCENT_WIDTH) as usize;
        let filled = ((cells as f64) * ratio).round() as usize;

        let mut spans: Vec<Span<'static>> = Vec::with_capacity(filled + 2);
        for i in 0..filled {
            let t = if filled > 1 {
                i as f64 / (filled - 1) as f64
            } else {
                0.0
            };
            spans.push(Span::styled(
                FILLED.to_string(),
                Style::default().fg(self.color_at(t)),
            ));
        }
        if cells > filled {
            spans.push(Span::styled(
                EMPTY.to_string().repeat(cells - filled),
                Styles::bar_empty(),
            ));
        }
        spans.push(Span::styled(
            format!(" {:>3.0}%", ratio * 100.0),
            Styles::default(),
        ));

        Line::from(spans)
    }

    fn color_at(&self, t: f64) -> Color {
        let lerp = |a: u8, b: u8| -> u8 { (a as f64 + (b as f64 - a as f64) * t).round() as u8 };
        Color::Rgb(
            lerp(self.start.0, self.end.0),
            lerp(self.start.1, self.end.1),
            lerp(self.start.2, self.end.2),
        )
    }
}
