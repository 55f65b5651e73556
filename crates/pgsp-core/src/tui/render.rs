//! Adaptive frame rendering.
//!
//! Turns the registry's entries into one immutable [`Text`] frame. The
//! layout adapts to the viewport: wide terminals get the tabular form,
//! narrow ones the vertical form when every entry fits, otherwise only a
//! header and bar per entry.

use std::time::{Duration, Instant};

use ratatui::text::{Line, Span, Text};

use super::style::Styles;
use crate::fmt::format_elapsed;
use crate::models::ProgressInfo;
use crate::registry::TrackedEntry;

/// Help line shown at the top of every frame.
pub const HELP_LINE: &str = "quit: q, ctrl+c, esc";

/// Spinner glyphs shown while nothing is running.
pub const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// An entry not seen for longer than this is drawn as finished.
pub const STALE_AFTER: Duration = Duration::from_secs(1);

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

/// Layout thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Minimum width for the tabular form.
    pub wide_threshold: u16,
    /// Lines reserved per entry in the vertical form.
    pub compact_line_budget: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wide_threshold: 120,
            compact_line_budget: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    /// Failed this tick, retried next tick.
    Warning,
    /// Disabled for the rest of the session.
    Critical,
}

/// A line describing a fetch problem, shown under the help line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusLine {
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            text: text.into(),
        }
    }

    pub fn critical(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Critical,
            text: text.into(),
        }
    }

    fn to_line(&self) -> Line<'static> {
        let style = match self.level {
            StatusLevel::Warning => Styles::warning(),
            StatusLevel::Critical => Styles::critical(),
        };
        Line::from(Span::styled(self.text.clone(), style))
    }
}

/// How an entry's fields are laid out in this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Wide,
    Compact,
    HeaderOnly,
}

/// Picks the form for all entries of a frame.
pub fn choose_form(viewport: Viewport, entries: usize, config: &RenderConfig) -> Form {
    if viewport.width >= config.wide_threshold {
        Form::Wide
    } else if entries * (config.compact_line_budget as usize) < viewport.height as usize {
        Form::Compact
    } else {
        Form::HeaderOnly
    }
}

/// What the bar of one entry shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarState {
    /// No bar this frame.
    Hidden,
    /// Bar at the given ratio, in `(0, 1]`.
    Ratio(f64),
    /// Operation vanished; bar pinned at 100% with the time since it was last seen.
    Finished(Duration),
}

pub fn choose_bar(ratio: Option<f64>, unseen_for: Duration) -> BarState {
    match ratio {
        None => BarState::Hidden,
        Some(r) if !(r > 0.0 && r <= 1.0) => BarState::Hidden,
        Some(_) if unseen_for > STALE_AFTER => BarState::Finished(unseen_for),
        Some(r) => BarState::Ratio(r),
    }
}

/// Builds one frame.
pub fn render_frame(
    entries: &[TrackedEntry],
    viewport: Viewport,
    config: &RenderConfig,
    spinner: usize,
    status: &[StatusLine],
    now: Instant,
) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    if entries.is_empty() {
        let glyph = SPINNER[spinner % SPINNER.len()];
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", glyph), Styles::default()),
            Span::styled(HELP_LINE, Styles::help()),
        ]));
        lines.extend(status.iter().map(StatusLine::to_line));
        return Text::from(lines);
    }

    lines.push(Line::from(Span::styled(HELP_LINE, Styles::help())));
    lines.extend(status.iter().map(StatusLine::to_line));

    let form = choose_form(viewport, entries.len(), config);
    for entry in entries {
        render_entry(&mut lines, entry, form, now);
    }

    Text::from(lines)
}

fn render_entry(lines: &mut Vec<Line<'static>>, entry: &TrackedEntry, form: Form, now: Instant) {
    let record = entry.record();
    lines.push(Line::from(vec![
        Span::styled(record.kind().view_name(), Styles::entity_header()),
        Span::styled(
            format!(
                " pid {} since {}",
                record.pid(),
                entry.first_seen_at().format("%H:%M:%S")
            ),
            Styles::dim(),
        ),
    ]));

    let body = match form {
        Form::Wide => Some(record.wide_form()),
        Form::Compact => Some(record.compact_form()),
        Form::HeaderOnly => None,
    };
    if let Some(body) = body {
        lines.extend(body.lines().map(|l| Line::styled(l.to_string(), Styles::default())));
    }

    let Some(bar) = entry.bar() else {
        return;
    };
    match choose_bar(record.completion_ratio(), entry.unseen_for(now)) {
        BarState::Hidden => {}
        BarState::Ratio(r) => lines.push(bar.line(r)),
        BarState::Finished(elapsed) => {
            let mut line = bar.line(1.0);
            line.spans.push(Span::styled(
                format!(" {}", format_elapsed(elapsed)),
                Styles::dim(),
            ));
            lines.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgressCopy, ProgressCreateIndex, ProgressRecord, ProgressVacuum};
    use crate::registry::Registry;
    use crate::tui::widgets::BarError;

    fn text_of(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn vacuum(pid: i32, scanned: i64, total: i64) -> ProgressRecord {
        ProgressVacuum {
            pid,
            datname: "shop".into(),
            phase: "scanning heap".into(),
            heap_blks_scanned: scanned,
            heap_blks_total: total,
            ..ProgressVacuum::default()
        }
        .into()
    }

    #[test]
    fn form_selection() {
        let config = RenderConfig::default();
        let wide = Viewport {
            width: 120,
            height: 5,
        };
        assert_eq!(choose_form(wide, 10, &config), Form::Wide);

        let narrow = Viewport {
            width: 100,
            height: 40,
        };
        assert_eq!(choose_form(narrow, 2, &config), Form::Compact);
        assert_eq!(choose_form(narrow, 3, &config), Form::HeaderOnly);

        // Exactly filling the height leaves no room for the help line.
        let exact = Viewport {
            width: 100,
            height: 30,
        };
        assert_eq!(choose_form(exact, 2, &config), Form::HeaderOnly);
    }

    #[test]
    fn bar_selection() {
        let fresh = Duration::from_millis(200);
        let stale = Duration::from_millis(1500);
        assert_eq!(choose_bar(None, fresh), BarState::Hidden);
        assert_eq!(choose_bar(None, stale), BarState::Hidden);
        assert_eq!(choose_bar(Some(0.5), fresh), BarState::Ratio(0.5));
        assert_eq!(choose_bar(Some(1.0), fresh), BarState::Ratio(1.0));
        assert_eq!(choose_bar(Some(0.0), fresh), BarState::Hidden);
        assert_eq!(choose_bar(Some(1.2), fresh), BarState::Hidden);
        assert_eq!(choose_bar(Some(0.5), stale), BarState::Finished(stale));
        assert_eq!(choose_bar(Some(0.0), stale), BarState::Hidden);
        assert_eq!(choose_bar(Some(-0.5), stale), BarState::Hidden);
        assert_eq!(choose_bar(Some(1.2), stale), BarState::Hidden);
        assert_eq!(choose_bar(Some(f64::NAN), stale), BarState::Hidden);
        assert_eq!(
            choose_bar(Some(0.5), Duration::from_secs(1)),
            BarState::Ratio(0.5)
        );
    }

    #[test]
    fn empty_frame_shows_spinner() {
        let now = Instant::now();
        let viewport = Viewport {
            width: 80,
            height: 24,
        };
        let config = RenderConfig::default();
        let frames: Vec<String> = (0..5)
            .map(|i| text_of(&render_frame(&[], viewport, &config, i, &[], now))[0].clone())
            .collect();
        assert_eq!(frames[0], "| quit: q, ctrl+c, esc");
        assert_eq!(frames[1], "/ quit: q, ctrl+c, esc");
        assert_eq!(frames[2], "- quit: q, ctrl+c, esc");
        assert_eq!(frames[3], "\\ quit: q, ctrl+c, esc");
        assert_eq!(frames[4], frames[0]);
    }

    #[test]
    fn status_lines_follow_help_line() {
        let now = Instant::now();
        let status = vec![
            StatusLine::warning("vacuum: PostgreSQL: connection refused"),
            StatusLine::critical("copy disabled"),
        ];
        let text = render_frame(
            &[],
            Viewport {
                width: 80,
                height: 24,
            },
            &RenderConfig::default(),
            0,
            &status,
            now,
        );
        let lines = text_of(&text);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "vacuum: PostgreSQL: connection refused");
        assert_eq!(text.lines[2].spans[0].style, Styles::critical());
    }

    #[test]
    fn narrow_crowded_frame_is_headers_only() {
        let now = Instant::now();
        let mut registry = Registry::new(Duration::from_secs(10), 90);
        registry.merge(vec![vacuum(1, 5, 10), vacuum(2, 5, 10), vacuum(3, 5, 10)], now);

        let text = render_frame(
            registry.entries(),
            Viewport {
                width: 100,
                height: 40,
            },
            &RenderConfig::default(),
            0,
            &[],
            now,
        );
        let lines = text_of(&text);
        // Help line, then header + bar per entry.
        assert_eq!(lines.len(), 1 + 3 * 2);
        assert_eq!(lines[0], HELP_LINE);
        assert!(lines[1].starts_with("pg_stat_progress_vacuum pid 1 since "));
        assert!(lines[2].ends_with(" 50%"));
        assert!(!lines.iter().any(|l| l.contains("heap_blks_total")));
    }

    #[test]
    fn narrow_frame_with_room_is_vertical() {
        let now = Instant::now();
        let mut registry = Registry::new(Duration::from_secs(10), 90);
        registry.merge(vec![vacuum(1, 5, 10)], now);

        let text = render_frame(
            registry.entries(),
            Viewport {
                width: 100,
                height: 40,
            },
            &RenderConfig::default(),
            0,
            &[],
            now,
        );
        let lines = text_of(&text);
        assert!(lines.iter().any(|l| l.contains(" heap_blks_total ") && l.ends_with("| 10")));
        assert!(lines.iter().any(|l| l.contains("| scanning heap")));
    }

    #[test]
    fn wide_frame_uses_tables() {
        let now = Instant::now();
        let mut registry = Registry::new(Duration::from_secs(10), 150);
        registry.merge(vec![vacuum(1, 5, 10)], now);

        let text = render_frame(
            registry.entries(),
            Viewport {
                width: 160,
                height: 10,
            },
            &RenderConfig::default(),
            0,
            &[],
            now,
        );
        let lines = text_of(&text);
        assert!(lines.iter().any(|l| l.starts_with("+-")));
        assert!(lines.iter().any(|l| l.contains("HEAP BLKS TOTAL")));
    }

    #[test]
    fn vanished_entry_is_pinned_with_elapsed_time() {
        let t0 = Instant::now();
        let mut registry = Registry::new(Duration::from_secs(10), 20);
        registry.merge(
            vec![ProgressRecord::from(ProgressCreateIndex {
                pid: 9,
                blocks_total: 100,
                blocks_done: 50,
                ..ProgressCreateIndex::default()
            })],
            t0,
        );

        let viewport = Viewport {
            width: 30,
            height: 2,
        };
        let config = RenderConfig::default();

        let text = render_frame(registry.entries(), viewport, &config, 0, &[], t0);
        assert!(text_of(&text)[2].ends_with(" 50%"));

        let later = t0 + Duration::from_secs(3);
        let text = render_frame(registry.entries(), viewport, &config, 0, &[], later);
        assert!(text_of(&text)[2].ends_with("100% 3s"));
    }

    #[test]
    fn out_of_range_ratio_has_no_bar() {
        let now = Instant::now();
        let mut registry = Registry::new(Duration::from_secs(10), 20);
        registry.merge(
            vec![ProgressRecord::from(ProgressCopy {
                pid: 4,
                bytes_total: 10,
                bytes_processed: 0,
                ..ProgressCopy::default()
            })],
            now,
        );
        let text = render_frame(
            registry.entries(),
            Viewport {
                width: 30,
                height: 2,
            },
            &RenderConfig::default(),
            0,
            &[],
            now,
        );
        // Help line and header only.
        assert_eq!(text.lines.len(), 2);
    }

    #[test]
    fn vanished_entry_without_progress_gets_no_bar() {
        let t0 = Instant::now();
        let mut registry = Registry::new(Duration::from_secs(10), 20);
        registry.merge(vec![vacuum(3, 0, 100)], t0);

        let viewport = Viewport {
            width: 30,
            height: 2,
        };
        let config = RenderConfig::default();

        let fresh = render_frame(registry.entries(), viewport, &config, 0, &[], t0);
        assert_eq!(fresh.lines.len(), 2);

        let later = t0 + Duration::from_secs(3);
        let stale = render_frame(registry.entries(), viewport, &config, 0, &[], later);
        assert_eq!(stale.lines.len(), 2);
        assert!(!text_of(&stale).iter().any(|l| l.contains("100%")));
    }

    #[test]
    fn entry_without_bar_keeps_header_and_body() {
        let now = Instant::now();
        let mut registry = Registry::new(Duration::from_secs(10), 20);
        registry.merge_with(vec![vacuum(5, 5, 10)], now, |_, _| {
            Err(BarError::InvalidColor("nope".into()))
        });
        assert!(registry.entries()[0].bar().is_none());

        let text = render_frame(
            registry.entries(),
            Viewport {
                width: 100,
                height: 40,
            },
            &RenderConfig::default(),
            0,
            &[],
            now,
        );
        let lines = text_of(&text);
        assert!(lines[1].starts_with("pg_stat_progress_vacuum pid 5 since "));
        assert!(lines.iter().any(|l| l.contains("| scanning heap")));
        assert!(!lines.iter().any(|l| l.contains('%')));
    }
}
