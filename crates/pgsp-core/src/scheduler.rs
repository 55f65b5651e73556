//! Tick scheduler: fetch → reconcile → render.
//!
//! The scheduler owns the source, the enabled kinds and the registry. The
//! terminal host calls [`Scheduler::tick`] when the tick deadline passes and
//! forwards resize and key events in between; nothing here blocks except the
//! source's own queries.

use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use ratatui::text::Text;
use tracing::{debug, warn};

use crate::collector::ProgressSource;
use crate::models::KindSet;
use crate::registry::Registry;
use crate::tui::input::{KeyAction, handle_key};
use crate::tui::render::{RenderConfig, StatusLine, Viewport, render_frame};

/// Columns kept free to the right of every bar.
pub const RIGHT_MARGIN: u16 = 10;

/// Timing and layout settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Delay between the end of one tick and the start of the next.
    pub interval: Duration,
    /// How long a vanished operation stays on screen.
    pub retention: Duration,
    pub render: RenderConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            retention: Duration::from_secs(10),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Reconciling,
}

pub struct Scheduler<S: ProgressSource> {
    source: S,
    kinds: KindSet,
    registry: Registry,
    config: SchedulerConfig,
    viewport: Viewport,
    state: SchedulerState,
    spinner: usize,
    /// Transient fetch errors of the last tick.
    errors: Vec<StatusLine>,
    quit: bool,
}

impl<S: ProgressSource> Scheduler<S> {
    pub fn new(source: S, kinds: KindSet, config: SchedulerConfig, viewport: Viewport) -> Self {
        Self {
            source,
            kinds,
            registry: Registry::new(config.retention, bar_width(viewport.width)),
            config,
            viewport,
            state: SchedulerState::Idle,
            spinner: 0,
            errors: Vec::new(),
            quit: false,
        }
    }

    /// Runs one tick and returns the new frame, or `None` after quit.
    pub fn tick(&mut self, now: Instant) -> Option<Text<'static>> {
        if self.quit {
            return None;
        }
        self.state = SchedulerState::Reconciling;
        self.errors.clear();

        let mut batches = Vec::new();
        for kind in self.kinds.enabled() {
            match self.source.fetch(kind) {
                Ok(batch) => batches.push(batch),
                Err(e) if e.is_persistent() => {
                    warn!(kind = %kind, error = %e, "disabling progress kind");
                    self.kinds.disable(kind, e.to_string());
                }
                Err(e) => {
                    warn!(kind = %kind, error = %e, "fetch failed, skipping this tick");
                    self.errors.push(StatusLine::warning(format!("{}: {}", kind, e)));
                }
            }
        }

        let evicted = self.registry.reconcile(batches, now);
        if evicted > 0 {
            debug!(evicted, remaining = self.registry.len(), "entries aged out");
        }

        let frame = self.render(now);
        self.spinner = self.spinner.wrapping_add(1);
        self.state = SchedulerState::Idle;
        Some(frame)
    }

    /// Renders the current registry without fetching.
    pub fn render(&self, now: Instant) -> Text<'static> {
        render_frame(
            self.registry.entries(),
            self.viewport,
            &self.config.render,
            self.spinner,
            &self.status_lines(),
            now,
        )
    }

    /// Status lines: this tick's transient errors, then disabled kinds.
    pub fn status_lines(&self) -> Vec<StatusLine> {
        let mut lines = self.errors.clone();
        lines.extend(
            self.kinds
                .disabled_reasons()
                .map(|(kind, reason)| StatusLine::critical(format!("{} disabled: {}", kind, reason))),
        );
        lines
    }

    /// Updates the viewport and every bar width. Redraw with [`Self::render`].
    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
        self.registry.set_bar_width(bar_width(width));
    }

    /// Handles a key press; returns true when it requested quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if handle_key(key) == KeyAction::Quit {
            self.quit();
        }
        self.quit
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn kinds(&self) -> &KindSet {
        &self.kinds
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

fn bar_width(terminal_width: u16) -> u16 {
    terminal_width.saturating_sub(RIGHT_MARGIN)
}
