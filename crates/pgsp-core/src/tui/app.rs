//! Main TUI application.

use std::io;
use std::time::Instant;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::text::Text;
use ratatui::widgets::Paragraph;
use ratatui::{DefaultTerminal, Terminal};
use tracing::info;

use super::event::{Event, EventHandler};
use crate::collector::ProgressSource;
use crate::scheduler::Scheduler;

/// Full-screen host: owns the terminal and feeds the scheduler.
pub struct App<S: ProgressSource> {
    scheduler: Scheduler<S>,
}

impl<S: ProgressSource> App<S> {
    pub fn new(scheduler: Scheduler<S>) -> Self {
        Self { scheduler }
    }

    /// Runs until a quit key is pressed.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut terminal = restore_on_err(enter_alternate_screen(), || {
            let _ = disable_raw_mode();
        })?;

        let result = self.event_loop(&mut terminal);

        // Restore terminal, even when the loop failed.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        let events = EventHandler::spawn();

        let size = terminal.size()?;
        self.scheduler.resize(size.width, size.height);

        // First tick right away, then `interval` after each frame.
        let mut frame = self.scheduler.tick(Instant::now()).unwrap_or_default();
        let mut deadline = Instant::now() + self.scheduler.interval();

        loop {
            draw(terminal, &frame)?;

            match events.next(deadline) {
                Ok(Event::Tick) => match self.scheduler.tick(Instant::now()) {
                    Some(next) => {
                        frame = next;
                        deadline = Instant::now() + self.scheduler.interval();
                    }
                    None => break,
                },
                Ok(Event::Key(key)) => {
                    if self.scheduler.handle_key(key) {
                        break;
                    }
                }
                Ok(Event::Resize(width, height)) => {
                    self.scheduler.resize(width, height);
                    frame = self.scheduler.render(Instant::now());
                }
                Err(_) => break,
            }
        }

        info!("quit requested");
        Ok(())
    }
}

fn enter_alternate_screen() -> io::Result<DefaultTerminal> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    restore_on_err(Terminal::new(CrosstermBackend::new(stdout)), || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    })
}

/// Runs `restore` when a setup step failed, then passes the result on.
fn restore_on_err<T>(result: io::Result<T>, restore: impl FnOnce()) -> io::Result<T> {
    if result.is_err() {
        restore();
    }
    result
}

fn draw(terminal: &mut DefaultTerminal, frame: &Text<'static>) -> io::Result<()> {
    terminal.draw(|f| {
        f.render_widget(Paragraph::new(frame.clone()), f.area());
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn failed_setup_step_restores_terminal() {
        let restored = Cell::new(0);
        let result: io::Result<()> = restore_on_err(Err(io::Error::other("no tty")), || {
            restored.set(restored.get() + 1)
        });
        assert!(result.is_err());
        assert_eq!(restored.get(), 1);
    }

    #[test]
    fn successful_setup_step_leaves_terminal_alone() {
        let restored = Cell::new(0);
        let result = restore_on_err(Ok(7), || restored.set(restored.get() + 1));
        assert_eq!(result.unwrap(), 7);
        assert_eq!(restored.get(), 0);
    }
}
