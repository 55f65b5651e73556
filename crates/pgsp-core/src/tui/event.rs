//! Event handling for TUI.
//!
//! A separate thread reads terminal events and forwards them over a channel,
//! so keys pressed while a tick is fetching are not lost. Ticks are produced
//! by the receiving side when no event arrives before the deadline.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};

/// How often the input thread checks whether the receiver is gone.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// Tick deadline reached.
    Tick,
    /// Keyboard input.
    Key(KeyEvent),
    /// Terminal resize (width, height).
    Resize(u16, u16),
}

/// Event handler that reads terminal events in a separate thread.
pub struct EventHandler {
    rx: Receiver<Event>,
}

impl EventHandler {
    /// Starts the input thread.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {
                        let Ok(evt) = event::read() else {
                            continue;
                        };
                        let event = match evt {
                            CrosstermEvent::Key(key) => Event::Key(key),
                            CrosstermEvent::Resize(w, h) => Event::Resize(w, h),
                            _ => continue,
                        };
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
        });

        Self { rx }
    }

    /// Waits for the next event, returning [`Event::Tick`] once `deadline`
    /// passes without one.
    pub fn next(&self, deadline: Instant) -> Result<Event, mpsc::RecvError> {
        let timeout = deadline.saturating_duration_since(Instant::now());
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(event),
            Err(RecvTimeoutError::Timeout) => Ok(Event::Tick),
            Err(RecvTimeoutError::Disconnected) => Err(mpsc::RecvError),
        }
    }
}
