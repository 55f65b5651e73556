//! Terminal User Interface for the progress monitor.
//!
//! The host ([`App`]) owns the terminal; frames are built by [`render`] from
//! the registry and handed over as immutable text.

mod app;
mod event;
pub mod input;
pub mod render;
pub mod style;
pub mod widgets;

pub use app::App;
pub use render::{RenderConfig, StatusLine, Viewport};
