//! Reusable widgets.

mod progress_bar;

pub use progress_bar::{BarError, ProgressBar};
