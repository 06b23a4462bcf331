//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the scanned files, the
//! playlist handle and the cursor state for both panes.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
