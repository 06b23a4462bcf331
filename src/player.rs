//! Playback coordination: the UI-bound controller, the background
//! service that owns the decoder, and the channels between them.

mod bus;
mod controller;
mod service;
mod types;

pub use bus::StateBus;
pub use controller::{Controller, OrderingFn};
pub use service::{PlaybackService, ServiceHandle};
pub use types::*;
