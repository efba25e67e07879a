//! Foreground/background detection with debounced, exactly-once notifications.
//!
//! Report surface show/hide events to a [`ForegroundManager`]; it keeps a weak
//! reference to the visible surface, derives [`ForegroundState`] from it and tells
//! subscribed [`ForegroundListener`]s about genuine transitions. Entering the
//! foreground is announced immediately, leaving it only after the validation window
//! passes without a contradicting change.

pub mod config;
pub mod error;
pub mod events;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{FgError, Result};
pub use events::{ForegroundState, Surface, SurfaceInfo};
pub use services::{ForegroundListener, ForegroundManager, DEFAULT_VALIDATION_WINDOW};
