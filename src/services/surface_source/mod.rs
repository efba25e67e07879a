//! SurfaceSource: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for producing surface
//! show/hide/destroy events and reporting them to the ForegroundManager.
//! They own the strong references to the surfaces they emulate. They MUST NOT
//! decide anything about foreground state or debouncing; that belongs exclusively
//! to ForegroundManager.

mod command;
mod dry_run;
mod script;
mod stage;
mod r#trait;

pub use self::command::SurfaceCommand;
pub use self::stage::SurfaceStage;
pub use self::r#trait::{create_surface_source, SurfaceSourceTrait};
