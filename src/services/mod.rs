pub mod foreground_manager;
pub mod listeners;
pub mod notifier;
pub mod scheduler;
pub mod state_evaluator;
pub mod surface_source;
pub mod visibility_registry;

pub use foreground_manager::ForegroundManager;
pub use listeners::ForegroundListener;
pub use notifier::DEFAULT_VALIDATION_WINDOW;
pub use surface_source::create_surface_source;
