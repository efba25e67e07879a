pub mod state;
pub mod surface;

pub use state::ForegroundState;
pub use surface::{Surface, SurfaceEvent, SurfaceEventType, SurfaceInfo};
