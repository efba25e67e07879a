use crate::config::Config;
use crate::error::Result;
use crate::services::ForegroundManager;
use std::sync::Arc;

/// Trait for surface event sources that can run in different modes
#[async_trait::async_trait]
pub trait SurfaceSourceTrait {
    /// Run the source until it runs out of events
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate surface source based on the dry_run flag
pub fn create_surface_source(
    config: Arc<Config>,
    manager: Arc<ForegroundManager>,
    dry_run: bool,
) -> Result<Box<dyn SurfaceSourceTrait + Send>> {
    if dry_run {
        return Ok(Box::new(super::dry_run::DryRunSource::new(config, manager)));
    }

    match config.source.mode.as_str() {
        "dry_run" => Ok(Box::new(super::dry_run::DryRunSource::new(config, manager))),
        "script" => Ok(Box::new(super::script::ScriptSource::new(config, manager))),
        other => Err(anyhow::anyhow!("Неизвестный режим источника событий: {}", other).into()),
    }
}
