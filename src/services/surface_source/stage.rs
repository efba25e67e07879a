use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{SurfaceEvent, SurfaceEventType, SurfaceInfo};
use crate::services::ForegroundManager;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::command::SurfaceCommand;

/// Набор живых поверхностей источника и их связь с менеджером.
///
/// Stage держит сильные ссылки на поверхности: пока поверхность здесь, она жива.
pub struct SurfaceStage {
    manager: Arc<ForegroundManager>,
    class: String,
    surfaces: HashMap<String, Arc<SurfaceInfo>>,
}

impl SurfaceStage {
    pub fn new(manager: Arc<ForegroundManager>, class: impl Into<String>) -> Self {
        Self {
            manager,
            class: class.into(),
            surfaces: HashMap::new(),
        }
    }

    /// Выполнить команду сценария
    pub async fn apply(&mut self, command: &SurfaceCommand) -> Result<()> {
        match command {
            SurfaceCommand::Show(name) => {
                let surface = self.surface(name);
                self.report(&surface, SurfaceEventType::Visible);
            }
            SurfaceCommand::Hide(name) => match self.surfaces.get(name).cloned() {
                Some(surface) => self.report(&surface, SurfaceEventType::NotVisible),
                None => warn!("Скрытие неизвестной поверхности '{}' пропущено", name),
            },
            SurfaceCommand::Destroy(name) => {
                if self.surfaces.remove(name).is_some() {
                    info!("Поверхность '{}' уничтожена", name);
                    self.manager.reevaluate();
                } else {
                    warn!("Уничтожение неизвестной поверхности '{}' пропущено", name);
                }
            }
            SurfaceCommand::Wait(duration) => {
                tokio::time::sleep(*duration).await;
            }
            SurfaceCommand::State => {
                info!(
                    "Состояние: {} (видимая поверхность: {}, ожидает подтверждения: {})",
                    self.manager.state(),
                    self.manager
                        .current_surface()
                        .unwrap_or_else(|| "нет".to_string()),
                    self.manager
                        .pending_remaining()
                        .map(|left| format!("{:?}", left))
                        .unwrap_or_else(|| "нет".to_string()),
                );
            }
        }
        Ok(())
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    fn surface(&mut self, name: &str) -> Arc<SurfaceInfo> {
        let class = &self.class;
        Arc::clone(
            self.surfaces
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(SurfaceInfo::new(name).with_class(class.as_str()))),
        )
    }

    fn report(&self, surface: &Arc<SurfaceInfo>, event_type: SurfaceEventType) {
        let event = match event_type {
            SurfaceEventType::Visible => SurfaceEvent::visible(surface.as_ref().clone()),
            SurfaceEventType::NotVisible => SurfaceEvent::not_visible(surface.as_ref().clone()),
        };
        debug_if_enabled!("Событие поверхности: {}", event);

        match event.event_type {
            SurfaceEventType::Visible => self.manager.on_surface_visible(surface),
            SurfaceEventType::NotVisible => self.manager.on_surface_not_visible(surface),
        }
    }
}
