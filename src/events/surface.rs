use serde::{Deserialize, Serialize};
use std::fmt;

/// Поверхность (экран, окно, оверлей), которую приложение может показывать пользователю.
///
/// Менеджер хранит только слабую ссылку на поверхность и сравнивает поверхности
/// по идентичности `Arc`, поэтому реализации не обязаны быть `Eq`.
pub trait Surface: Send + Sync {
    /// Имя для логов
    fn name(&self) -> &str;
}

/// Информация о поверхности
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceInfo {
    pub title: String,
    pub class: String,
}

impl SurfaceInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            class: String::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }
}

impl Surface for SurfaceInfo {
    fn name(&self) -> &str {
        &self.title
    }
}

impl fmt::Display for SurfaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_empty() {
            write!(f, "\"{}\"", self.title)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.class)
        }
    }
}

/// Событие жизненного цикла поверхности
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceEvent {
    pub surface: SurfaceInfo,
    pub timestamp: std::time::Instant,
    pub event_type: SurfaceEventType,
}

impl SurfaceEvent {
    pub fn new(surface: SurfaceInfo, event_type: SurfaceEventType) -> Self {
        Self {
            surface,
            timestamp: std::time::Instant::now(),
            event_type,
        }
    }

    pub fn visible(surface: SurfaceInfo) -> Self {
        Self::new(surface, SurfaceEventType::Visible)
    }

    pub fn not_visible(surface: SurfaceInfo) -> Self {
        Self::new(surface, SurfaceEventType::NotVisible)
    }
}

impl fmt::Display for SurfaceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} ({}ms ago)",
            self.event_type,
            self.surface,
            self.timestamp.elapsed().as_millis()
        )
    }
}

/// Тип события поверхности
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceEventType {
    Visible,
    NotVisible,
}
