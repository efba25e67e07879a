use crate::debug_if_enabled;
use crate::events::Surface;
use std::sync::{Arc, Weak};

/// VisibilityRegistry tracks at most one visible surface.
///
/// Responsibilities (strict):
/// - Hold a non-owning reference to the surface that was reported visible last.
/// - Ignore a "not visible" report for any surface other than the tracked one.
/// - Do NOT derive foreground state or notify anyone; that belongs to StateEvaluator
///   and DebouncedNotifier.
#[derive(Default)]
pub struct VisibilityRegistry {
    visible: Option<Weak<dyn Surface>>,
}

impl VisibilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Запомнить поверхность как видимую, вытеснив предыдущую без отдельного скрытия
    pub fn mark_visible<S: Surface + 'static>(&mut self, surface: &Arc<S>) {
        let weak: Weak<S> = Arc::downgrade(surface);
        let weak: Weak<dyn Surface> = weak;
        if let Some(previous) = self.visible.replace(weak).and_then(|w| w.upgrade()) {
            debug_if_enabled!(
                "Поверхность '{}' вытеснена поверхностью '{}'",
                previous.name(),
                surface.name()
            );
        }
    }

    /// Сбросить видимую поверхность, только если это та же самая поверхность.
    /// Возвращает true, если отслеживание было сброшено.
    pub fn mark_not_visible<S: Surface + 'static>(&mut self, surface: &Arc<S>) -> bool {
        let is_tracked = self
            .visible
            .as_ref()
            .is_some_and(|tracked| same_surface(tracked, surface));

        if is_tracked {
            self.visible = None;
        } else {
            debug_if_enabled!(
                "Скрытие устаревшей поверхности '{}' проигнорировано",
                surface.name()
            );
        }
        is_tracked
    }

    /// Есть ли отслеживаемая поверхность, которая ещё жива
    pub fn currently_visible(&self) -> bool {
        self.visible
            .as_ref()
            .is_some_and(|tracked| tracked.strong_count() > 0)
    }

    /// Текущая видимая поверхность, если она ещё жива
    pub fn current(&self) -> Option<Arc<dyn Surface>> {
        self.visible.as_ref().and_then(Weak::upgrade)
    }
}

// Слабая ссылка удерживает аллокацию, поэтому адрес не может быть переиспользован
fn same_surface<S: Surface>(tracked: &Weak<dyn Surface>, surface: &Arc<S>) -> bool {
    std::ptr::eq(
        tracked.as_ptr() as *const (),
        Arc::as_ptr(surface) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SurfaceInfo;

    fn surface(title: &str) -> Arc<SurfaceInfo> {
        Arc::new(SurfaceInfo::new(title))
    }

    #[test]
    fn test_empty_registry_is_not_visible() {
        let registry = VisibilityRegistry::new();
        assert!(!registry.currently_visible());
        assert!(registry.current().is_none());
    }

    #[test]
    fn test_mark_visible_then_not_visible() {
        let mut registry = VisibilityRegistry::new();
        let a = surface("A");

        registry.mark_visible(&a);
        assert!(registry.currently_visible());

        assert!(registry.mark_not_visible(&a));
        assert!(!registry.currently_visible());
    }

    #[test]
    fn test_new_surface_replaces_previous() {
        let mut registry = VisibilityRegistry::new();
        let a = surface("A");
        let b = surface("B");

        registry.mark_visible(&a);
        registry.mark_visible(&b);

        let current = registry.current().unwrap();
        assert_eq!(current.name(), "B");
    }

    #[test]
    fn test_stale_hide_is_ignored() {
        let mut registry = VisibilityRegistry::new();
        let a = surface("A");
        let b = surface("B");

        registry.mark_visible(&a);
        registry.mark_visible(&b);

        assert!(!registry.mark_not_visible(&a));
        assert!(registry.currently_visible());
        assert_eq!(registry.current().unwrap().name(), "B");
    }

    #[test]
    fn test_identity_not_equality() {
        let mut registry = VisibilityRegistry::new();
        let first = surface("Main");
        let twin = surface("Main");

        registry.mark_visible(&first);

        // Равные по содержимому, но разные поверхности
        assert!(!registry.mark_not_visible(&twin));
        assert!(registry.currently_visible());
    }

    struct Overlay;

    impl Surface for Overlay {
        fn name(&self) -> &str {
            "Overlay"
        }
    }

    #[test]
    fn test_any_surface_type_can_be_tracked() {
        let mut registry = VisibilityRegistry::new();
        let main = surface("Main");
        let overlay = Arc::new(Overlay);

        registry.mark_visible(&main);
        registry.mark_visible(&overlay);
        assert_eq!(registry.current().unwrap().name(), "Overlay");

        // Поверхность другого типа не совпадает с отслеживаемой
        assert!(!registry.mark_not_visible(&main));
        assert!(registry.mark_not_visible(&overlay));
        assert!(!registry.currently_visible());
    }

    #[test]
    fn test_registry_does_not_keep_surface_alive() {
        let mut registry = VisibilityRegistry::new();
        let a = surface("A");

        registry.mark_visible(&a);
        assert_eq!(Arc::strong_count(&a), 1);

        drop(a);
        assert!(!registry.currently_visible());
        assert!(registry.current().is_none());
    }
}
