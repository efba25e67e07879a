use crate::config::NotifierConfig;
use crate::error::Result;
use crate::events::{ForegroundState, Surface};
use crate::services::listeners::ForegroundListener;
use crate::services::notifier::{DebouncedNotifier, NotifierDecision};
use crate::services::scheduler::TaskToken;
use crate::services::state_evaluator::StateEvaluator;
use crate::services::visibility_registry::VisibilityRegistry;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, info};

/// ForegroundManager decides whether the application is in the foreground and tells
/// listeners about genuine transitions exactly once.
///
/// One instance is meant to live for the whole process and be passed (as `Arc`) to
/// whatever owns the UI lifecycle. All visibility events, state comparisons, pending
/// slot transitions and validation timer firings are serialized by `serial`.
/// Listeners are never called while `serial` is held.
pub struct ForegroundManager {
    serial: Mutex<VisibilityRegistry>,
    evaluator: StateEvaluator,
    notifier: DebouncedNotifier,
}

impl ForegroundManager {
    /// Создать менеджер на текущем tokio runtime
    pub fn new(validation_window: Duration) -> Result<Arc<Self>> {
        info!(
            "Инициализация ForegroundManager (окно валидации: {:?})",
            validation_window
        );

        Ok(Arc::new(Self {
            serial: Mutex::new(VisibilityRegistry::new()),
            evaluator: StateEvaluator::new(),
            notifier: DebouncedNotifier::new(validation_window)?,
        }))
    }

    pub fn from_config(config: &NotifierConfig) -> Result<Arc<Self>> {
        Self::new(config.validation_window())
    }

    /// Поверхность стала видимой
    pub fn on_surface_visible<S: Surface + 'static>(self: &Arc<Self>, surface: &Arc<S>) {
        debug!("Поверхность видима: '{}'", surface.name());
        let mut registry = self.serial.lock();
        registry.mark_visible(surface);
        self.reevaluate_locked(&registry);
        drop(registry);

        self.notifier.flush();
    }

    /// Поверхность перестала быть видимой
    pub fn on_surface_not_visible<S: Surface + 'static>(self: &Arc<Self>, surface: &Arc<S>) {
        debug!("Поверхность больше не видима: '{}'", surface.name());
        let mut registry = self.serial.lock();
        registry.mark_not_visible(surface);
        self.reevaluate_locked(&registry);
        drop(registry);

        self.notifier.flush();
    }

    /// Пересчитать состояние без нового события, например после уничтожения поверхности
    pub fn reevaluate(self: &Arc<Self>) {
        let registry = self.serial.lock();
        self.reevaluate_locked(&registry);
        drop(registry);

        self.notifier.flush();
    }

    pub fn is_in_foreground(&self) -> bool {
        self.evaluator.is_in_foreground()
    }

    pub fn state(&self) -> ForegroundState {
        self.evaluator.state()
    }

    /// Имя текущей видимой поверхности
    pub fn current_surface(&self) -> Option<String> {
        self.serial
            .lock()
            .current()
            .map(|surface| surface.name().to_string())
    }

    pub fn add_listener(&self, listener: Arc<dyn ForegroundListener>) -> bool {
        let _serial = self.serial.lock();
        self.notifier.add_listener(listener)
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ForegroundListener>) -> bool {
        let _serial = self.serial.lock();
        self.notifier.remove_listener(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.notifier.listener_count()
    }

    pub fn has_pending_notification(&self) -> bool {
        self.notifier.is_pending()
    }

    pub fn pending_target(&self) -> Option<ForegroundState> {
        self.notifier.pending_target()
    }

    /// Сколько осталось до подтверждения ухода в фон
    pub fn pending_remaining(&self) -> Option<Duration> {
        self.notifier.remaining()
    }

    pub fn validation_window(&self) -> Duration {
        self.notifier.validation_window()
    }

    /// Отменить ожидающую проверку. Менеджер остаётся рабочим.
    pub fn shutdown(&self) {
        let _serial = self.serial.lock();
        if self.notifier.cancel_pending() {
            info!("ForegroundManager: ожидающее уведомление отменено при остановке");
        }
    }

    fn reevaluate_locked(self: &Arc<Self>, registry: &VisibilityRegistry) {
        let Some(new_state) = self.evaluator.recompute(registry.currently_visible()) else {
            return;
        };

        info!("Состояние переднего плана изменилось на {}", new_state);

        let manager = Arc::downgrade(self);
        let decision = self.notifier.on_state_changed(new_state, move |token| {
            if let Some(manager) = manager.upgrade() {
                manager.on_validation_elapsed(token);
            }
        });

        if decision == NotifierDecision::Suppressed {
            info!("Смена состояния на {} признана мерцанием и подавлена", new_state);
        }
    }

    fn on_validation_elapsed(&self, token: TaskToken) {
        let registry = self.serial.lock();
        self.notifier.on_validation_elapsed(token);
        drop(registry);

        self.notifier.flush();
    }
}

impl Drop for ForegroundManager {
    fn drop(&mut self) {
        info!("ForegroundManager завершает работу");
    }
}
