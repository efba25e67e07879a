use crate::error::Result;
use crate::events::ForegroundState;
use crate::services::listeners::{ForegroundListener, ListenerRegistry};
use crate::services::scheduler::{DelayedTasks, TaskKind, TaskToken};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, info};

/// Значение окна валидации по умолчанию
pub const DEFAULT_VALIDATION_WINDOW: Duration = Duration::from_secs(30);

/// Что сделал нотификатор с очередной сменой состояния
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierDecision {
    /// Ожидающее уведомление отменено, новое не создано
    Suppressed,
    /// Уведомление поставлено в очередь рассылки без задержки
    Immediate,
    /// Запланирована проверка через окно валидации
    Scheduled(TaskToken),
}

/// Debounces foreground transitions before fanning them out to listeners.
///
/// Every method except `flush` must be called from inside the manager's serialized
/// section; `flush` must be called after leaving it.
pub struct DebouncedNotifier {
    pending: DelayedTasks<ForegroundState>,
    listeners: ListenerRegistry,
    validation_window: Duration,
}

impl DebouncedNotifier {
    pub fn new(validation_window: Duration) -> Result<Self> {
        Ok(Self {
            pending: DelayedTasks::new()?,
            listeners: ListenerRegistry::new(),
            validation_window,
        })
    }

    pub fn validation_window(&self) -> Duration {
        self.validation_window
    }

    /// Обработать смену состояния.
    ///
    /// Вторая смена внутри окна валидации означает мерцание: обе смены выбрасываются,
    /// и для нового уведомления нужна ещё одна, уже неоспоренная смена.
    pub fn on_state_changed<F>(&self, new_state: ForegroundState, on_elapsed: F) -> NotifierDecision
    where
        F: FnOnce(TaskToken) + Send + 'static,
    {
        if let Some(discarded) = self.pending.cancel(TaskKind::NotifyListeners) {
            debug!(
                "Валидация не пройдена: уведомление о состоянии {} выброшено (новое состояние {})",
                discarded, new_state
            );
            return NotifierDecision::Suppressed;
        }

        match new_state {
            ForegroundState::InForeground => {
                // Выход на передний план всегда настоящий, окно валидации не нужно
                self.listeners.enqueue(new_state);
                NotifierDecision::Immediate
            }
            ForegroundState::NotInForeground => {
                let token = self.pending.schedule(
                    TaskKind::NotifyListeners,
                    self.validation_window,
                    new_state,
                    on_elapsed,
                );
                debug!(
                    "Уход в фон {} будет подтверждён через {:?}",
                    token, self.validation_window
                );
                NotifierDecision::Scheduled(token)
            }
        }
    }

    /// Окно валидации истекло. true, если уведомление поставлено в очередь.
    pub fn on_validation_elapsed(&self, token: TaskToken) -> bool {
        match self.pending.complete(TaskKind::NotifyListeners, token) {
            Some(target) => {
                info!("Приложение только что сменило состояние на: {}", target);
                self.listeners.enqueue(target);
                true
            }
            None => {
                debug!("Проверка {} уже отменена, уведомление не отправляется", token);
                false
            }
        }
    }

    pub fn flush(&self) {
        self.listeners.flush();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending(TaskKind::NotifyListeners)
    }

    pub fn pending_target(&self) -> Option<ForegroundState> {
        self.pending.pending(TaskKind::NotifyListeners)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.pending.remaining(TaskKind::NotifyListeners)
    }

    /// Отменить ожидающую проверку без уведомления
    pub fn cancel_pending(&self) -> bool {
        self.pending.cancel_all() > 0
    }

    pub fn add_listener(&self, listener: Arc<dyn ForegroundListener>) -> bool {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ForegroundListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
