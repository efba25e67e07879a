use crate::{debug_if_enabled, trace_if_enabled};
use crate::events::ForegroundState;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Подписчик на смену состояния переднего плана.
///
/// Вызывается на сериализованном контексте рассылки; не должен надолго его блокировать.
pub trait ForegroundListener: Send + Sync {
    fn on_foreground_state_change(&self, new_state: ForegroundState);
}

impl<F> ForegroundListener for F
where
    F: Fn(ForegroundState) + Send + Sync,
{
    fn on_foreground_state_change(&self, new_state: ForegroundState) {
        self(new_state)
    }
}

/// Set of subscribers plus an ordered outbox of notifications to deliver.
///
/// Notifications are queued while the caller holds the manager's serialization lock and
/// delivered by `flush` after the lock is released. Only one thread delivers at a time,
/// so listeners see notifications in the order they were queued, and a listener may call
/// back into the manager or mutate the set from inside its callback.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: DashMap<usize, Arc<dyn ForegroundListener>>,
    outbox: Mutex<VecDeque<ForegroundState>>,
    delivering: AtomicBool,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавить подписчика. false, если он уже подписан.
    pub fn add(&self, listener: Arc<dyn ForegroundListener>) -> bool {
        let key = listener_key(&listener);
        if self.listeners.contains_key(&key) {
            debug_if_enabled!("Подписчик уже зарегистрирован, повторное добавление пропущено");
            return false;
        }
        self.listeners.insert(key, listener).is_none()
    }

    /// Удалить подписчика. false, если он не был подписан.
    pub fn remove(&self, listener: &Arc<dyn ForegroundListener>) -> bool {
        let removed = self.listeners.remove(&listener_key(listener)).is_some();
        if !removed {
            debug_if_enabled!("Удаление неизвестного подписчика пропущено");
        }
        removed
    }

    pub fn contains(&self, listener: &Arc<dyn ForegroundListener>) -> bool {
        self.listeners.contains_key(&listener_key(listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Поставить уведомление в очередь рассылки
    pub fn enqueue(&self, state: ForegroundState) {
        self.outbox.lock().push_back(state);
    }

    /// Разослать все уведомления из очереди, если рассылку не ведёт другой поток.
    ///
    /// Если рассылку уже ведёт другой поток, `flush` возвращается сразу, а наши
    /// уведомления доставит тот поток сразу после текущего.
    pub fn flush(&self) {
        loop {
            if self
                .delivering
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                // Текущий рассыльщик заберёт и наши уведомления
                return;
            }

            loop {
                let next = self.outbox.lock().pop_front();
                match next {
                    Some(state) => self.notify_listeners(state),
                    None => break,
                }
            }

            self.delivering.store(false, Ordering::Release);

            // Уведомление могло прийти между последней проверкой и сбросом флага
            if self.outbox.lock().is_empty() {
                return;
            }
        }
    }

    fn notify_listeners(&self, state: ForegroundState) {
        info!("Уведомляем подписчиков: приложение перешло в состояние {}", state);

        // Снимок, чтобы подписчики могли менять набор во время рассылки
        let snapshot: Vec<Arc<dyn ForegroundListener>> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        trace_if_enabled!("Рассылка {} для {} подписчиков", state, snapshot.len());

        for listener in snapshot {
            let result = catch_unwind(AssertUnwindSafe(|| {
                listener.on_foreground_state_change(state)
            }));

            if let Err(panic) = result {
                error!(
                    "Подписчик упал при обработке состояния {}: {}",
                    state,
                    panic_message(panic.as_ref())
                );
            }
        }
    }
}

fn listener_key(listener: &Arc<dyn ForegroundListener>) -> usize {
    Arc::as_ptr(listener) as *const () as usize
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "неизвестная паника"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<dyn ForegroundListener>, Arc<Mutex<Vec<ForegroundState>>>) {
        let received: Arc<Mutex<Vec<ForegroundState>>> = Arc::default();
        let sink = Arc::clone(&received);
        let listener: Arc<dyn ForegroundListener> =
            Arc::new(move |state: ForegroundState| sink.lock().push(state));
        (listener, received)
    }

    #[test]
    fn test_add_is_idempotent() {
        let registry = ListenerRegistry::new();
        let (listener, received) = recorder();

        assert!(registry.add(Arc::clone(&listener)));
        assert!(!registry.add(Arc::clone(&listener)));
        assert_eq!(registry.len(), 1);

        registry.enqueue(ForegroundState::InForeground);
        registry.flush();
        assert_eq!(received.lock().as_slice(), &[ForegroundState::InForeground]);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let registry = ListenerRegistry::new();
        let (listener, _) = recorder();

        assert!(!registry.remove(&listener));
        assert!(registry.is_empty());

        registry.add(Arc::clone(&listener));
        assert!(registry.contains(&listener));
        assert!(registry.remove(&listener));
        assert!(!registry.contains(&listener));
    }

    #[test]
    fn test_flush_preserves_order() {
        let registry = ListenerRegistry::new();
        let (listener, received) = recorder();
        registry.add(listener);

        registry.enqueue(ForegroundState::InForeground);
        registry.enqueue(ForegroundState::NotInForeground);
        registry.flush();

        assert_eq!(
            received.lock().as_slice(),
            &[ForegroundState::InForeground, ForegroundState::NotInForeground]
        );

        // Пустая очередь - ничего не рассылается
        registry.flush();
        assert_eq!(received.lock().len(), 2);
    }

    #[test]
    fn test_panicking_listener_does_not_stop_others() {
        let registry = ListenerRegistry::new();
        let (first, first_received) = recorder();
        let (last, last_received) = recorder();
        let faulty: Arc<dyn ForegroundListener> = Arc::new(|_state: ForegroundState| {
            panic!("подписчик сломан");
        });

        registry.add(first);
        registry.add(faulty);
        registry.add(last);

        registry.enqueue(ForegroundState::InForeground);
        registry.flush();

        assert_eq!(first_received.lock().len(), 1);
        assert_eq!(last_received.lock().len(), 1);

        // Рассыльщик не остался занятым после паники
        registry.enqueue(ForegroundState::NotInForeground);
        registry.flush();
        assert_eq!(first_received.lock().len(), 2);
    }

    #[test]
    fn test_listener_can_mutate_set_during_dispatch() {
        let registry = Arc::new(ListenerRegistry::new());
        let (late, late_received) = recorder();

        let registry_for_listener = Arc::clone(&registry);
        let late_for_listener = Arc::clone(&late);
        let adder: Arc<dyn ForegroundListener> = Arc::new(move |_state: ForegroundState| {
            registry_for_listener.add(Arc::clone(&late_for_listener));
        });
        registry.add(adder);

        registry.enqueue(ForegroundState::InForeground);
        registry.flush();

        // Добавленный во время рассылки подписчик получает только следующие уведомления
        assert!(registry.contains(&late));
        assert!(late_received.lock().is_empty());

        registry.enqueue(ForegroundState::NotInForeground);
        registry.flush();
        assert_eq!(late_received.lock().as_slice(), &[ForegroundState::NotInForeground]);
    }

    #[test]
    fn test_flush_returns_while_other_thread_delivers() {
        use std::sync::mpsc;

        let registry = Arc::new(ListenerRegistry::new());
        let (listener, received) = recorder();
        let (entered_tx, entered_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let entered_tx = Mutex::new(entered_tx);
        let release_rx = Mutex::new(release_rx);

        let blocker: Arc<dyn ForegroundListener> = Arc::new(move |state: ForegroundState| {
            if state == ForegroundState::InForeground {
                let _ = entered_tx.lock().send(());
                let _ = release_rx.lock().recv();
            }
        });
        registry.add(blocker);
        registry.add(listener);

        let deliverer = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                registry.enqueue(ForegroundState::InForeground);
                registry.flush();
            })
        };

        entered_rx.recv().unwrap();
        registry.enqueue(ForegroundState::NotInForeground);
        registry.flush();

        // Второй поток вернулся до доставки своего уведомления
        assert!(!received.lock().contains(&ForegroundState::NotInForeground));

        release_tx.send(()).unwrap();
        deliverer.join().unwrap();

        assert_eq!(
            received.lock().as_slice(),
            &[ForegroundState::InForeground, ForegroundState::NotInForeground]
        );
    }

    #[test]
    fn test_notification_queued_from_listener_is_delivered_after_current() {
        let registry = Arc::new(ListenerRegistry::new());
        let (listener, received) = recorder();

        let registry_for_listener = Arc::clone(&registry);
        let requeue: Arc<dyn ForegroundListener> = Arc::new(move |state: ForegroundState| {
            if state == ForegroundState::InForeground {
                registry_for_listener.enqueue(ForegroundState::NotInForeground);
                registry_for_listener.flush();
            }
        });

        registry.add(requeue);
        registry.add(listener);

        registry.enqueue(ForegroundState::InForeground);
        registry.flush();

        assert_eq!(
            received.lock().as_slice(),
            &[ForegroundState::InForeground, ForegroundState::NotInForeground]
        );
    }
}
