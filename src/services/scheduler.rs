use crate::{debug_if_enabled, fg_error};
use crate::error::Result;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::info;

/// Вид отложенной задачи. На каждый вид существует не более одной задачи.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    NotifyListeners,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::NotifyListeners => write!(f, "notify_listeners"),
        }
    }
}

/// Идентификатор конкретного запуска задачи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskToken(u64);

impl fmt::Display for TaskToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Запланированная задача вместе с её полезной нагрузкой
#[derive(Debug)]
struct ScheduledTask<T> {
    token: TaskToken,
    payload: T,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Single-slot-per-kind delayed tasks on the tokio timer.
///
/// A fired task does not clear its slot by itself: the callback must claim the slot
/// with `complete(kind, token)`. A task that was canceled after its timer elapsed but
/// before the callback claimed the slot gets `None` there and must do nothing.
pub struct DelayedTasks<T> {
    runtime: Handle,
    slots: DashMap<TaskKind, ScheduledTask<T>>,
    next_token: AtomicU64,
}

impl<T> DelayedTasks<T> {
    /// Создать планировщик на текущем tokio runtime
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| fg_error!(no_runtime, "{}", e))?;
        Ok(Self {
            runtime,
            slots: DashMap::new(),
            next_token: AtomicU64::new(1),
        })
    }

    /// Запланировать `on_fire` через `delay`. Задача того же вида, если она была, отменяется.
    pub fn schedule<F>(&self, kind: TaskKind, delay: Duration, payload: T, on_fire: F) -> TaskToken
    where
        F: FnOnce(TaskToken) + Send + 'static,
    {
        let token = TaskToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        let deadline = Instant::now() + delay;

        let handle = self.runtime.spawn(async move {
            sleep_until(deadline).await;
            on_fire(token);
        });

        let task = ScheduledTask {
            token,
            payload,
            deadline,
            handle,
        };

        if let Some(replaced) = self.slots.insert(kind, task) {
            replaced.handle.abort();
            debug_if_enabled!("Задача {} {} заменена задачей {}", kind, replaced.token, token);
        }

        debug_if_enabled!("Задача {} {} запланирована через {:?}", kind, token, delay);
        token
    }

    /// Отменить ожидающую задачу. Возвращает её полезную нагрузку.
    pub fn cancel(&self, kind: TaskKind) -> Option<T> {
        let (_, task) = self.slots.remove(&kind)?;
        task.handle.abort();
        debug_if_enabled!("Задача {} {} отменена", kind, task.token);
        Some(task.payload)
    }

    /// Забрать слот сработавшей задачей. `None`, если задача уже отменена или заменена.
    pub fn complete(&self, kind: TaskKind, token: TaskToken) -> Option<T> {
        self.slots
            .remove_if(&kind, |_, task| task.token == token)
            .map(|(_, task)| task.payload)
    }

    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Сколько осталось до срабатывания задачи
    pub fn remaining(&self, kind: TaskKind) -> Option<Duration> {
        self.slots
            .get(&kind)
            .map(|task| task.deadline.saturating_duration_since(Instant::now()))
    }

    /// Отменить все задачи
    pub fn cancel_all(&self) -> usize {
        let kinds: Vec<TaskKind> = self.slots.iter().map(|entry| *entry.key()).collect();

        let mut canceled = 0;
        for kind in kinds {
            if let Some((_, task)) = self.slots.remove(&kind) {
                task.handle.abort();
                canceled += 1;
            }
        }

        if canceled > 0 {
            info!("Отменено {} отложенных задач", canceled);
        }
        canceled
    }
}

impl<T: Clone> DelayedTasks<T> {
    pub fn pending(&self, kind: TaskKind) -> Option<T> {
        self.slots.get(&kind).map(|task| task.payload.clone())
    }
}

impl<T> Drop for DelayedTasks<T> {
    fn drop(&mut self) {
        for entry in self.slots.iter() {
            entry.value().handle.abort();
        }
    }
}
