use crate::events::ForegroundState;
use std::sync::atomic::{AtomicBool, Ordering};

/// Derives the two-valued foreground state from registry content and detects transitions.
///
/// The stored state lives in an atomic so `is_in_foreground` never blocks, while
/// `recompute` is only ever called from inside the manager's serialized section.
pub struct StateEvaluator {
    in_foreground: AtomicBool,
}

impl Default for StateEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl StateEvaluator {
    pub fn new() -> Self {
        Self {
            in_foreground: AtomicBool::new(false),
        }
    }

    /// Пересчитать состояние. Возвращает новое состояние, только если оно изменилось.
    pub fn recompute(&self, currently_visible: bool) -> Option<ForegroundState> {
        let previous = self.in_foreground.swap(currently_visible, Ordering::AcqRel);
        if previous == currently_visible {
            return None;
        }
        Some(ForegroundState::from_visible(currently_visible))
    }

    pub fn is_in_foreground(&self) -> bool {
        self.in_foreground.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ForegroundState {
        ForegroundState::from_visible(self.is_in_foreground())
    }
}
