use serde::{Deserialize, Serialize};
use std::fmt;

/// Состояние приложения относительно переднего плана
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForegroundState {
    InForeground,
    NotInForeground,
}

impl ForegroundState {
    /// Состояние, соответствующее наличию (или отсутствию) видимой поверхности
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            Self::InForeground
        } else {
            Self::NotInForeground
        }
    }

    pub fn is_in_foreground(self) -> bool {
        matches!(self, Self::InForeground)
    }
}

impl Default for ForegroundState {
    fn default() -> Self {
        Self::NotInForeground
    }
}

impl fmt::Display for ForegroundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InForeground => write!(f, "IN_FOREGROUND"),
            Self::NotInForeground => write!(f, "NOT_IN_FOREGROUND"),
        }
    }
}
