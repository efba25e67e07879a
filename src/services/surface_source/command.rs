use crate::error::{FgError, Result};
use crate::fg_error;
use std::fmt;
use std::time::Duration;

/// Команда сценария для источника поверхностей
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCommand {
    /// Поверхность стала видимой (создаётся при первом упоминании)
    Show(String),
    /// Поверхность перестала быть видимой
    Hide(String),
    /// Поверхность уничтожена без скрытия
    Destroy(String),
    /// Пауза между событиями
    Wait(Duration),
    /// Вывести текущее состояние в лог
    State,
}

impl SurfaceCommand {
    /// Разобрать строку сценария. Пустые строки и комментарии `#` дают `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_lowercase();
        let argument = parts.next();

        if parts.next().is_some() {
            return FgError::invalid_command(format!("лишние аргументы: '{}'", line));
        }

        let command = match (verb.as_str(), argument) {
            ("show", Some(name)) => Self::Show(name.to_string()),
            ("hide", Some(name)) => Self::Hide(name.to_string()),
            ("destroy", Some(name)) => Self::Destroy(name.to_string()),
            ("wait", Some(ms)) => {
                let ms: u64 = ms
                    .parse()
                    .map_err(|_| fg_error!(invalid_command, "неверная длительность '{}'", ms))?;
                Self::Wait(Duration::from_millis(ms))
            }
            ("state", None) => Self::State,
            ("show" | "hide" | "destroy" | "wait", None) => {
                return FgError::invalid_command(format!("'{}' требует аргумент", verb));
            }
            _ => return FgError::invalid_command(format!("неизвестная команда '{}'", line)),
        };

        Ok(Some(command))
    }
}

impl fmt::Display for SurfaceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show(name) => write!(f, "show {}", name),
            Self::Hide(name) => write!(f, "hide {}", name),
            Self::Destroy(name) => write!(f, "destroy {}", name),
            Self::Wait(duration) => write!(f, "wait {}", duration.as_millis()),
            Self::State => write!(f, "state"),
        }
    }
}
