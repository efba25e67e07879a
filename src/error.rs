use thiserror::Error;

#[derive(Error, Debug)]
pub enum FgError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Нет активного tokio runtime: {0}")]
    NoRuntime(String),

    #[error("Неверная команда: {0}")]
    InvalidCommand(String),
}

impl FgError {
    pub fn invalid_command<T>(msg: impl Into<String>) -> Result<T> {
        Err(FgError::InvalidCommand(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, FgError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! fg_error {
    (no_runtime, $($arg:tt)*) => {
        $crate::error::FgError::NoRuntime(format!($($arg)*))
    };
    (invalid_command, $($arg:tt)*) => {
        $crate::error::FgError::InvalidCommand(format!($($arg)*))
    };
}
