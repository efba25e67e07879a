use crate::services::DEFAULT_VALIDATION_WINDOW;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub notifier: NotifierConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Сколько ждать подтверждения ухода в фон
    pub validation_window_ms: u64,
}

impl NotifierConfig {
    pub fn validation_window(&self) -> Duration {
        Duration::from_millis(self.validation_window_ms)
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            validation_window_ms: DEFAULT_VALIDATION_WINDOW.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub mode: String,
    #[serde(default)]
    pub script_path: Option<String>,
    pub step_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            notifier: NotifierConfig::default(),
            source: SourceConfig {
                mode: "dry_run".to_string(),
                script_path: None,
                step_interval_ms: 2000,
            },
        }
    }
}

impl Config {
    pub const ENV_PREFIX: &'static str = "FGGUARD_";

    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация окна валидации
        if self.notifier.validation_window_ms == 0 {
            anyhow::bail!("validation_window_ms должно быть больше 0");
        }

        // Валидация источника событий
        match self.source.mode.as_str() {
            "dry_run" | "script" => {}
            _ => anyhow::bail!("Неверный режим источника событий: {}", self.source.mode),
        }

        if self.source.step_interval_ms < 10 {
            anyhow::bail!("step_interval_ms должно быть минимум 10");
        }

        Ok(())
    }

    /// Путь к скрипту; None означает stdin
    pub fn script_path(&self) -> Option<&str> {
        match self.source.script_path.as_deref() {
            None | Some("-") | Some("") => None,
            Some(path) => Some(path),
        }
    }
}
