use crate::config::Config;
use crate::error::Result;
use crate::services::ForegroundManager;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::command::SurfaceCommand;
use super::r#trait::SurfaceSourceTrait;
use super::stage::SurfaceStage;

/// Источник, читающий команды построчно из файла или stdin
pub struct ScriptSource {
    config: Arc<Config>,
    stage: SurfaceStage,
}

impl ScriptSource {
    pub fn new(config: Arc<Config>, manager: Arc<ForegroundManager>) -> Self {
        Self {
            config,
            stage: SurfaceStage::new(manager, "Script"),
        }
    }

    async fn run_impl(mut self) -> Result<()> {
        let applied = match self.config.script_path().map(str::to_string) {
            Some(path) => {
                info!("Чтение сценария из файла: {}", path);
                let file = tokio::fs::File::open(&path).await?;
                self.run_lines(BufReader::new(file)).await?
            }
            None => {
                info!("Чтение сценария из stdin");
                self.run_lines(BufReader::new(tokio::io::stdin())).await?
            }
        };

        if applied == 0 {
            warn!("Сценарий не содержал ни одной команды");
        }
        Ok(())
    }

    /// Выполнить все команды из потока строк. Неверные строки пропускаются.
    pub async fn run_lines<R>(&mut self, reader: R) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut line_number = 0;
        let mut applied = 0;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;

            match SurfaceCommand::parse(&line) {
                Ok(Some(command)) => {
                    self.stage.apply(&command).await?;
                    applied += 1;
                }
                Ok(None) => {}
                Err(e) => warn!("Строка {} пропущена: {}", line_number, e),
            }
        }

        info!("Сценарий завершён: выполнено {} команд", applied);
        Ok(applied)
    }
}

#[async_trait::async_trait]
impl SurfaceSourceTrait for ScriptSource {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
