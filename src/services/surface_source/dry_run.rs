use crate::config::Config;
use crate::error::Result;
use crate::services::ForegroundManager;
use std::sync::Arc;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tracing::info;

use super::command::SurfaceCommand;
use super::r#trait::SurfaceSourceTrait;
use super::stage::SurfaceStage;

pub struct DryRunSource {
    config: Arc<Config>,
    stage: SurfaceStage,
}

impl DryRunSource {
    pub fn new(config: Arc<Config>, manager: Arc<ForegroundManager>) -> Self {
        Self {
            config,
            stage: SurfaceStage::new(manager, "DryRun"),
        }
    }

    /// Сценарий: запуск, поворот экрана, реклама, настоящий уход в фон
    pub fn scenario(validation_window: Duration, step: Duration) -> Vec<SurfaceCommand> {
        use SurfaceCommand::*;

        vec![
            // Запуск приложения
            Show("Main".into()),
            // Поворот: старая поверхность скрывается, новая показывается
            Hide("Main".into()),
            Show("MainRotated".into()),
            // Полноэкранная реклама поверх приложения
            Hide("MainRotated".into()),
            Show("Ad".into()),
            Hide("Ad".into()),
            Show("MainRotated".into()),
            State,
            // Пользователь действительно ушёл из приложения
            Hide("MainRotated".into()),
            Wait(validation_window + step),
            State,
            Destroy("MainRotated".into()),
            Destroy("Ad".into()),
            Destroy("Main".into()),
        ]
    }

    /// Шаги идут с равным интервалом и после долгого ожидания не догоняют пропущенные тики
    fn pacing(step: Duration) -> Interval {
        let mut interval = interval(step);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    async fn run_impl(mut self) -> Result<()> {
        info!("Dry-run режим - SurfaceSource работает в режиме эмуляции");

        let step = Duration::from_millis(self.config.source.step_interval_ms);
        let steps = Self::scenario(self.config.notifier.validation_window(), step);

        let mut step_index = 0;
        let mut interval = Self::pacing(step);

        loop {
            interval.tick().await;

            let command = &steps[step_index];
            info!("Dry-run: эмулируем '{}'", command);
            self.stage.apply(command).await?;

            step_index = (step_index + 1) % steps.len();
        }
    }
}

#[async_trait::async_trait]
impl SurfaceSourceTrait for DryRunSource {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ForegroundState;
    use crate::services::ForegroundListener;
    use parking_lot::Mutex;

    #[tokio::test(start_paused = true)]
    async fn test_scenario_notifies_each_genuine_transition_once() {
        let window = Duration::from_secs(30);
        let manager = ForegroundManager::new(window).unwrap();
        let received: Arc<Mutex<Vec<ForegroundState>>> = Arc::default();
        let sink = Arc::clone(&received);
        let listener: Arc<dyn ForegroundListener> =
            Arc::new(move |state: ForegroundState| sink.lock().push(state));
        manager.add_listener(listener);

        let mut stage = SurfaceStage::new(Arc::clone(&manager), "DryRun");
        for command in DryRunSource::scenario(window, Duration::from_secs(1)) {
            stage.apply(&command).await.unwrap();
        }

        assert_eq!(
            received.lock().as_slice(),
            &[ForegroundState::InForeground, ForegroundState::NotInForeground]
        );
        assert_eq!(stage.live_surfaces(), 0);
        assert!(!manager.has_pending_notification());
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_wait_does_not_burst_next_steps() {
        let step = Duration::from_millis(100);
        let mut pacing = DryRunSource::pacing(step);
        assert_eq!(pacing.missed_tick_behavior(), MissedTickBehavior::Delay);

        pacing.tick().await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        // Просроченный тик срабатывает сразу, следующий - только через полный шаг
        let late = tokio::time::Instant::now();
        pacing.tick().await;
        pacing.tick().await;
        assert!(late.elapsed() >= step);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_source_keeps_running() {
        let mut config = Config::default();
        config.source.step_interval_ms = 10;
        config.notifier.validation_window_ms = 100;
        let config = Arc::new(config);

        let manager = ForegroundManager::from_config(&config.notifier).unwrap();
        let source: Box<dyn SurfaceSourceTrait + Send> =
            Box::new(DryRunSource::new(config, Arc::clone(&manager)));

        let handle = tokio::spawn(source.run());
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(manager.is_in_foreground());

        handle.abort();
    }
}
