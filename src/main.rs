use anyhow::Result;
use clap::Parser;
use foreground_guard::config::Config;
use foreground_guard::events::ForegroundState;
use foreground_guard::services::{create_surface_source, ForegroundListener, ForegroundManager};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "fgguard")]
#[command(about = "Отслеживание переднего плана приложения с подавлением ложных переходов")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "fgguard.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция поверхностей)
    #[arg(long)]
    dry_run: bool,

    /// Файл сценария с командами show/hide/destroy/wait/state ("-" для stdin)
    #[arg(long)]
    script: Option<String>,

    /// Уровень логирования (перекрывает конфигурацию)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let mut config = Config::load(&args.config)?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(script) = &args.script {
        config.source.mode = "script".to_string();
        config.source.script_path = Some(script.clone());
    }
    config.validate()?;

    // Инициализация системы логирования
    init_tracing(&config.logging.level, &config.logging.format)?;

    info!("Запуск fgguard v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - поверхности эмулируются");
    }

    let config = Arc::new(config);

    // Инициализация компонентов
    let manager = ForegroundManager::from_config(&config.notifier)?;
    let logger: Arc<dyn ForegroundListener> = Arc::new(|state: ForegroundState| match state {
        ForegroundState::InForeground => info!("Приложение на переднем плане"),
        ForegroundState::NotInForeground => info!("Приложение ушло в фон"),
    });
    manager.add_listener(logger);

    let source = create_surface_source(config.clone(), manager.clone(), args.dry_run)?;

    info!("Все компоненты инициализированы");

    let mut source_handle = tokio::spawn(async move {
        if let Err(e) = source.run().await {
            error!("Ошибка в SurfaceSource: {}", e);
        }
    });

    // Ожидание конца сценария или сигнала завершения
    tokio::select! {
        _ = &mut source_handle => {
            info!("Источник событий завершил работу");
        }
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
            }
            source_handle.abort();
        }
    }

    info!("Завершение работы...");
    manager.shutdown();

    info!(
        "fgguard завершил работу в состоянии {}",
        manager.state()
    );
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let (compact, full) = match format {
        "full" => (None, Some(tracing_subscriber::fmt::layer())),
        _ => (Some(tracing_subscriber::fmt::layer().compact()), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(full)
        .init();

    Ok(())
}
