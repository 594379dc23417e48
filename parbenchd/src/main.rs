use anyhow::Result;
use parbench_core::{config::Config, run_daemon};
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Окружение читается один раз, до старта сервера
    let config = Config::from_env();

    let (shutdown_tx, shutdown_rx) = watch::channel(());

    tokio::spawn(async move {
        let signal_name = shutdown_signal().await;
        tracing::info!("Received {}, initiating graceful shutdown", signal_name);
        let _ = shutdown_tx.send(());
    });

    run_daemon(config, shutdown_rx).await
}

/// Ждёт SIGINT или SIGTERM и возвращает имя полученного сигнала.
#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    let mut terminate = match unix_signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}, waiting for SIGINT only", e);
            let _ = signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = signal::ctrl_c() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    let _ = signal::ctrl_c().await;
    "Ctrl-C"
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    #[tokio::test]
    async fn test_sigterm_triggers_shutdown() {
        // Обработчик SIGTERM ставится заранее, чтобы сигнал не завершил тестовый процесс
        let _guard = unix_signal(SignalKind::terminate()).unwrap();

        let waiter = tokio::spawn(shutdown_signal());
        tokio::time::sleep(Duration::from_millis(100)).await;

        // SAFETY: kill с собственным pid только доставляет сигнал процессу.
        let rc = unsafe { libc::kill(libc::getpid(), libc::SIGTERM) };
        assert_eq!(rc, 0);

        let received = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("SIGTERM was not observed")
            .unwrap();
        assert_eq!(received, "SIGTERM");
    }
}
