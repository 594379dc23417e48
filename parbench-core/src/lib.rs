//! Микро-бенчмарк параллельного суммирования, запускаемый по HTTP.
//!
//! На каждый запрос `GET /` строится последовательность `0..N`, она
//! суммируется заданным числом воркеров 1000 раз подряд, а клиент получает
//! текстовый отчёт со средним, медианой, минимумом и максимумом латентности.

pub mod api;
pub mod bench;
pub mod config;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use crate::api::ApiServer;
use crate::bench::logical_cpus;
use config::Config;

/// Запускает сервер бенчмарка и работает до сигнала в `shutdown_rx`.
///
/// Ошибка возвращается, если не удалось создать пул воркеров или занять
/// адрес; для демона это фатально.
pub async fn run_daemon(config: Config, mut shutdown_rx: watch::Receiver<()>) -> Result<()> {
    let pool = config.build_pool()?;
    info!(
        "Starting server with logical CPUs={} and parallelism ceiling={}",
        logical_cpus(),
        pool.current_num_threads()
    );

    let config = Arc::new(config);
    let handle = ApiServer::new(config, Arc::new(pool)).start().await?;

    // Отправитель мог быть уже закрыт, это тоже сигнал к остановке
    let _ = shutdown_rx.changed().await;
    info!("Shutting down benchmark server");

    handle.shutdown().await
}
