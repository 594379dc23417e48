//! HTTP сервер бенчмарка.

use anyhow::{Context, Result};
use axum::{extract::State, http::StatusCode, routing::get, Router};
use rayon::ThreadPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::bench::run_benchmark;
use crate::config::Config;

/// Состояние API сервера.
///
/// Конфигурация и пул воркеров общие для всех запросов и не меняются.
#[derive(Clone)]
pub struct ApiState {
    config: Arc<Config>,
    pool: Arc<ThreadPool>,
}

impl ApiState {
    pub fn new(config: Arc<Config>, pool: Arc<ThreadPool>) -> Self {
        Self { config, pool }
    }
}

/// Обработчик для endpoint `/`.
///
/// Прогоняет бенчмарк на блокирующем пуле tokio и отдаёт отчёт в виде
/// `text/plain`. Запросы не ограничиваются: параллельные запросы делят
/// один пул воркеров.
async fn benchmark_handler(State(state): State<ApiState>) -> Result<String, StatusCode> {
    let ApiState { config, pool } = state;
    info!(
        workers = config.workers,
        runs = config.runs,
        "Running parallel sum benchmark"
    );

    let report = tokio::task::spawn_blocking(move || run_benchmark(&config, &pool))
        .await
        .map_err(|e| {
            error!("Benchmark task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!(
        average = ?report.stats.average,
        median = ?report.stats.median,
        "Benchmark finished"
    );
    Ok(report.to_string())
}

/// Создаёт роутер для API.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(benchmark_handler))
        .with_state(state)
}

/// HTTP сервер бенчмарка.
///
/// Сервер запускается в отдельной задаче и останавливается через handle.
///
/// # Примеры использования
///
/// ```no_run
/// use parbench_core::api::ApiServer;
/// use parbench_core::config::Config;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Arc::new(Config::from_env());
/// let pool = Arc::new(config.build_pool()?);
/// let handle = ApiServer::new(config, pool).start().await?;
///
/// // Сервер работает в фоне
/// println!("listening on {}", handle.local_addr());
///
/// handle.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiServer {
    /// Адрес для прослушивания
    addr: SocketAddr,
    state: ApiState,
}

impl ApiServer {
    /// Создаёт сервер, слушающий `config.addr`.
    pub fn new(config: Arc<Config>, pool: Arc<ThreadPool>) -> Self {
        Self {
            addr: config.addr,
            state: ApiState::new(config, pool),
        }
    }

    /// Запускает сервер в фоновой задаче.
    ///
    /// # Ошибки
    ///
    /// Возвращает ошибку, если не удалось занять адрес.
    pub async fn start(self) -> Result<ApiServerHandle> {
        let listener = TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("Failed to bind server to {}", self.addr))?;
        let local_addr = listener
            .local_addr()
            .context("Failed to read bound server address")?;

        info!("Benchmark server listening on http://{}", local_addr);

        let router = create_router(self.state);
        let server = axum::serve(listener, router);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let task = tokio::spawn(async move {
            let graceful = server.with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });

            if let Err(e) = graceful.await {
                error!("Benchmark server error: {}", e);
            } else {
                info!("Benchmark server stopped");
            }
        });

        Ok(ApiServerHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
            local_addr,
        })
    }
}

/// Handle для управления запущенным сервером.
pub struct ApiServerHandle {
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl ApiServerHandle {
    /// Фактический адрес, на котором слушает сервер (важно при порте 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Останавливает сервер и ждёт завершения серверной задачи.
    ///
    /// # Ошибки
    ///
    /// Возвращает ошибку, если серверная задача уже завершилась или паниковала.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            tx.send(()).map_err(|_| {
                anyhow::anyhow!("Failed to send shutdown signal to server (receiver dropped)")
            })?;
        }
        self.task.await.context("Server task failed")
    }
}
