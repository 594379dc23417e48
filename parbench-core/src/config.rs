//! Конфигурация бенчмарка.
//!
//! Параметры читаются один раз при старте из переменных окружения и дальше
//! передаются в обработчик запросов через `Arc<Config>`. Ошибки разбора не
//! фатальны: пишется предупреждение и используется значение по умолчанию.

use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::net::{Ipv4Addr, SocketAddr};
use std::num::ParseIntError;
use thiserror::Error;
use tracing::warn;

/// Переменная окружения с потолком параллелизма (число потоков пула воркеров).
pub const PARALLELISM_ENV: &str = "GOMAXPROCS";
/// Переменная окружения с количеством воркеров на одно суммирование.
pub const WORKERS_ENV: &str = "NUM_GOROUTINES";

pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_SEQUENCE_LEN: usize = 10_000_000;
pub const DEFAULT_RUNS: usize = 1000;
pub const DEFAULT_PORT: u16 = 8080;
/// Верхняя граница потолка параллелизма: каждый поток пула это поток ОС.
pub const MAX_PARALLELISM: usize = 1024;

/// Ошибка разбора значения переменной окружения.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} environment is incorrect: {value:?} is not an integer: {source}")]
    InvalidInteger {
        var: &'static str,
        value: String,
        source: ParseIntError,
    },
    #[error("{var} environment is incorrect: {value} must be at least 1")]
    OutOfRange { var: &'static str, value: i64 },
}

/// Настройки бенчмарка.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Потолок параллелизма. `None` означает количество логических CPU.
    pub parallelism: Option<usize>,
    /// Количество воркеров (партиций) в одном суммировании, всегда >= 1.
    pub workers: usize,
    /// Длина входной последовательности.
    pub sequence_len: usize,
    /// Количество замеров на один запрос.
    pub runs: usize,
    /// Адрес для прослушивания.
    pub addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallelism: None,
            workers: DEFAULT_WORKERS,
            sequence_len: DEFAULT_SEQUENCE_LEN,
            runs: DEFAULT_RUNS,
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
        }
    }
}

impl Config {
    /// Читает конфигурацию из переменных окружения процесса.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Строит конфигурацию, запрашивая значения переменных через `lookup`.
    ///
    /// Пустое значение трактуется как отсутствующее. Некорректное значение
    /// логируется через `warn!` и заменяется значением по умолчанию.
    ///
    /// # Пример
    ///
    /// ```
    /// use parbench_core::config::Config;
    ///
    /// let config = Config::from_lookup(|key| match key {
    ///     "NUM_GOROUTINES" => Some("4".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.workers, 4);
    /// assert_eq!(config.parallelism, None);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parallelism = match parse_positive(PARALLELISM_ENV, lookup(PARALLELISM_ENV)) {
            Ok(Some(value)) if value > MAX_PARALLELISM => {
                warn!(
                    "{PARALLELISM_ENV}={value} exceeds the maximum, clamping to {MAX_PARALLELISM}"
                );
                Some(MAX_PARALLELISM)
            }
            Ok(value) => value,
            Err(err) => {
                warn!("{err}, keeping the default parallelism ceiling");
                None
            }
        };

        let workers = match parse_positive(WORKERS_ENV, lookup(WORKERS_ENV)) {
            Ok(value) => value.unwrap_or(DEFAULT_WORKERS),
            Err(err) => {
                warn!("{err}, falling back to {DEFAULT_WORKERS} worker");
                DEFAULT_WORKERS
            }
        };

        Self {
            parallelism,
            workers,
            ..Self::default()
        }
    }

    /// Эффективный потолок параллелизма, не больше `MAX_PARALLELISM`.
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism
            .unwrap_or_else(num_cpus::get)
            .clamp(1, MAX_PARALLELISM)
    }

    /// Создаёт пул потоков, на котором выполняются воркеры суммирования.
    ///
    /// Размер пула равен потолку параллелизма. Если пул заданного размера
    /// создать не удалось, пишется предупреждение и создаётся пул размером
    /// в количество логических CPU.
    pub fn build_pool(&self) -> Result<ThreadPool> {
        let threads = self.effective_parallelism();
        match worker_pool(threads) {
            Ok(pool) => Ok(pool),
            Err(err) => {
                let fallback = num_cpus::get();
                warn!(
                    "failed to build worker pool with {threads} threads: {err}, falling back to {fallback}"
                );
                worker_pool(fallback).context("failed to build worker thread pool")
            }
        }
    }
}

fn worker_pool(threads: usize) -> Result<ThreadPool, rayon::ThreadPoolBuildError> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("parbench-worker-{index}"))
        .build()
}

/// Разбирает положительное целое. `Ok(None)`, если переменная не задана.
fn parse_positive(var: &'static str, raw: Option<String>) -> Result<Option<usize>, ConfigError> {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    let value = raw.parse::<i64>().map_err(|source| ConfigError::InvalidInteger {
        var,
        value: raw.clone(),
        source,
    })?;

    if value < 1 {
        return Err(ConfigError::OutOfRange { var, value });
    }

    usize::try_from(value)
        .map(Some)
        .map_err(|_| ConfigError::OutOfRange { var, value })
}
