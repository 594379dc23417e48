//! Прогон бенчмарка: серия замеров параллельного суммирования.

use rayon::ThreadPool;
use std::hint::black_box;
use std::time::{Duration, Instant};
use tracing::debug;

use super::parallel_sum::{generate_sequence, parallel_sum};
use super::report::BenchmarkReport;
use super::stats::LatencyStats;
use crate::config::Config;

/// Количество логических CPU машины.
pub fn logical_cpus() -> usize {
    num_cpus::get()
}

/// Замеряет одно полное параллельное суммирование. Сумма отбрасывается.
pub fn time_run(pool: &ThreadPool, workers: usize, numbers: &[i64]) -> Duration {
    let start = Instant::now();
    black_box(parallel_sum(pool, workers, black_box(numbers)));
    start.elapsed()
}

/// Выполняет `config.runs` последовательных замеров и собирает отчёт.
///
/// Входная последовательность строится заново при каждом вызове.
/// Функция блокирующая, из async-кода её нужно звать через `spawn_blocking`.
pub fn run_benchmark(config: &Config, pool: &ThreadPool) -> BenchmarkReport {
    let numbers = generate_sequence(config.sequence_len);

    let samples: Vec<Duration> = (0..config.runs)
        .map(|_| time_run(pool, config.workers, &numbers))
        .collect();

    let stats = LatencyStats::from_samples(&samples);
    debug!(
        runs = config.runs,
        workers = config.workers,
        average = ?stats.average,
        median = ?stats.median,
        "Benchmark batch finished"
    );

    BenchmarkReport {
        runs: config.runs,
        logical_cpus: logical_cpus(),
        parallelism: pool.current_num_threads(),
        workers: config.workers,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(workers: usize, runs: usize) -> Config {
        Config {
            parallelism: Some(2),
            workers,
            sequence_len: 10_000,
            runs,
            ..Config::default()
        }
    }

    #[test]
    fn test_run_benchmark_collects_every_run() {
        let config = small_config(3, 25);
        let pool = config.build_pool().unwrap();
        let report = run_benchmark(&config, &pool);

        assert_eq!(report.runs, 25);
        assert_eq!(report.stats.num_samples, 25);
        assert_eq!(report.stats.samples.len(), 25);
        assert_eq!(report.workers, 3);
        assert_eq!(report.parallelism, 2);
        assert_eq!(report.logical_cpus, num_cpus::get());
        assert!(report.stats.min <= report.stats.median);
        assert!(report.stats.median <= report.stats.max);
    }

    #[test]
    fn test_run_benchmark_zero_runs() {
        let config = small_config(1, 0);
        let pool = config.build_pool().unwrap();
        let report = run_benchmark(&config, &pool);
        assert!(report.stats.is_empty());
    }

    #[test]
    fn test_time_run_measures_something() {
        let pool = small_config(1, 1).build_pool().unwrap();
        let numbers = generate_sequence(100_000);
        let elapsed = time_run(&pool, 4, &numbers);
        assert!(elapsed < Duration::from_secs(10));
    }
}
