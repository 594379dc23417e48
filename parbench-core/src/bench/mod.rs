//! Бенчмарк параллельного суммирования и статистика по замерам.

pub mod parallel_sum;
pub mod report;
pub mod runner;
pub mod stats;

pub use parallel_sum::{generate_sequence, parallel_sum, partition};
pub use report::BenchmarkReport;
pub use runner::{logical_cpus, run_benchmark, time_run};
pub use stats::LatencyStats;
