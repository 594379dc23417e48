//! Текстовый отчёт, который отдаётся клиенту.

use std::fmt;

use super::stats::LatencyStats;

/// Результат одного запроса к бенчмарку.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkReport {
    pub runs: usize,
    pub logical_cpus: usize,
    /// Потолок параллелизма (размер пула воркеров).
    pub parallelism: usize,
    pub workers: usize,
    pub stats: LatencyStats,
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test Results (across {} runs):", self.runs)?;
        writeln!(
            f,
            "Logical CPUs={} Parallelism ceiling: {}",
            self.logical_cpus, self.parallelism
        )?;
        writeln!(f, "Number of workers: {}", self.workers)?;
        writeln!(f, "Average: {:?}", self.stats.average)?;
        writeln!(f, "Median:  {:?}", self.stats.median)?;
        writeln!(f, "Min:     {:?}", self.stats.min)?;
        writeln!(f, "Max:     {:?}", self.stats.max)
    }
}
