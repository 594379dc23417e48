//! Статистика по замерам латентности.

use std::time::Duration;

/// Сводка по набору замеров: среднее, медиана, минимум и максимум.
///
/// `samples` хранит отсортированную по возрастанию копию замеров.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencyStats {
    pub average: Duration,
    pub min: Duration,
    pub max: Duration,
    pub median: Duration,
    pub samples: Vec<Duration>,
    pub num_samples: usize,
}

impl LatencyStats {
    /// Вычисляет сводку по замерам. Входной срез не изменяется.
    ///
    /// Для пустого набора возвращается нулевая сводка.
    ///
    /// # Пример
    ///
    /// ```
    /// use parbench_core::bench::LatencyStats;
    /// use std::time::Duration;
    ///
    /// let samples = [3, 1, 2].map(Duration::from_millis);
    /// let stats = LatencyStats::from_samples(&samples);
    /// assert_eq!(stats.median, Duration::from_millis(2));
    /// assert_eq!(stats.min, Duration::from_millis(1));
    /// ```
    pub fn from_samples(samples: &[Duration]) -> Self {
        let Some(&first) = samples.first() else {
            return Self::default();
        };

        let mut total_nanos: u128 = 0;
        let mut min = first;
        let mut max = first;
        for &sample in samples {
            total_nanos += sample.as_nanos();
            if sample < min {
                min = sample;
            }
            if sample > max {
                max = sample;
            }
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            let (low, high) = (sorted[mid - 1], sorted[mid]);
            low + (high - low) / 2
        } else {
            sorted[mid]
        };

        let average_nanos = total_nanos / samples.len() as u128;
        let average = u64::try_from(average_nanos)
            .map(Duration::from_nanos)
            .unwrap_or(max);

        Self {
            average,
            min,
            max,
            median,
            samples: sorted,
            num_samples: samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }
}
