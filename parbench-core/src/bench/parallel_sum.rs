//! Параллельное суммирование последовательности по партициям.
//!
//! Последовательность делится на `workers` непрерывных диапазонов, каждый
//! диапазон суммируется отдельной задачей на пуле rayon, частичные суммы
//! складываются в общий атомарный аккумулятор.

use rayon::ThreadPool;
use std::ops::Range;
use std::sync::atomic::{AtomicI64, Ordering};

/// Строит последовательность `0..len`.
pub fn generate_sequence(len: usize) -> Vec<i64> {
    (0..len as i64).collect()
}

/// Делит `len` элементов на `workers` непрерывных полуинтервалов.
///
/// Шаг равен `len / workers`, последняя партиция забирает остаток. Если
/// воркеров больше, чем элементов, первые партиции пустые. Нулевое
/// количество воркеров трактуется как один.
///
/// # Пример
///
/// ```
/// use parbench_core::bench::partition;
///
/// assert_eq!(partition(10, 3), vec![0..3, 3..6, 6..10]);
/// ```
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let stride = len / workers;

    (0..workers)
        .map(|index| {
            let start = index * stride;
            let end = if index == workers - 1 {
                len
            } else {
                start + stride
            };
            start..end
        })
        .collect()
}

/// Суммирует `numbers` силами `workers` параллельных задач на `pool`.
///
/// Блокирует вызывающий поток, пока все задачи не добавят свою частичную
/// сумму в аккумулятор.
pub fn parallel_sum(pool: &ThreadPool, workers: usize, numbers: &[i64]) -> i64 {
    let total = AtomicI64::new(0);

    pool.scope(|scope| {
        for range in partition(numbers.len(), workers) {
            let part = &numbers[range];
            let total = &total;
            scope.spawn(move |_| {
                let partial: i64 = part.iter().sum();
                // Порядок сложения не важен, join скоупа даёт видимость результата.
                total.fetch_add(partial, Ordering::Relaxed);
            });
        }
    });

    total.into_inner()
}
