use crate::error::{BenchError, Result};
use std::ops::Range;

/// Half-open index range `[start, end)` scanned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub start: u64,
    pub end: u64,
}

impl Partition {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<u64> {
        self.start..self.end
    }
}

/// Split `[0, space)` into `workers` contiguous ranges.
///
/// Each worker gets `space / workers` indices and the last one also takes the
/// remainder. With more workers than indices the leading partitions are
/// empty and the last covers the whole space.
///
/// # Examples
///
/// ```
/// use crack_bench::partition::{partition, Partition};
///
/// let parts = partition(100, 3).unwrap();
/// assert_eq!(parts[2], Partition { start: 66, end: 100 });
/// ```
pub fn partition(space: u64, workers: usize) -> Result<Vec<Partition>> {
    if workers == 0 {
        return Err(BenchError::InvalidConfig(
            "worker count must be at least 1".to_string(),
        ));
    }

    let count = workers as u64;
    let chunk = space / count;

    Ok((0..count)
        .map(|i| Partition {
            start: i * chunk,
            end: if i == count - 1 { space } else { (i + 1) * chunk },
        })
        .collect())
}
