use crate::candidate::write_candidate;
use crate::error::{BenchError, Result};
use crate::partition::partition;
use rayon::ThreadPoolBuilder;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of one complete search invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub found: bool,
    pub elapsed: Duration,
    /// Comparisons performed across all workers
    pub candidates_scanned: u64,
    /// Global index of the match, if any
    pub matched_index: Option<u64>,
}

/// Cooperative stop signal shared by the workers of one search.
///
/// Once cancelled it stays cancelled.
#[derive(Debug, Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Single-slot publication point for a match. The first publish wins and
/// later ones are discarded.
#[derive(Debug, Default)]
pub struct ResultSlot {
    slot: OnceLock<u64>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when another worker already published
    pub fn publish(&self, index: u64) -> bool {
        self.slot.set(index).is_ok()
    }

    pub fn get(&self) -> Option<u64> {
        self.slot.get().copied()
    }
}

#[derive(Debug, Clone, Copy)]
struct Scan {
    matched: Option<u64>,
    scanned: u64,
}

/// Whether every index in `[0, space)` has a distinct `width`-digit candidate
fn space_fits_width(space: u64, width: usize) -> bool {
    match u32::try_from(width).ok().and_then(|w| 10u64.checked_pow(w)) {
        Some(max) => space <= max,
        None => true,
    }
}

/// Scan `range` in increasing order, stopping at the first match or as soon
/// as `token` is observed cancelled.
fn scan_range(
    target: &[u8],
    width: usize,
    range: Range<u64>,
    token: Option<&CancellationToken>,
) -> Scan {
    let mut buf = vec![0u8; width];
    let mut scanned = 0u64;

    for index in range {
        if token.is_some_and(CancellationToken::is_cancelled) {
            break;
        }

        write_candidate(index, &mut buf);
        scanned += 1;

        if buf == target {
            return Scan {
                matched: Some(index),
                scanned,
            };
        }
    }

    Scan {
        matched: None,
        scanned,
    }
}

/// Scan the whole space `[0, space)` on the calling thread.
///
/// `space` must not exceed `10^width`; larger indices would wrap onto
/// shorter candidates and report a match at the wrong index.
///
/// # Examples
///
/// ```
/// use crack_bench::search_sequential;
///
/// let outcome = search_sequential("0042", 4, 10_000);
/// assert!(outcome.found);
/// assert_eq!(outcome.candidates_scanned, 43);
/// ```
pub fn search_sequential(target: &str, width: usize, space: u64) -> SearchOutcome {
    debug_assert!(
        space_fits_width(space, width),
        "search space {} exceeds 10^{}",
        space,
        width
    );
    let start_time = Instant::now();
    let scan = scan_range(target.as_bytes(), width, 0..space, None);
    let elapsed = start_time.elapsed();

    debug!(
        secret = target,
        found = scan.matched.is_some(),
        scanned = scan.scanned,
        elapsed_secs = elapsed.as_secs_f64(),
        "sequential search finished"
    );

    SearchOutcome {
        found: scan.matched.is_some(),
        elapsed,
        candidates_scanned: scan.scanned,
        matched_index: scan.matched,
    }
}

/// Scan `[0, space)` with one worker per partition.
///
/// Same precondition as [`search_sequential`]: `space <= 10^width`.
///
/// Workers run on a dedicated pool of `workers` threads inside a
/// `rayon::scope`, which returns only once every worker has terminated. A
/// worker that finds the target publishes it into a [`ResultSlot`] and
/// cancels the shared [`CancellationToken`]; siblings check the token before
/// every comparison.
///
/// # Errors
///
/// `InvalidConfig` when `workers` is zero, `ThreadPool` when the pool cannot
/// be built.
///
/// # Examples
///
/// ```
/// use crack_bench::search_concurrent;
///
/// let outcome = search_concurrent("99", 2, 100, 3).unwrap();
/// assert!(outcome.found);
/// assert_eq!(outcome.matched_index, Some(99));
/// ```
pub fn search_concurrent(
    target: &str,
    width: usize,
    space: u64,
    workers: usize,
) -> Result<SearchOutcome> {
    if workers == 0 {
        return Err(BenchError::InvalidConfig(
            "worker count must be at least 1".to_string(),
        ));
    }
    debug_assert!(
        space_fits_width(space, width),
        "search space {} exceeds 10^{}",
        space,
        width
    );

    let start_time = Instant::now();
    let partitions = partition(space, workers)?;
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("search-worker-{}", i))
        .build()?;

    let token = CancellationToken::new();
    let slot = ResultSlot::new();
    let scanned = AtomicU64::new(0);
    let target_bytes = target.as_bytes();

    pool.scope(|s| {
        for (worker, part) in partitions.iter().enumerate() {
            let token = &token;
            let slot = &slot;
            let scanned = &scanned;

            s.spawn(move |_| {
                let scan = scan_range(target_bytes, width, part.range(), Some(token));
                scanned.fetch_add(scan.scanned, Ordering::Relaxed);

                if let Some(index) = scan.matched {
                    slot.publish(index);
                    token.cancel();
                }

                debug!(
                    worker,
                    start = part.start,
                    end = part.end,
                    scanned = scan.scanned,
                    matched = scan.matched.is_some(),
                    "worker finished"
                );
            });
        }
    });

    let elapsed = start_time.elapsed();
    let matched_index = slot.get();
    let candidates_scanned = scanned.load(Ordering::Relaxed);

    debug!(
        secret = target,
        workers,
        found = matched_index.is_some(),
        scanned = candidates_scanned,
        elapsed_secs = elapsed.as_secs_f64(),
        "concurrent search finished"
    );

    Ok(SearchOutcome {
        found: matched_index.is_some(),
        elapsed,
        candidates_scanned,
        matched_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_scans_up_to_match() {
        let outcome = search_sequential("0042", 4, 10_000);
        assert!(outcome.found);
        assert_eq!(outcome.matched_index, Some(42));
        assert_eq!(outcome.candidates_scanned, 43);
    }

    #[test]
    fn test_sequential_exhausts_on_wrong_width() {
        let outcome = search_sequential("12", 4, 10_000);
        assert!(!outcome.found);
        assert_eq!(outcome.matched_index, None);
        assert_eq!(outcome.candidates_scanned, 10_000);
    }

    #[test]
    fn test_concurrent_first_partition() {
        let outcome = search_concurrent("0042", 4, 10_000, 4).unwrap();
        assert!(outcome.found);
        assert_eq!(outcome.matched_index, Some(42));
        assert!(outcome.candidates_scanned <= 10_000);
    }

    #[test]
    fn test_concurrent_last_partition_with_remainder() {
        let outcome = search_concurrent("99", 2, 100, 3).unwrap();
        assert!(outcome.found);
        assert_eq!(outcome.matched_index, Some(99));
    }

    #[test]
    fn test_concurrent_absent_target_exhausts_every_partition() {
        let outcome = search_concurrent("123", 4, 10_000, 3).unwrap();
        assert!(!outcome.found);
        assert_eq!(outcome.candidates_scanned, 10_000);
    }

    #[test]
    fn test_concurrent_more_workers_than_space() {
        let outcome = search_concurrent("7", 1, 10, 16).unwrap();
        assert!(outcome.found);
        assert_eq!(outcome.matched_index, Some(7));
    }

    #[test]
    fn test_concurrent_rejects_zero_workers() {
        assert!(matches!(
            search_concurrent("0042", 4, 10_000, 0),
            Err(BenchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_scan_stops_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let scan = scan_range(b"0042", 4, 0..10_000, Some(&token));
        assert_eq!(scan.scanned, 0);
        assert!(scan.matched.is_none());
    }

    #[test]
    fn test_match_cancels_sibling_workers() {
        let space = 100_000_000;
        let outcome = search_concurrent("00000000", 8, space, 4).unwrap();
        assert!(outcome.found);
        assert_eq!(outcome.matched_index, Some(0));
        // Without cancellation the three siblings would scan 75M candidates
        assert!(outcome.candidates_scanned < space / 2);
    }

    #[test]
    fn test_space_fits_width() {
        assert!(space_fits_width(10_000, 4));
        assert!(space_fits_width(9_999, 4));
        assert!(!space_fits_width(100, 1));
        assert!(space_fits_width(u64::MAX, 25));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "exceeds 10^1")]
    fn test_sequential_rejects_space_wider_than_candidates() {
        search_sequential("0", 1, 100);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "exceeds 10^1")]
    fn test_concurrent_rejects_space_wider_than_candidates() {
        let _ = search_concurrent("0", 1, 100, 3);
    }

    #[test]
    fn test_cancellation_is_monotonic() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_result_slot_first_writer_wins() {
        let slot = ResultSlot::new();
        assert_eq!(slot.get(), None);
        assert!(slot.publish(5));
        assert!(!slot.publish(9));
        assert_eq!(slot.get(), Some(5));
    }

    #[test]
    fn test_repeated_searches_agree() {
        for _ in 0..5 {
            assert!(search_concurrent("31415", 5, 100_000, 4).unwrap().found);
            assert!(search_sequential("31415", 5, 100_000).found);
        }
    }
}
