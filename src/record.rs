use crate::search::SearchOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which searcher produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmType {
    Sequential,
    Concurrent,
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmType::Sequential => write!(f, "Sequential"),
            AlgorithmType::Concurrent => write!(f, "Concurrent"),
        }
    }
}

/// One measurement for a (run, target) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub run_id: u32,
    pub algorithm: AlgorithmType,
    pub target: String,
    pub worker_count: usize,
    pub found: bool,
    pub candidates_scanned: u64,
    pub elapsed_seconds: f64,
    /// Candidates per second, `f64::INFINITY` when elapsed time rounds to zero
    pub throughput: f64,
    pub memory_delta_mb: f64,
}

/// Candidates per second for `scanned` comparisons in `elapsed_seconds`
pub fn throughput(scanned: u64, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds > 0.0 {
        scanned as f64 / elapsed_seconds
    } else {
        f64::INFINITY
    }
}

/// Package a search outcome into a uniform record.
///
/// The same derivation is used for both searchers so their throughput
/// figures are comparable.
pub fn aggregate(
    outcome: &SearchOutcome,
    run_id: u32,
    algorithm: AlgorithmType,
    target: &str,
    worker_count: usize,
    candidates_scanned: u64,
    memory_delta_mb: f64,
) -> ResultRecord {
    let elapsed_seconds = outcome.elapsed.as_secs_f64();

    ResultRecord {
        run_id,
        algorithm,
        target: target.to_string(),
        worker_count,
        found: outcome.found,
        candidates_scanned,
        elapsed_seconds,
        throughput: throughput(candidates_scanned, elapsed_seconds),
        memory_delta_mb,
    }
}

/// Averages over all records of one algorithm
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmSummary {
    pub algorithm: AlgorithmType,
    pub worker_count: usize,
    pub runs: usize,
    pub found: usize,
    pub mean_elapsed_seconds: f64,
    pub mean_throughput: f64,
}

/// Per-algorithm averages, sequential first. Unbounded throughputs are
/// left out of the mean.
pub fn summarize(records: &[ResultRecord]) -> Vec<AlgorithmSummary> {
    [AlgorithmType::Sequential, AlgorithmType::Concurrent]
        .into_iter()
        .filter_map(|algorithm| {
            let group: Vec<&ResultRecord> =
                records.iter().filter(|r| r.algorithm == algorithm).collect();
            if group.is_empty() {
                return None;
            }

            let finite: Vec<f64> = group
                .iter()
                .map(|r| r.throughput)
                .filter(|t| t.is_finite())
                .collect();
            let mean_throughput = if finite.is_empty() {
                f64::INFINITY
            } else {
                finite.iter().sum::<f64>() / finite.len() as f64
            };

            Some(AlgorithmSummary {
                algorithm,
                worker_count: group[0].worker_count,
                runs: group.len(),
                found: group.iter().filter(|r| r.found).count(),
                mean_elapsed_seconds: group.iter().map(|r| r.elapsed_seconds).sum::<f64>()
                    / group.len() as f64,
                mean_throughput,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_summarize_groups_by_algorithm() {
        let make = |algorithm, elapsed: f64, throughput: f64| ResultRecord {
            run_id: 1,
            algorithm,
            target: "42".to_string(),
            worker_count: 1,
            found: true,
            candidates_scanned: 43,
            elapsed_seconds: elapsed,
            throughput,
            memory_delta_mb: 0.0,
        };
        let records = vec![
            make(AlgorithmType::Concurrent, 1.0, 10.0),
            make(AlgorithmType::Sequential, 2.0, 4.0),
            make(AlgorithmType::Sequential, 4.0, f64::INFINITY),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].algorithm, AlgorithmType::Sequential);
        assert_eq!(summary[0].runs, 2);
        assert!((summary[0].mean_elapsed_seconds - 3.0).abs() < 1e-9);
        assert!((summary[0].mean_throughput - 4.0).abs() < 1e-9);
        assert_eq!(summary[1].algorithm, AlgorithmType::Concurrent);
        assert!(summarize(&[]).is_empty());
    }

    fn outcome(elapsed: Duration) -> SearchOutcome {
        SearchOutcome {
            found: true,
            elapsed,
            candidates_scanned: 1_000,
            matched_index: Some(999),
        }
    }

    #[test]
    fn test_throughput_matches_ratio() {
        let record = aggregate(
            &outcome(Duration::from_millis(250)),
            1,
            AlgorithmType::Sequential,
            "0999",
            1,
            1_000,
            0.0,
        );
        assert!((record.throughput - 4_000.0).abs() < 1e-6);
        assert!((record.elapsed_seconds - 0.25).abs() < 1e-9);
        assert_eq!(record.target, "0999");
        assert!(record.found);
    }

    #[test]
    fn test_zero_elapsed_is_unbounded() {
        let record = aggregate(
            &outcome(Duration::ZERO),
            3,
            AlgorithmType::Concurrent,
            "0999",
            4,
            1_000,
            0.5,
        );
        assert!(record.throughput.is_infinite());
        assert_eq!(record.run_id, 3);
        assert_eq!(record.worker_count, 4);
        assert_eq!(record.memory_delta_mb, 0.5);
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(AlgorithmType::Sequential.to_string(), "Sequential");
        assert_eq!(AlgorithmType::Concurrent.to_string(), "Concurrent");
    }
}
