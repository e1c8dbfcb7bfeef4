use crate::alloc::{allocated_bytes, delta_mb};
use crate::candidate::{random_target, validate_target};
use crate::config::{BenchConfig, RunMode};
use crate::error::{BenchError, Result};
use crate::record::{aggregate, AlgorithmType, ResultRecord};
use crate::search::{search_concurrent, search_sequential};
use rand::Rng;
use tracing::info;

/// Run `repetitions` rounds of one searcher against every target.
///
/// Records come back run-major then target-minor, exactly in the order they
/// were produced. Duplicate targets are kept.
///
/// # Examples
///
/// ```
/// use crack_bench::{run_benchmark, AlgorithmType, BenchConfig};
///
/// let config = BenchConfig {
///     password_length: 3,
///     repetitions: 1,
///     worker_count: 2,
///     ..BenchConfig::default()
/// };
/// let targets = vec!["123".to_string(), "999".to_string()];
///
/// let records = run_benchmark(&config, &targets, 2, AlgorithmType::Concurrent).unwrap();
/// assert_eq!(records.len(), 4);
/// assert!(records.iter().all(|r| r.found));
/// ```
pub fn run_benchmark(
    config: &BenchConfig,
    targets: &[String],
    repetitions: u32,
    kind: AlgorithmType,
) -> Result<Vec<ResultRecord>> {
    run_benchmark_with_progress(config, targets, repetitions, kind, |_| {})
}

/// Like [`run_benchmark`], calling `progress` after each record is produced
pub fn run_benchmark_with_progress<F>(
    config: &BenchConfig,
    targets: &[String],
    repetitions: u32,
    kind: AlgorithmType,
    mut progress: F,
) -> Result<Vec<ResultRecord>>
where
    F: FnMut(&ResultRecord),
{
    config.validate()?;
    if repetitions == 0 {
        return Err(BenchError::InvalidConfig(
            "number of runs must be positive".to_string(),
        ));
    }
    for target in targets {
        validate_target(target, config.password_length)?;
    }

    let width = config.password_length;
    let space = config.search_space()?;
    let worker_count = match kind {
        AlgorithmType::Sequential => 1,
        AlgorithmType::Concurrent => config.worker_count,
    };

    info!(
        algorithm = %kind,
        workers = worker_count,
        runs = repetitions,
        targets = targets.len(),
        space,
        "starting benchmark"
    );

    let mut records = Vec::new();

    for run_id in 1..=repetitions {
        for target in targets {
            let before = allocated_bytes();
            let outcome = match kind {
                AlgorithmType::Sequential => search_sequential(target, width, space),
                AlgorithmType::Concurrent => {
                    search_concurrent(target, width, space, config.worker_count)?
                }
            };
            let memory_delta_mb = delta_mb(before, allocated_bytes());

            let record = aggregate(
                &outcome,
                run_id,
                kind,
                target,
                worker_count,
                outcome.candidates_scanned,
                memory_delta_mb,
            );
            progress(&record);
            records.push(record);
        }
    }

    Ok(records)
}

/// Targets from the configuration, or one random target when none are set
pub fn resolve_targets<R: Rng + ?Sized>(config: &BenchConfig, rng: &mut R) -> Result<Vec<String>> {
    if config.targets.is_empty() {
        Ok(vec![random_target(config.password_length, rng)?])
    } else {
        Ok(config.targets.clone())
    }
}

/// Run every searcher selected by `config.mode`.
///
/// In `Both` mode the sequential records come first, followed by the
/// concurrent ones.
pub fn run_session<F>(config: &BenchConfig, targets: &[String], mut progress: F) -> Result<Vec<ResultRecord>>
where
    F: FnMut(&ResultRecord),
{
    let kinds: &[AlgorithmType] = match config.mode {
        RunMode::Sequential => &[AlgorithmType::Sequential],
        RunMode::Concurrent => &[AlgorithmType::Concurrent],
        RunMode::Both => &[AlgorithmType::Sequential, AlgorithmType::Concurrent],
    };

    let mut records = Vec::new();
    for &kind in kinds {
        records.extend(run_benchmark_with_progress(
            config,
            targets,
            config.repetitions,
            kind,
            &mut progress,
        )?);
    }

    Ok(records)
}
