//! Persistence of benchmark records: CSV for spreadsheets, JSON for full reports.

use crate::config::BenchConfig;
use crate::error::Result;
use crate::record::ResultRecord;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "RunID")]
    run_id: u32,
    #[serde(rename = "AlgorithmType")]
    algorithm: String,
    #[serde(rename = "Password")]
    target: &'a str,
    #[serde(rename = "NumCores")]
    worker_count: usize,
    #[serde(rename = "TimeToCrackSec")]
    elapsed_seconds: String,
    #[serde(rename = "GuessesPerSecond")]
    throughput: String,
    #[serde(rename = "MemAllocMB")]
    memory_delta_mb: String,
}

impl<'a> From<&'a ResultRecord> for CsvRow<'a> {
    fn from(record: &'a ResultRecord) -> Self {
        CsvRow {
            run_id: record.run_id,
            algorithm: record.algorithm.to_string(),
            target: &record.target,
            worker_count: record.worker_count,
            elapsed_seconds: format!("{:.6}", record.elapsed_seconds),
            throughput: format!("{:.2}", record.throughput),
            memory_delta_mb: format!("{:.6}", record.memory_delta_mb),
        }
    }
}

/// Write records as CSV with a header row.
///
/// Returns `false` without touching the filesystem when there is nothing to
/// write.
pub fn save_results_to_csv(records: &[ResultRecord], path: &Path) -> Result<bool> {
    if records.is_empty() {
        return Ok(false);
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = records.len(), "performance data saved");
    Ok(true)
}

/// Full session report
#[derive(Debug, Serialize)]
pub struct BenchReport<'a> {
    pub generated_at: String,
    pub config: &'a BenchConfig,
    pub records: &'a [ResultRecord],
}

impl<'a> BenchReport<'a> {
    pub fn new(config: &'a BenchConfig, records: &'a [ResultRecord]) -> Self {
        BenchReport {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            config,
            records,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io_utils::save_to_file(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AlgorithmType;

    fn record(run_id: u32, algorithm: AlgorithmType) -> ResultRecord {
        ResultRecord {
            run_id,
            algorithm,
            target: "0042".to_string(),
            worker_count: 4,
            found: true,
            candidates_scanned: 43,
            elapsed_seconds: 0.5,
            throughput: 86.0,
            memory_delta_mb: 0.25,
        }
    }

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let records = vec![
            record(1, AlgorithmType::Sequential),
            record(1, AlgorithmType::Concurrent),
        ];

        assert!(save_results_to_csv(&records, &path).unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "RunID,AlgorithmType,Password,NumCores,TimeToCrackSec,GuessesPerSecond,MemAllocMB"
        );
        assert_eq!(lines[1], "1,Sequential,0042,4,0.500000,86.00,0.250000");
        assert_eq!(lines[2], "1,Concurrent,0042,4,0.500000,86.00,0.250000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_records_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert!(!save_results_to_csv(&[], &path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let config = BenchConfig::default();
        let records = vec![record(2, AlgorithmType::Concurrent)];

        BenchReport::new(&config, &records).save(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["records"][0]["run_id"], 2);
        assert_eq!(value["records"][0]["algorithm"], "Concurrent");
        assert!(value["generated_at"].is_string());
    }
}
