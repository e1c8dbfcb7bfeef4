use crate::candidate::{search_space, validate_target};
use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_BUCKET: &str = "cracking-algorithm-data";
pub const DEFAULT_REGION: &str = "sa-east-1";

/// Which searchers a benchmark session runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Sequential,
    Concurrent,
    #[default]
    Both,
}

impl FromStr for RunMode {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sequential" | "single" | "1" => Ok(RunMode::Sequential),
            "concurrent" | "multi" | "2" => Ok(RunMode::Concurrent),
            "both" | "3" => Ok(RunMode::Both),
            other => Err(BenchError::InvalidConfig(format!(
                "unknown mode '{}', expected sequential, concurrent or both",
                other
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Sequential => write!(f, "sequential"),
            RunMode::Concurrent => write!(f, "concurrent"),
            RunMode::Both => write!(f, "both"),
        }
    }
}

/// Where and how result files are uploaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    pub bucket: String,
    pub region: String,
    /// Static credentials; the default provider chain is used when either is missing
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            bucket: DEFAULT_BUCKET.to_string(),
            region: DEFAULT_REGION.to_string(),
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    pub password_length: usize,
    pub repetitions: u32,
    pub worker_count: usize,
    #[serde(default)]
    pub mode: RunMode,
    /// Empty means a random target is picked when the session starts
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub upload: Option<UploadConfig>,
}

/// Hardware parallelism reported by the OS, at least 1
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            password_length: 8,
            repetitions: 20,
            worker_count: available_workers(),
            mode: RunMode::Both,
            targets: Vec::new(),
            output: None,
            upload: None,
        }
    }
}

impl BenchConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        crate::io_utils::load_from_file(path)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        crate::io_utils::save_to_file(self, path)
    }

    /// Size of the search space, `10^password_length`
    pub fn search_space(&self) -> Result<u64> {
        search_space(self.password_length)
    }

    /// Reject anything that would make a search meaningless before it starts
    pub fn validate(&self) -> Result<()> {
        self.search_space()?;

        if self.repetitions == 0 {
            return Err(BenchError::InvalidConfig(
                "number of runs must be positive".to_string(),
            ));
        }
        if self.worker_count == 0 {
            return Err(BenchError::InvalidConfig(
                "worker count must be positive".to_string(),
            ));
        }
        for target in &self.targets {
            validate_target(target, self.password_length)?;
        }

        Ok(())
    }

    /// CSV file name used when no explicit output is configured
    pub fn default_output_file(&self) -> String {
        match self.mode {
            RunMode::Sequential => "performance_data_1_cores.csv".to_string(),
            RunMode::Concurrent => format!("performance_data_{}_cores.csv", self.worker_count),
            RunMode::Both => "performance_data.csv".to_string(),
        }
    }

    pub fn output_file(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| self.default_output_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BenchConfig {
        BenchConfig {
            password_length: 4,
            repetitions: 2,
            worker_count: 4,
            mode: RunMode::Both,
            targets: vec!["0042".to_string()],
            output: None,
            upload: None,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
        assert_eq!(config().search_space().unwrap(), 10_000);
    }

    #[test]
    fn test_rejects_wrong_target_width() {
        let mut c = config();
        c.targets = vec!["12".to_string()];
        assert!(matches!(c.validate(), Err(BenchError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let mut c = config();
        c.repetitions = 0;
        assert!(c.validate().is_err());

        let mut c = config();
        c.worker_count = 0;
        assert!(c.validate().is_err());

        let mut c = config();
        c.password_length = 0;
        c.targets.clear();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Sequential".parse::<RunMode>().unwrap(), RunMode::Sequential);
        assert_eq!("2".parse::<RunMode>().unwrap(), RunMode::Concurrent);
        assert_eq!("both".parse::<RunMode>().unwrap(), RunMode::Both);
        assert!("fast".parse::<RunMode>().is_err());
    }

    #[test]
    fn test_default_output_file() {
        let mut c = config();
        assert_eq!(c.output_file(), "performance_data.csv");
        c.mode = RunMode::Concurrent;
        assert_eq!(c.output_file(), "performance_data_4_cores.csv");
        c.mode = RunMode::Sequential;
        assert_eq!(c.output_file(), "performance_data_1_cores.csv");
        c.output = Some("out.csv".to_string());
        assert_eq!(c.output_file(), "out.csv");
    }

    #[test]
    fn test_config_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        let mut c = config();
        c.upload = Some(UploadConfig::default());

        c.save_to_file(&path).unwrap();
        let loaded = BenchConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, c);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let json = r#"{ "password_length": 6, "repetitions": 3, "worker_count": 2 }"#;
        let c: BenchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.mode, RunMode::Both);
        assert!(c.targets.is_empty());
        assert!(c.upload.is_none());
    }
}
