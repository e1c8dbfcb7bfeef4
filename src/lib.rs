pub mod alloc;
pub mod candidate;
pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod io_utils;
pub mod partition;
pub mod record;
pub mod search;
#[cfg(feature = "s3")]
pub mod upload;

pub use candidate::{generate, search_space};
pub use config::{BenchConfig, RunMode, UploadConfig};
pub use driver::{run_benchmark, run_benchmark_with_progress, run_session};
pub use error::{BenchError, Result};
pub use partition::{partition, Partition};
pub use record::{aggregate, AlgorithmType, ResultRecord};
pub use search::{search_concurrent, search_sequential, SearchOutcome};
