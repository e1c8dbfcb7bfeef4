//! S3 upload of exported result files. Only compiled with the `s3` feature.

use crate::config::UploadConfig;
use crate::error::{BenchError, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use tracing::info;

/// Upload `path` to the configured bucket, keyed by its file name.
///
/// Blocks the calling thread on a private current-thread runtime.
pub fn upload_file(path: &Path, config: &UploadConfig) -> Result<()> {
    let key = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| BenchError::Upload(format!("invalid file name: {}", path.display())))?
        .to_string();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(put_object(path, &key, config))?;

    info!(bucket = %config.bucket, key = %key, "uploaded results to S3");
    Ok(())
}

async fn put_object(path: &Path, key: &str, config: &UploadConfig) -> Result<()> {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    if let (Some(id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            id.clone(),
            secret.clone(),
            None,
            None,
            "crack-bench-static",
        ));
    }

    let sdk_config = loader.load().await;
    let client = aws_sdk_s3::Client::new(&sdk_config);

    let body = ByteStream::from_path(path)
        .await
        .map_err(|e| BenchError::Upload(format!("failed to open {}: {}", path.display(), e)))?;

    client
        .put_object()
        .bucket(&config.bucket)
        .key(key)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            BenchError::Upload(format!(
                "failed to upload object: {}",
                DisplayErrorContext(&e)
            ))
        })?;

    Ok(())
}
