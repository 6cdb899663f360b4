use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use super::retry::{retry, Exhausted, RetryPolicy};
use super::validation::{self, ImageFile, ImageRejection};
use super::{HostError, HostedImage, ImageHost, PreparedImage};

#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_bytes: usize,
    /// Per-attempt ceiling on a single provider call.
    pub attempt_timeout: Duration,
    /// Remote folder root; uploads land in `<folder>/<owner id>`.
    pub folder: String,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            attempt_timeout: Duration::from_secs(30),
            folder: "products".to_string(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("{0}")]
    Rejected(#[from] ImageRejection),
    #[error("gave up after {attempts} attempt(s): {last_error}")]
    Failed { attempts: u32, last_error: HostError },
}

impl From<Exhausted<HostError>> for UploadError {
    fn from(e: Exhausted<HostError>) -> Self {
        UploadError::Failed {
            attempts: e.attempts,
            last_error: e.last_error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total_files: usize,
    pub successful_uploads: usize,
    pub failed_uploads: usize,
    pub uploaded: Vec<HostedImage>,
    pub errors: Vec<String>,
}

impl BatchSummary {
    pub fn success(&self) -> bool {
        self.successful_uploads > 0
    }
}

/// Client-side half of product image storage: validate, then talk to the
/// host under the retry policy.
#[derive(Clone)]
pub struct ImageUploader {
    host: Arc<dyn ImageHost>,
    policy: RetryPolicy,
    limits: UploadLimits,
}

impl ImageUploader {
    pub fn new(host: Arc<dyn ImageHost>, policy: RetryPolicy, limits: UploadLimits) -> Self {
        Self {
            host,
            policy,
            limits,
        }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn prepare(&self, file: ImageFile, owner_id: &str) -> Result<PreparedImage, UploadError> {
        validation::validate(&file, self.limits.max_bytes)?;
        let public_id = validation::public_id_for(&file.file_name, Utc::now().timestamp_millis());
        Ok(PreparedImage {
            public_id,
            folder: format!("{}/{}", self.limits.folder, owner_id),
            context: vec![
                ("vendorId".to_string(), owner_id.to_string()),
                ("originalName".to_string(), file.file_name.clone()),
            ],
            file_name: file.file_name,
            content_type: file.content_type,
            bytes: file.bytes,
        })
    }

    pub async fn upload(&self, file: ImageFile, owner_id: &str) -> Result<HostedImage, UploadError> {
        let prepared = self.prepare(file, owner_id)?;
        let label = format!("image upload {}", prepared.public_id);
        let hosted = retry(&self.policy, &label, |_| {
            let host = self.host.clone();
            let prepared = &prepared;
            let timeout = self.limits.attempt_timeout;
            async move {
                tokio::time::timeout(timeout, host.upload(prepared))
                    .await
                    .map_err(|_| HostError::Timeout(timeout))?
            }
        })
        .await?;
        log::info!("uploaded image {} for {}", hosted.public_id, owner_id);
        Ok(hosted)
    }

    /// Sequential multi-file upload; one failure does not stop the rest.
    pub async fn upload_many(&self, files: Vec<ImageFile>, owner_id: &str) -> BatchSummary {
        let total_files = files.len();
        let mut uploaded = Vec::new();
        let mut errors = Vec::new();
        for file in files {
            let name = file.file_name.clone();
            match self.upload(file, owner_id).await {
                Ok(image) => uploaded.push(image),
                Err(e) => {
                    log::error!("error uploading file {}: {}", name, e);
                    errors.push(format!("{name}: {e}"));
                }
            }
        }
        BatchSummary {
            total_files,
            successful_uploads: uploaded.len(),
            failed_uploads: errors.len(),
            uploaded,
            errors,
        }
    }

    pub async fn delete(&self, public_id: &str) -> Result<(), UploadError> {
        let label = format!("image delete {public_id}");
        retry(&self.policy, &label, |_| {
            let host = self.host.clone();
            let timeout = self.limits.attempt_timeout;
            async move {
                tokio::time::timeout(timeout, host.destroy(public_id))
                    .await
                    .map_err(|_| HostError::Timeout(timeout))?
            }
        })
        .await?;
        Ok(())
    }

    /// Delete every image, logging failures instead of returning them.
    /// Returns how many deletions failed.
    pub async fn delete_best_effort(&self, public_ids: &[String]) -> usize {
        let mut failed = 0;
        for id in public_ids {
            if let Err(e) = self.delete(id).await {
                failed += 1;
                log::warn!("leaving orphaned image {}: {}", id, e);
            }
        }
        failed
    }
}
