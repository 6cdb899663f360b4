//! Product image handling against a hosted image CDN.
//!
//! Files are validated locally before any network call. Uploads and
//! deletions are retried a bounded number of times with a fixed pause; the
//! final failure is returned to the caller together with the last error.

pub mod retry;
pub mod uploader;
pub mod validation;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use retry::{Backoff, FixedDelay, RetryPolicy};
pub use uploader::{BatchSummary, ImageUploader, UploadError, UploadLimits};
pub use validation::{ImageFile, ImageRejection};

/// An upload ready to go over the wire.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub public_id: String,
    pub folder: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// `key=value` pairs stored alongside the image.
    pub context: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Clone, Error)]
pub enum HostError {
    #[error("image host is not configured: {0}")]
    NotConfigured(String),
    #[error("image host unreachable: {0}")]
    Transport(String),
    #[error("image host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected image host response: {0}")]
    Malformed(String),
    #[error("image host did not answer within {0:?}")]
    Timeout(Duration),
}

impl retry::Transient for HostError {
    fn is_transient(&self) -> bool {
        !matches!(self, HostError::NotConfigured(_))
    }
}

#[async_trait]
pub trait ImageHost: Send + Sync + 'static {
    async fn upload(&self, image: &PreparedImage) -> Result<HostedImage, HostError>;
    async fn destroy(&self, public_id: &str) -> Result<(), HostError>;
}
