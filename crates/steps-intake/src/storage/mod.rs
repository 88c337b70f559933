//! Object storage for CV attachments.
//!
//! Storage is best effort. Applicants must always be able to finish the form, but not every file
//! has to be persisted, so callers receive a classified [`StorageError`] and decide whether to
//! fall back.

pub mod firebase;

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::workflows::cv_submission::domain::AttachedFile;

pub use firebase::FirebaseStorageClient;

/// Destination key inside the bucket, e.g. `cvs/1718000000000_jane_doe_cv.pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Key for a CV upload: millisecond timestamp plus the sanitized original name.
    pub fn for_cv(uploaded_at: DateTime<Utc>, file_name: &str) -> Self {
        Self(format!(
            "cvs/{}_{}",
            uploaded_at.timestamp_millis(),
            sanitize_file_name(file_name)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn sanitize_file_name(raw: &str) -> String {
    // Browsers may send a full client path; only the final component matters.
    let base = raw
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = sanitized.trim_matches('.');
    if trimmed.is_empty() {
        "cv".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Confirmed upload, fetchable without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: ObjectKey,
    pub url: String,
}

/// Receives transfer progress as a percentage between 0 and 100.
pub trait UploadProgress: Send + Sync {
    fn report(&self, percent: u8);
}

/// Sink that discards progress updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl UploadProgress for NoProgress {
    fn report(&self, _percent: u8) {}
}

/// Wraps a sink so that reported values never move backwards and never exceed 100.
pub struct ProgressTracker<'a> {
    sink: &'a dyn UploadProgress,
    current: AtomicU8,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a dyn UploadProgress) -> Self {
        Self {
            sink,
            current: AtomicU8::new(0),
        }
    }

    pub fn current(&self) -> u8 {
        self.current.load(Ordering::Acquire)
    }

    /// Sub-range view used while a transfer reports its own 0-100 progress.
    pub fn scaled(&self, start: u8, end: u8) -> ScaledProgress<'_, 'a> {
        ScaledProgress {
            tracker: self,
            start: start.min(100),
            end: end.clamp(start.min(100), 100),
        }
    }
}

impl UploadProgress for ProgressTracker<'_> {
    fn report(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.current.fetch_max(percent, Ordering::AcqRel);
        if percent > previous {
            self.sink.report(percent);
        }
    }
}

/// Maps 0-100 into `[start, end]` of the parent tracker.
pub struct ScaledProgress<'t, 'a> {
    tracker: &'t ProgressTracker<'a>,
    start: u8,
    end: u8,
}

impl UploadProgress for ScaledProgress<'_, '_> {
    fn report(&self, percent: u8) {
        let span = u32::from(self.end - self.start);
        let offset = span * u32::from(percent.min(100)) / 100;
        self.tracker.report(self.start + offset as u8);
    }
}

/// Remote blob storage able to hold an applicant's CV.
#[async_trait]
pub trait BlobUploader: Send + Sync {
    async fn upload(
        &self,
        file: &AttachedFile,
        key: &ObjectKey,
        progress: &dyn UploadProgress,
    ) -> Result<StoredObject, StorageError>;
}

/// Stand-in used when no bucket is configured; every upload is refused.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredStorage;

#[async_trait]
impl BlobUploader for UnconfiguredStorage {
    async fn upload(
        &self,
        _file: &AttachedFile,
        _key: &ObjectKey,
        _progress: &dyn UploadProgress,
    ) -> Result<StoredObject, StorageError> {
        Err(StorageError::NetworkRejected {
            reason: "object storage is not configured".to_string(),
        })
    }
}

/// Upload failures, classified so callers can log misconfiguration distinctly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The request never produced a response: refused connection, DNS failure, or an origin the
    /// store does not allow. Expected in some deployments and absorbed by falling back.
    #[error("storage rejected the connection: {reason}")]
    NetworkRejected { reason: String },
    #[error("storage refused credentials (status {status})")]
    Unauthorized { status: u16 },
    #[error("storage upload timed out after {after:?}")]
    TimedOut { after: Duration },
    #[error("storage transport error: {message}")]
    Transport { status: Option<u16>, message: String },
}

impl StorageError {
    /// Network rejections and timeouts are tolerated; authorization and transport errors point at
    /// configuration or provider problems.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            StorageError::NetworkRejected { .. } | StorageError::TimedOut { .. }
        )
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            StorageError::NetworkRejected { .. } => "network_rejected",
            StorageError::Unauthorized { .. } => "unauthorized",
            StorageError::TimedOut { .. } => "timed_out",
            StorageError::Transport { .. } => "transport",
        }
    }
}
