use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::config::StorageMode;
use crate::relay::{DispatchError, DispatchReceipt, EmailParameters, EmailSender};
use crate::storage::{BlobUploader, ObjectKey, StorageError, StoredObject, UploadProgress};
use crate::workflows::cv_submission::domain::{ApplicantSubmission, AttachedFile};
use crate::workflows::cv_submission::orchestrator::{SubmissionOrchestrator, SubmissionSettings};

pub(super) const TEMPLATE_ID: &str = "template_cv";
pub(super) const STORED_URL: &str = "https://storage.test/cvs/cv.pdf?alt=media";

pub(super) struct FakeUploader {
    result: Result<(), StorageError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeUploader {
    pub(super) fn succeeding() -> Self {
        Self {
            result: Ok(()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn failing(error: StorageError) -> Self {
        Self {
            result: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn cors_rejected() -> Self {
        Self::failing(StorageError::NetworkRejected {
            reason: "blocked by CORS policy".to_string(),
        })
    }

    pub(super) fn stalled(delay: Duration) -> Self {
        Self {
            result: Ok(()),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobUploader for FakeUploader {
    async fn upload(
        &self,
        _file: &AttachedFile,
        key: &ObjectKey,
        progress: &dyn UploadProgress,
    ) -> Result<StoredObject, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        progress.report(0);
        progress.report(50);
        match &self.result {
            Ok(()) => {
                progress.report(100);
                Ok(StoredObject {
                    key: key.clone(),
                    url: STORED_URL.to_string(),
                })
            }
            Err(err) => Err(err.clone()),
        }
    }
}

pub(super) struct FakeSender {
    result: Result<DispatchReceipt, DispatchError>,
    sent: Mutex<Vec<(String, EmailParameters)>>,
}

impl FakeSender {
    pub(super) fn accepting() -> Self {
        Self {
            result: Ok(DispatchReceipt {
                status: 200,
                text: "OK".to_string(),
            }),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn rejecting(error: DispatchError) -> Self {
        Self {
            result: Err(error),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.sent.lock().expect("sent mutex").len()
    }

    pub(super) fn last(&self) -> Option<(String, EmailParameters)> {
        self.sent.lock().expect("sent mutex").last().cloned()
    }
}

#[async_trait]
impl EmailSender for FakeSender {
    async fn send(
        &self,
        template_id: &str,
        params: EmailParameters,
    ) -> Result<DispatchReceipt, DispatchError> {
        self.sent
            .lock()
            .expect("sent mutex")
            .push((template_id.to_string(), params));
        self.result.clone()
    }
}

#[derive(Default)]
pub(super) struct RecordingProgress(Mutex<Vec<u8>>);

impl RecordingProgress {
    pub(super) fn values(&self) -> Vec<u8> {
        self.0.lock().expect("progress mutex").clone()
    }
}

impl UploadProgress for RecordingProgress {
    fn report(&self, percent: u8) {
        self.0.lock().expect("progress mutex").push(percent);
    }
}

pub(super) fn pdf(size: usize) -> AttachedFile {
    AttachedFile::new("cv.pdf", "application/pdf", vec![b'%'; size])
}

pub(super) fn jane_doe(file: AttachedFile) -> ApplicantSubmission {
    ApplicantSubmission {
        full_name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        phone: "07000000000".to_string(),
        education: "BSc Computer Science".to_string(),
        experience: "3 years".to_string(),
        attachment: Some(file),
    }
}

pub(super) fn settings(mode: StorageMode) -> SubmissionSettings {
    SubmissionSettings {
        storage_mode: mode,
        upload_timeout: Duration::from_secs(8),
        template_id: TEMPLATE_ID.to_string(),
        recipient_name: "Steps Education Team".to_string(),
        inline_limit_bytes: 40 * 1024,
    }
}

pub(super) fn orchestrator(
    uploader: &Arc<FakeUploader>,
    sender: &Arc<FakeSender>,
    mode: StorageMode,
) -> SubmissionOrchestrator<FakeUploader, FakeSender> {
    SubmissionOrchestrator::new(uploader.clone(), sender.clone(), settings(mode))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
