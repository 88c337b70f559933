use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::domain::{
    ApplicantSubmission, AttachedFile, FileDelivery, SubmissionOutcome, SubmissionState,
};
use super::encoder::FileEncoder;
use super::template::cv_notification;
use super::validation::validate_submission;
use crate::config::{AppConfig, StorageMode, DEFAULT_INLINE_LIMIT_BYTES, DEFAULT_RECIPIENT_NAME};
use crate::relay::EmailSender;
use crate::storage::{BlobUploader, ObjectKey, ProgressTracker, StorageError, UploadProgress};
use crate::telemetry::mask_email;

pub const SUCCESS_MESSAGE: &str = "Your CV was submitted successfully!";
pub const STORAGE_ADVISORY: &str =
    "We could not store your CV file. Our team may contact you to send it separately.";
pub const FAILURE_MESSAGE: &str =
    "Failed to submit your CV. Please try again or contact us directly.";

const PROGRESS_STARTED: u8 = 20;
const PROGRESS_UPLOAD_START: u8 = 30;
const PROGRESS_ENCODED: u8 = 80;
const PROGRESS_SENDING: u8 = 90;
const PROGRESS_DONE: u8 = 100;

/// Runtime knobs for the CV workflow.
#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    pub storage_mode: StorageMode,
    pub upload_timeout: Duration,
    pub template_id: String,
    pub recipient_name: String,
    pub inline_limit_bytes: usize,
}

impl SubmissionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            storage_mode: config.storage.mode,
            upload_timeout: config.storage.upload_timeout,
            template_id: config.email.cv_template_id.clone(),
            recipient_name: config.email.recipient_name.clone(),
            inline_limit_bytes: config.storage.inline_limit_bytes,
        }
    }
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::InlineFallback,
            upload_timeout: Duration::from_secs(8),
            template_id: String::new(),
            recipient_name: DEFAULT_RECIPIENT_NAME.to_string(),
            inline_limit_bytes: DEFAULT_INLINE_LIMIT_BYTES,
        }
    }
}

/// Everything observed during one run: the states visited and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub trail: Vec<SubmissionState>,
    pub state: SubmissionState,
    pub outcome: SubmissionOutcome,
    pub storage_error: Option<StorageError>,
}

impl SubmissionReport {
    fn finish(
        mut trail: Vec<SubmissionState>,
        state: SubmissionState,
        outcome: SubmissionOutcome,
        storage_error: Option<StorageError>,
    ) -> Self {
        trail.push(state);
        Self {
            trail,
            state,
            outcome,
            storage_error,
        }
    }

    pub fn visited(&self, state: SubmissionState) -> bool {
        self.trail.contains(&state)
    }
}

/// Sequences validation, attachment delivery, and the staff notification.
pub struct SubmissionOrchestrator<U: ?Sized, E: ?Sized> {
    uploader: Arc<U>,
    sender: Arc<E>,
    encoder: FileEncoder,
    settings: SubmissionSettings,
}

impl<U, E> SubmissionOrchestrator<U, E>
where
    U: BlobUploader + ?Sized + 'static,
    E: EmailSender + ?Sized + 'static,
{
    pub fn new(uploader: Arc<U>, sender: Arc<E>, settings: SubmissionSettings) -> Self {
        Self {
            uploader,
            sender,
            encoder: FileEncoder::new(settings.inline_limit_bytes),
            settings,
        }
    }

    pub fn settings(&self) -> &SubmissionSettings {
        &self.settings
    }

    pub async fn submit(
        &self,
        submission: ApplicantSubmission,
        progress: &dyn UploadProgress,
    ) -> SubmissionReport {
        let tracker = ProgressTracker::new(progress);
        let trail = vec![SubmissionState::Idle, SubmissionState::Validating];
        let applicant = mask_email(&submission.email);

        if let Err(errors) = validate_submission(&submission) {
            tracing::info!(
                %applicant,
                fields = ?errors.fields().collect::<Vec<_>>(),
                "cv submission rejected by validation"
            );
            return SubmissionReport::finish(
                trail,
                SubmissionState::Idle,
                SubmissionOutcome::Rejected(errors),
                None,
            );
        }

        let mut trail = trail;
        trail.push(SubmissionState::Encoding);
        tracker.report(PROGRESS_STARTED);

        let (delivery, storage_error) = match submission.attachment.as_ref() {
            Some(file) => self.deliver(file, &tracker).await,
            None => (
                FileDelivery::Placeholder {
                    description: "No CV was attached.".to_string(),
                },
                None,
            ),
        };
        tracker.report(PROGRESS_ENCODED);

        trail.push(SubmissionState::Sending);
        tracker.report(PROGRESS_SENDING);
        let params = cv_notification(&submission, &delivery, &self.settings.recipient_name);
        let sent = self.sender.send(&self.settings.template_id, params).await;
        tracker.report(PROGRESS_DONE);

        match sent {
            Ok(receipt) => {
                tracing::info!(
                    %applicant,
                    delivery = delivery.label(),
                    status = receipt.status,
                    "cv submission delivered"
                );
                let advisory = (!delivery.is_stored()).then(|| STORAGE_ADVISORY.to_string());
                SubmissionReport::finish(
                    trail,
                    SubmissionState::Succeeded,
                    SubmissionOutcome::Succeeded {
                        message: SUCCESS_MESSAGE.to_string(),
                        advisory,
                        delivery,
                        receipt,
                    },
                    storage_error,
                )
            }
            Err(err) => {
                tracing::error!(
                    %applicant,
                    kind = err.kind(),
                    error = %err,
                    "cv submission failed"
                );
                let text = err.provider_text().trim();
                let error = if text.is_empty() {
                    FAILURE_MESSAGE.to_string()
                } else {
                    text.to_string()
                };
                SubmissionReport::finish(
                    trail,
                    SubmissionState::Failed,
                    SubmissionOutcome::Failed { error },
                    storage_error,
                )
            }
        }
    }

    async fn deliver(
        &self,
        file: &AttachedFile,
        tracker: &ProgressTracker<'_>,
    ) -> (FileDelivery, Option<StorageError>) {
        match self.settings.storage_mode {
            StorageMode::Disabled => (
                FileDelivery::Placeholder {
                    description: self.encoder.describe(file),
                },
                None,
            ),
            StorageMode::InlineFallback => (self.encode_inline(file), None),
            StorageMode::Live => {
                tracker.report(PROGRESS_UPLOAD_START);
                let key = ObjectKey::for_cv(Utc::now(), &file.file_name);
                let scaled = tracker.scaled(PROGRESS_UPLOAD_START, PROGRESS_ENCODED);
                let attempt = tokio::time::timeout(
                    self.settings.upload_timeout,
                    self.uploader.upload(file, &key, &scaled),
                )
                .await;

                let error = match attempt {
                    Ok(Ok(stored)) => {
                        return (FileDelivery::Stored { url: stored.url }, None);
                    }
                    Ok(Err(err)) => err,
                    Err(_) => StorageError::TimedOut {
                        after: self.settings.upload_timeout,
                    },
                };

                if error.is_expected() {
                    tracing::info!(
                        %key,
                        kind = error.kind(),
                        error = %error,
                        "cv upload unavailable, encoding inline"
                    );
                } else {
                    tracing::warn!(
                        %key,
                        kind = error.kind(),
                        error = %error,
                        "cv upload failed, check storage configuration"
                    );
                }
                (self.encode_inline(file), Some(error))
            }
        }
    }

    fn encode_inline(&self, file: &AttachedFile) -> FileDelivery {
        if self.encoder.fits_inline(file) {
            FileDelivery::InlineEncoded {
                payload: self.encoder.encode(file),
            }
        } else {
            FileDelivery::Placeholder {
                description: self.encoder.describe(file),
            }
        }
    }
}
