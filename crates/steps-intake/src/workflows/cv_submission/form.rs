use serde::Serialize;

use super::domain::{ApplicantSubmission, AttachedFile, FieldErrors, SubmissionOutcome};
use super::orchestrator::{SubmissionOrchestrator, SubmissionReport};
use super::validation::{
    check_attachment, validate_submission, AttachmentRejection, FIELD_CV_FILE, FIELD_EDUCATION,
    FIELD_EMAIL, FIELD_EXPERIENCE, FIELD_NAME, FIELD_PHONE,
};
use crate::relay::EmailSender;
use crate::storage::{BlobUploader, UploadProgress};

/// What the applicant currently sees below the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormStatus {
    Idle,
    Submitting,
    Succeeded {
        message: String,
        advisory: Option<String>,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormSubmitError {
    #[error("a submission is already in progress")]
    Busy,
    #[error("form has invalid fields: {0}")]
    Invalid(FieldErrors),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

/// One applicant's session with the CV form.
#[derive(Debug, Default)]
pub struct CvForm {
    values: ApplicantSubmission,
    file_rejection: Option<AttachmentRejection>,
    errors: FieldErrors,
    submitting: bool,
    status: Option<FormStatus>,
}

impl CvForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> Result<(), UnknownField> {
        let slot = match field {
            FIELD_NAME => &mut self.values.full_name,
            FIELD_EMAIL => &mut self.values.email,
            FIELD_PHONE => &mut self.values.phone,
            FIELD_EDUCATION => &mut self.values.education,
            FIELD_EXPERIENCE => &mut self.values.experience,
            other => return Err(UnknownField(other.to_string())),
        };
        *slot = value.into();
        self.errors.remove(field);
        Ok(())
    }

    /// Checks type and size immediately; a rejected file is not kept.
    pub fn select_file(&mut self, file: AttachedFile) -> Result<(), AttachmentRejection> {
        self.errors.remove(FIELD_CV_FILE);
        match check_attachment(&file) {
            Ok(()) => {
                self.values.attachment = Some(file);
                self.file_rejection = None;
                Ok(())
            }
            Err(rejection) => {
                self.values.attachment = None;
                self.errors.insert(FIELD_CV_FILE, rejection.to_string());
                self.file_rejection = Some(rejection.clone());
                Err(rejection)
            }
        }
    }

    pub fn values(&self) -> &ApplicantSubmission {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn status(&self) -> &FormStatus {
        const IDLE: &FormStatus = &FormStatus::Idle;
        const SUBMITTING: &FormStatus = &FormStatus::Submitting;
        if self.submitting {
            return SUBMITTING;
        }
        self.status.as_ref().unwrap_or(IDLE)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validates locally and marks the form busy; the returned submission is handed to the
    /// orchestrator.
    pub fn begin_submit(&mut self) -> Result<ApplicantSubmission, FormSubmitError> {
        if self.submitting {
            return Err(FormSubmitError::Busy);
        }

        if let Err(mut errors) = validate_submission(&self.values) {
            if let Some(rejection) = &self.file_rejection {
                errors.remove(FIELD_CV_FILE);
                errors.insert(FIELD_CV_FILE, rejection.to_string());
            }
            self.errors = errors.clone();
            return Err(FormSubmitError::Invalid(errors));
        }

        self.errors = FieldErrors::default();
        self.submitting = true;
        self.status = None;
        Ok(self.values.clone())
    }

    /// Applies the orchestrator's verdict: success clears the form, failure keeps it.
    pub fn complete(&mut self, report: &SubmissionReport) -> &FormStatus {
        self.submitting = false;
        let status = match &report.outcome {
            SubmissionOutcome::Rejected(errors) => {
                self.errors = errors.clone();
                FormStatus::Idle
            }
            SubmissionOutcome::Succeeded {
                message, advisory, ..
            } => {
                self.values = ApplicantSubmission::default();
                self.file_rejection = None;
                FormStatus::Succeeded {
                    message: message.clone(),
                    advisory: advisory.clone(),
                }
            }
            SubmissionOutcome::Failed { error } => FormStatus::Failed {
                error: error.clone(),
            },
        };
        self.status.insert(status)
    }

    pub async fn submit<U, E>(
        &mut self,
        orchestrator: &SubmissionOrchestrator<U, E>,
        progress: &dyn UploadProgress,
    ) -> Result<&FormStatus, FormSubmitError>
    where
        U: BlobUploader + ?Sized + 'static,
        E: EmailSender + ?Sized + 'static,
    {
        let submission = self.begin_submit()?;
        let report = orchestrator.submit(submission, progress).await;
        Ok(self.complete(&report))
    }
}
