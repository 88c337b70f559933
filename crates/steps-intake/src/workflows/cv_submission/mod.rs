//! CV submission: validate the form, deliver the attachment as best we can, and notify staff.
//!
//! A storage outage never blocks an applicant. When the upload is unavailable the file is
//! embedded inline or described in the notification, and the success message carries an
//! advisory so the applicant knows the team may follow up.

pub mod domain;
pub mod encoder;
pub mod form;
pub mod orchestrator;
pub mod router;
pub mod template;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantSubmission, AttachedFile, FieldErrors, FileDelivery, SubmissionOutcome,
    SubmissionState,
};
pub use encoder::FileEncoder;
pub use form::{CvForm, FormStatus, FormSubmitError, UnknownField};
pub use orchestrator::{
    SubmissionOrchestrator, SubmissionReport, SubmissionSettings, FAILURE_MESSAGE,
    STORAGE_ADVISORY, SUCCESS_MESSAGE,
};
pub use router::cv_submission_router;
pub use template::{cv_notification, CvTemplateField};
pub use validation::{
    check_attachment, is_valid_email, validate_submission, AttachmentRejection, MAX_CV_BYTES,
};
