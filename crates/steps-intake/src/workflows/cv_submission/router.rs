use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::domain::{ApplicantSubmission, AttachedFile, FieldErrors, SubmissionOutcome};
use super::orchestrator::SubmissionOrchestrator;
use super::validation::{
    check_attachment, FIELD_CV_FILE, FIELD_EDUCATION, FIELD_EMAIL, FIELD_EXPERIENCE, FIELD_NAME,
    FIELD_PHONE, MAX_CV_BYTES,
};
use crate::relay::EmailSender;
use crate::storage::{BlobUploader, NoProgress};

/// Headroom over the file cap for the text fields and multipart framing.
const BODY_LIMIT_BYTES: usize = MAX_CV_BYTES + 512 * 1024;

/// Router exposing the multipart CV submission endpoint.
pub fn cv_submission_router<U, E>(orchestrator: Arc<SubmissionOrchestrator<U, E>>) -> Router
where
    U: BlobUploader + ?Sized + 'static,
    E: EmailSender + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/cv-submissions", post(submit_handler::<U, E>))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(orchestrator)
}

pub(crate) async fn submit_handler<U, E>(
    State(orchestrator): State<Arc<SubmissionOrchestrator<U, E>>>,
    multipart: Multipart,
) -> Response
where
    U: BlobUploader + ?Sized + 'static,
    E: EmailSender + ?Sized + 'static,
{
    let submission = match read_submission(multipart).await {
        Ok(submission) => submission,
        Err(err) => {
            let payload = json!({ "error": err.body_text() });
            return (err.status(), axum::Json(payload)).into_response();
        }
    };

    if let Some(file) = &submission.attachment {
        if let Err(rejection) = check_attachment(file) {
            let mut errors = FieldErrors::default();
            errors.insert(FIELD_CV_FILE, rejection.to_string());
            return rejected(errors);
        }
    }

    let report = orchestrator.submit(submission, &NoProgress).await;
    match report.outcome {
        SubmissionOutcome::Rejected(errors) => rejected(errors),
        SubmissionOutcome::Succeeded {
            message,
            advisory,
            delivery,
            ..
        } => {
            let payload = json!({
                "state": report.state.label(),
                "message": message,
                "advisory": advisory,
                "delivery": delivery.label(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        SubmissionOutcome::Failed { error } => {
            let payload = json!({
                "state": report.state.label(),
                "error": error,
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}

fn rejected(errors: FieldErrors) -> Response {
    let payload = json!({
        "state": "idle",
        "errors": errors,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

async fn read_submission(mut multipart: Multipart) -> Result<ApplicantSubmission, MultipartError> {
    let mut submission = ApplicantSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FIELD_NAME => submission.full_name = field.text().await?,
            FIELD_EMAIL => submission.email = field.text().await?,
            FIELD_PHONE => submission.phone = field.text().await?,
            FIELD_EDUCATION => submission.education = field.text().await?,
            FIELD_EXPERIENCE => submission.experience = field.text().await?,
            FIELD_CV_FILE => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // An untouched file input still posts an empty, unnamed part.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                submission.attachment = Some(AttachedFile::new(file_name, content_type, bytes));
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown cv form field");
            }
        }
    }

    Ok(submission)
}
