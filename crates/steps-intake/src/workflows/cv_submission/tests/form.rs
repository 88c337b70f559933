use super::common::*;
use std::sync::Arc;

use crate::config::StorageMode;
use crate::relay::DispatchError;
use crate::storage::NoProgress;
use crate::workflows::cv_submission::domain::AttachedFile;
use crate::workflows::cv_submission::form::{CvForm, FormStatus, FormSubmitError, UnknownField};
use crate::workflows::cv_submission::orchestrator::{STORAGE_ADVISORY, SUCCESS_MESSAGE};
use crate::workflows::cv_submission::validation::{
    AttachmentRejection, FIELD_CV_FILE, FIELD_EMAIL, FIELD_NAME, FIELD_PHONE, MAX_CV_BYTES,
};

fn filled_form() -> CvForm {
    let mut form = CvForm::new();
    form.set_field(FIELD_NAME, "Jane Doe").expect("known field");
    form.set_field(FIELD_EMAIL, "jane@example.com").expect("known field");
    form.set_field(FIELD_PHONE, "07000000000").expect("known field");
    form.select_file(pdf(1024)).expect("pdf accepted");
    form
}

#[tokio::test]
async fn successful_submission_clears_the_form() {
    let uploader = Arc::new(FakeUploader::succeeding());
    let sender = Arc::new(FakeSender::accepting());
    let orchestrator = orchestrator(&uploader, &sender, StorageMode::Live);
    let mut form = filled_form();

    let status = form
        .submit(&orchestrator, &NoProgress)
        .await
        .expect("form submits")
        .clone();

    assert_eq!(
        status,
        FormStatus::Succeeded {
            message: SUCCESS_MESSAGE.to_string(),
            advisory: None
        }
    );
    assert!(form.values().full_name.is_empty());
    assert!(form.values().attachment.is_none());
    assert!(!form.is_submitting());
    assert!(form.errors().is_empty());
}

#[tokio::test]
async fn fallback_success_shows_advisory() {
    let uploader = Arc::new(FakeUploader::cors_rejected());
    let sender = Arc::new(FakeSender::accepting());
    let orchestrator = orchestrator(&uploader, &sender, StorageMode::Live);
    let mut form = filled_form();

    let status = form
        .submit(&orchestrator, &NoProgress)
        .await
        .expect("form submits");

    match status {
        FormStatus::Succeeded { advisory, .. } => {
            assert_eq!(advisory.as_deref(), Some(STORAGE_ADVISORY));
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_dispatch_keeps_entered_values() {
    let uploader = Arc::new(FakeUploader::succeeding());
    let sender = Arc::new(FakeSender::rejecting(DispatchError::Throttled {
        message: "Too many requests".to_string(),
    }));
    let orchestrator = orchestrator(&uploader, &sender, StorageMode::Live);
    let mut form = filled_form();

    let status = form
        .submit(&orchestrator, &NoProgress)
        .await
        .expect("form submits")
        .clone();

    assert_eq!(
        status,
        FormStatus::Failed {
            error: "Too many requests".to_string()
        }
    );
    assert_eq!(form.values().full_name, "Jane Doe");
    assert!(form.values().attachment.is_some());
    assert_eq!(form.status(), &status);
}

#[tokio::test]
async fn oversized_or_foreign_files_never_reach_the_orchestrator() {
    let uploader = Arc::new(FakeUploader::succeeding());
    let sender = Arc::new(FakeSender::accepting());
    let orchestrator = orchestrator(&uploader, &sender, StorageMode::Live);
    let mut form = filled_form();

    let rejection = form
        .select_file(pdf(MAX_CV_BYTES + 1))
        .expect_err("too large");
    assert_eq!(
        rejection,
        AttachmentRejection::TooLarge {
            size: MAX_CV_BYTES + 1
        }
    );
    assert!(form.values().attachment.is_none());

    let err = form
        .submit(&orchestrator, &NoProgress)
        .await
        .expect_err("form blocked");
    match err {
        FormSubmitError::Invalid(errors) => {
            assert_eq!(
                errors.get(FIELD_CV_FILE),
                Some("File size must be less than 5MB")
            );
        }
        other => panic!("expected invalid form, got {other:?}"),
    }

    form.select_file(AttachedFile::new("cv.png", "image/png", vec![1u8; 8]))
        .expect_err("png refused");
    assert_eq!(
        form.errors().get(FIELD_CV_FILE),
        Some("Only PDF, DOC, and DOCX files are allowed")
    );

    assert_eq!(uploader.calls(), 0);
    assert_eq!(sender.calls(), 0);
}

#[test]
fn second_submit_while_busy_is_refused() {
    let mut form = filled_form();
    let submission = form.begin_submit().expect("first submit starts");
    assert_eq!(submission.full_name, "Jane Doe");
    assert!(form.is_submitting());
    assert_eq!(form.status(), &FormStatus::Submitting);

    assert_eq!(form.begin_submit(), Err(FormSubmitError::Busy));
}

#[test]
fn editing_a_field_clears_its_error() {
    let mut form = CvForm::new();
    let err = form.begin_submit().expect_err("empty form");
    assert!(matches!(err, FormSubmitError::Invalid(_)));
    assert!(form.errors().contains(FIELD_NAME));

    form.set_field(FIELD_NAME, "Jane").expect("known field");
    assert!(!form.errors().contains(FIELD_NAME));
    assert!(form.errors().contains(FIELD_EMAIL));

    assert_eq!(
        form.set_field("nickname", "JD"),
        Err(UnknownField("nickname".to_string()))
    );
}

#[test]
fn reset_returns_to_a_blank_idle_form() {
    let mut form = filled_form();
    form.begin_submit().expect("starts");
    form.reset();

    assert!(!form.is_submitting());
    assert_eq!(form.status(), &FormStatus::Idle);
    assert!(form.values().email.is_empty());
}
