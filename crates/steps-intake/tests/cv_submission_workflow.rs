use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use steps_intake::config::StorageMode;
use steps_intake::relay::EmailJsClient;
use steps_intake::storage::{FirebaseStorageClient, NoProgress, StorageError};
use steps_intake::workflows::cv_submission::{
    ApplicantSubmission, AttachedFile, CvForm, FormStatus, SubmissionOrchestrator,
    SubmissionOutcome, SubmissionSettings, SubmissionState, STORAGE_ADVISORY, SUCCESS_MESSAGE,
};

const BUCKET: &str = "steps-cvs.appspot.com";

#[derive(Clone, Default)]
struct Captured {
    uploads: Arc<Mutex<Vec<usize>>>,
    emails: Arc<Mutex<Vec<Value>>>,
}

async fn spawn_providers(captured: Captured) -> String {
    let uploads = captured.uploads.clone();
    let emails = captured.emails.clone();
    let app = Router::new()
        .route(
            "/v0/b/:bucket/o",
            post(move |body: Bytes| {
                let uploads = uploads.clone();
                async move {
                    uploads.lock().expect("uploads mutex").push(body.len());
                    Json(json!({ "name": "cvs/cv.pdf", "downloadTokens": "token-1" }))
                }
            }),
        )
        .route(
            "/api/v1.0/email/send",
            post(move |Json(body): Json<Value>| {
                let emails = emails.clone();
                async move {
                    emails.lock().expect("emails mutex").push(body);
                    "OK"
                }
            }),
        )
        .layer(axum::extract::DefaultBodyLimit::disable());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind providers");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("provider stub");
    });
    format!("http://{addr}")
}

async fn closed_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

fn jane_doe() -> ApplicantSubmission {
    ApplicantSubmission {
        full_name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        phone: "07000000000".to_string(),
        education: String::new(),
        experience: String::new(),
        attachment: Some(AttachedFile::new(
            "cv.pdf",
            "application/pdf",
            vec![b'%'; 2 * 1024 * 1024],
        )),
    }
}

fn orchestrator(
    storage_endpoint: &str,
    relay_endpoint: &str,
) -> SubmissionOrchestrator<FirebaseStorageClient, EmailJsClient> {
    let storage =
        FirebaseStorageClient::new(storage_endpoint, BUCKET, None).expect("storage client");
    let relay = EmailJsClient::new(
        &format!("{relay_endpoint}/api/v1.0/email/send"),
        "service_steps",
        "public-key",
        None,
    )
    .expect("relay client");

    SubmissionOrchestrator::new(
        Arc::new(storage),
        Arc::new(relay),
        SubmissionSettings {
            storage_mode: StorageMode::Live,
            upload_timeout: Duration::from_secs(8),
            template_id: "template_cv".to_string(),
            recipient_name: "Steps Education Team".to_string(),
            inline_limit_bytes: 40 * 1024,
        },
    )
}

#[tokio::test]
async fn jane_doe_submission_is_stored_and_emailed() {
    let captured = Captured::default();
    let endpoint = spawn_providers(captured.clone()).await;

    let report = orchestrator(&endpoint, &endpoint)
        .submit(jane_doe(), &NoProgress)
        .await;

    assert_eq!(report.state, SubmissionState::Succeeded);
    match &report.outcome {
        SubmissionOutcome::Succeeded {
            message,
            advisory,
            delivery,
            ..
        } => {
            assert_eq!(message, SUCCESS_MESSAGE);
            assert!(advisory.is_none());
            assert!(delivery.is_stored());
        }
        other => panic!("expected success, got {other:?}"),
    }

    assert_eq!(
        *captured.uploads.lock().unwrap(),
        vec![2 * 1024 * 1024]
    );
    let emails = captured.emails.lock().unwrap().clone();
    assert_eq!(emails.len(), 1);
    let params = &emails[0]["template_params"];
    assert_eq!(params["user_name"], "Jane Doe");
    assert_eq!(params["user_phone"], "07000000000");
    assert_eq!(params["education"], "Not specified");
    assert_eq!(params["subject"], "CV Submission from Jane Doe");
    assert_eq!(
        params["cv_file"],
        format!("{endpoint}/v0/b/{BUCKET}/o/cvs%2Fcv.pdf?alt=media&token=token-1")
    );
}

#[tokio::test]
async fn rejected_storage_still_delivers_with_advisory() {
    let captured = Captured::default();
    let relay = spawn_providers(captured.clone()).await;
    let storage = closed_endpoint().await;

    let report = orchestrator(&storage, &relay)
        .submit(jane_doe(), &NoProgress)
        .await;

    assert!(report.visited(SubmissionState::Sending));
    assert!(matches!(
        report.storage_error,
        Some(StorageError::NetworkRejected { .. })
    ));
    match &report.outcome {
        SubmissionOutcome::Succeeded {
            advisory, delivery, ..
        } => {
            assert_eq!(advisory.as_deref(), Some(STORAGE_ADVISORY));
            assert_eq!(delivery.label(), "placeholder");
        }
        other => panic!("expected success, got {other:?}"),
    }

    let emails = captured.emails.lock().unwrap().clone();
    let params = &emails[0]["template_params"];
    assert_eq!(params["cv_delivery"], "placeholder");
    assert!(params["cv_file"]
        .as_str()
        .is_some_and(|text| text.contains("cv.pdf") && text.contains("2.0 MB")));
}

#[tokio::test]
async fn form_session_clears_after_live_submission() {
    let captured = Captured::default();
    let endpoint = spawn_providers(captured.clone()).await;
    let orchestrator = orchestrator(&endpoint, &endpoint);

    let mut form = CvForm::new();
    let jane = jane_doe();
    form.set_field("name", jane.full_name).expect("name");
    form.set_field("email", jane.email).expect("email");
    form.set_field("phone", jane.phone).expect("phone");
    form.select_file(jane.attachment.expect("fixture file"))
        .expect("pdf accepted");

    let status = form
        .submit(&orchestrator, &NoProgress)
        .await
        .expect("submits")
        .clone();

    assert!(matches!(status, FormStatus::Succeeded { advisory: None, .. }));
    assert!(form.values().attachment.is_none());
    assert!(form.values().email.is_empty());
}
