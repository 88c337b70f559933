use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use steps_intake::config::{AppConfig, StorageMode};
use steps_intake::error::AppError;
use steps_intake::preferences::{FilePreferenceStore, PreferenceStore};
use steps_intake::relay::{EmailJsClient, EmailSender};
use steps_intake::storage::{BlobUploader, FirebaseStorageClient, UnconfiguredStorage};
use steps_intake::workflows::contact::ContactService;
use steps_intake::workflows::cv_submission::{SubmissionOrchestrator, SubmissionSettings};

pub(crate) type CvOrchestrator = SubmissionOrchestrator<dyn BlobUploader, dyn EmailSender>;
pub(crate) type ContactInbox = ContactService<dyn EmailSender>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Live mode talks to the bucket; every other mode never uploads.
pub(crate) fn build_uploader(config: &AppConfig) -> Result<Arc<dyn BlobUploader>, AppError> {
    match config.storage.mode {
        StorageMode::Live => Ok(Arc::new(FirebaseStorageClient::from_config(
            &config.storage,
        )?)),
        StorageMode::InlineFallback | StorageMode::Disabled => Ok(Arc::new(UnconfiguredStorage)),
    }
}

pub(crate) fn build_sender(config: &AppConfig) -> Result<Arc<dyn EmailSender>, AppError> {
    Ok(Arc::new(EmailJsClient::from_config(&config.email)?))
}

pub(crate) struct Workflows {
    pub(crate) cv: Arc<CvOrchestrator>,
    pub(crate) contact: Arc<ContactInbox>,
}

pub(crate) fn build_workflows(config: &AppConfig) -> Result<Workflows, AppError> {
    let uploader = build_uploader(config)?;
    let sender = build_sender(config)?;

    let cv = Arc::new(SubmissionOrchestrator::new(
        uploader,
        sender.clone(),
        SubmissionSettings::from_config(config),
    ));
    let contact = Arc::new(ContactService::new(
        sender,
        config.email.contact_template_id.clone(),
        config.email.recipient_name.clone(),
    ));

    Ok(Workflows { cv, contact })
}

/// Theme preferences belong to one local user, so only the CLI opens this store.
pub(crate) fn preference_store(config: &AppConfig) -> Arc<dyn PreferenceStore> {
    Arc::new(FilePreferenceStore::new(config.preferences.path.clone()))
}
