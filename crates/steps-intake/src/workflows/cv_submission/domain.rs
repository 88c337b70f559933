use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::relay::DispatchReceipt;

/// A file selected by the applicant, held in memory for the duration of one submission.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl AttachedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lowercased extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl std::fmt::Debug for AttachedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}

/// Everything an applicant enters on the CV form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicantSubmission {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub education: String,
    pub experience: String,
    pub attachment: Option<AttachedFile>,
}

/// How the CV reached the staff notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileDelivery {
    Stored { url: String },
    InlineEncoded { payload: String },
    Placeholder { description: String },
}

impl FileDelivery {
    /// Value interpolated into the notification template.
    pub fn template_value(&self) -> &str {
        match self {
            FileDelivery::Stored { url } => url,
            FileDelivery::InlineEncoded { payload } => payload,
            FileDelivery::Placeholder { description } => description,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            FileDelivery::Stored { .. } => "stored",
            FileDelivery::InlineEncoded { .. } => "inline",
            FileDelivery::Placeholder { .. } => "placeholder",
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, FileDelivery::Stored { .. })
    }
}

/// Orchestrator states; a rejected validation drops back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Validating,
    Encoding,
    Sending,
    Succeeded,
    Failed,
}

impl SubmissionState {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::Encoding => "encoding",
            SubmissionState::Sending => "sending",
            SubmissionState::Succeeded => "succeeded",
            SubmissionState::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionState::Succeeded | SubmissionState::Failed)
    }
}

/// Per-field validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(std::collections::BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FieldErrors {}

/// Result of one orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Rejected(FieldErrors),
    Succeeded {
        message: String,
        advisory: Option<String>,
        delivery: FileDelivery,
        receipt: DispatchReceipt,
    },
    Failed {
        error: String,
    },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded { .. })
    }
}
