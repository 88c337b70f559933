//! Outbound transactional email.
//!
//! Both site forms end in a templated email to the consultancy's inbox. The relay provider is
//! hidden behind [`EmailSender`] so workflows and tests never depend on a particular vendor.

pub mod emailjs;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

pub use emailjs::EmailJsClient;

/// Flat, ordered template parameters sent alongside a template identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmailParameters(BTreeMap<String, String>);

impl EmailParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Provider acknowledgement for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReceipt {
    pub status: u16,
    pub text: String,
}

/// Reasons a message was not accepted. Nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("email relay rejected identifiers: {message}")]
    InvalidIdentifier { message: String },
    #[error("email relay unreachable: {message}")]
    Network { message: String },
    #[error("email relay throttled the request: {message}")]
    Throttled { message: String },
    #[error("email relay rejected the message (status {status}): {text}")]
    Rejected { status: u16, text: String },
}

impl DispatchError {
    /// Human-readable text suitable for showing back to the person who filled in the form.
    pub fn provider_text(&self) -> &str {
        match self {
            DispatchError::InvalidIdentifier { message }
            | DispatchError::Network { message }
            | DispatchError::Throttled { message } => message,
            DispatchError::Rejected { text, .. } => text,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            DispatchError::InvalidIdentifier { .. } => "invalid_identifier",
            DispatchError::Network { .. } => "network",
            DispatchError::Throttled { .. } => "throttled",
            DispatchError::Rejected { .. } => "rejected",
        }
    }
}

/// Sends a templated message through a transactional email provider.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(
        &self,
        template_id: &str,
        params: EmailParameters,
    ) -> Result<DispatchReceipt, DispatchError>;
}
