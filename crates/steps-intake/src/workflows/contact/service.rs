use std::sync::Arc;

use super::domain::{validate_inquiry, ConsultancyService, ContactInquiry};
use crate::relay::{DispatchError, DispatchReceipt, EmailParameters, EmailSender};
use crate::telemetry::mask_email;
use crate::workflows::cv_submission::domain::FieldErrors;

pub const CONTACT_SUCCESS_MESSAGE: &str = "Your message has been sent successfully.";
pub const CONTACT_FAILURE_MESSAGE: &str = "Failed to send email. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("enquiry has invalid fields: {0}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ContactError {
    /// Message safe to show to the enquirer.
    pub fn user_message(&self) -> String {
        match self {
            ContactError::Invalid(errors) => errors.to_string(),
            ContactError::Dispatch(err) => {
                let text = err.provider_text().trim();
                if text.is_empty() {
                    CONTACT_FAILURE_MESSAGE.to_string()
                } else {
                    text.to_string()
                }
            }
        }
    }
}

/// Validates enquiries and relays them to the consultancy inbox.
pub struct ContactService<E: ?Sized> {
    sender: Arc<E>,
    template_id: String,
    recipient_name: String,
}

impl<E> ContactService<E>
where
    E: EmailSender + ?Sized + 'static,
{
    pub fn new(
        sender: Arc<E>,
        template_id: impl Into<String>,
        recipient_name: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            template_id: template_id.into(),
            recipient_name: recipient_name.into(),
        }
    }

    pub async fn submit(&self, inquiry: ContactInquiry) -> Result<DispatchReceipt, ContactError> {
        let service = validate_inquiry(&inquiry).map_err(ContactError::Invalid)?;
        let params = contact_parameters(&inquiry, service, &self.recipient_name);

        match self.sender.send(&self.template_id, params).await {
            Ok(receipt) => {
                tracing::info!(
                    enquirer = %mask_email(&inquiry.email),
                    service = service.value(),
                    "contact enquiry delivered"
                );
                Ok(receipt)
            }
            Err(err) => {
                tracing::error!(
                    enquirer = %mask_email(&inquiry.email),
                    kind = err.kind(),
                    error = %err,
                    "contact enquiry failed"
                );
                Err(err.into())
            }
        }
    }
}

pub fn contact_parameters(
    inquiry: &ContactInquiry,
    service: ConsultancyService,
    recipient_name: &str,
) -> EmailParameters {
    let name = inquiry.name.trim();
    let email = inquiry.email.trim();
    EmailParameters::new()
        .with("from_name", name)
        .with("reply_to", email)
        .with("to_name", recipient_name)
        .with("user_name", name)
        .with("user_email", email)
        .with("user_phone", inquiry.phone.trim())
        .with("user_service", service.label())
        .with("message", inquiry.message.trim())
}
