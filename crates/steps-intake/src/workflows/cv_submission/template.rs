use super::domain::{ApplicantSubmission, FileDelivery};
use crate::relay::EmailParameters;

const NOT_PROVIDED: &str = "Not provided";
const NOT_SPECIFIED: &str = "Not specified";

/// Every parameter the CV notification template understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CvTemplateField {
    ToName,
    FromName,
    ReplyTo,
    Subject,
    UserName,
    UserEmail,
    UserPhone,
    Education,
    Experience,
    CvFile,
    CvDelivery,
    Message,
}

impl CvTemplateField {
    pub const ALL: [CvTemplateField; 12] = [
        CvTemplateField::ToName,
        CvTemplateField::FromName,
        CvTemplateField::ReplyTo,
        CvTemplateField::Subject,
        CvTemplateField::UserName,
        CvTemplateField::UserEmail,
        CvTemplateField::UserPhone,
        CvTemplateField::Education,
        CvTemplateField::Experience,
        CvTemplateField::CvFile,
        CvTemplateField::CvDelivery,
        CvTemplateField::Message,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            CvTemplateField::ToName => "to_name",
            CvTemplateField::FromName => "from_name",
            CvTemplateField::ReplyTo => "reply_to",
            CvTemplateField::Subject => "subject",
            CvTemplateField::UserName => "user_name",
            CvTemplateField::UserEmail => "user_email",
            CvTemplateField::UserPhone => "user_phone",
            CvTemplateField::Education => "education",
            CvTemplateField::Experience => "experience",
            CvTemplateField::CvFile => "cv_file",
            CvTemplateField::CvDelivery => "cv_delivery",
            CvTemplateField::Message => "message",
        }
    }
}

/// Typed builder so callers cannot introduce keys the template does not know.
#[derive(Debug, Default)]
pub struct CvTemplateParams {
    inner: EmailParameters,
}

impl CvTemplateParams {
    pub fn set(&mut self, field: CvTemplateField, value: impl Into<String>) -> &mut Self {
        self.inner.insert(field.key(), value.into());
        self
    }

    pub fn into_parameters(self) -> EmailParameters {
        self.inner
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

/// Parameters for the staff notification of one CV submission.
pub fn cv_notification(
    submission: &ApplicantSubmission,
    delivery: &FileDelivery,
    recipient_name: &str,
) -> EmailParameters {
    let name = submission.full_name.trim();
    let email = submission.email.trim();
    let education = or_default(&submission.education, NOT_SPECIFIED);
    let experience = or_default(&submission.experience, NOT_SPECIFIED);

    let mut params = CvTemplateParams::default();
    params
        .set(CvTemplateField::ToName, recipient_name)
        .set(CvTemplateField::FromName, name)
        .set(CvTemplateField::ReplyTo, email)
        .set(CvTemplateField::Subject, format!("CV Submission from {name}"))
        .set(CvTemplateField::UserName, name)
        .set(CvTemplateField::UserEmail, email)
        .set(
            CvTemplateField::UserPhone,
            or_default(&submission.phone, NOT_PROVIDED),
        )
        .set(CvTemplateField::Education, education)
        .set(CvTemplateField::Experience, experience)
        .set(CvTemplateField::CvFile, delivery.template_value())
        .set(CvTemplateField::CvDelivery, delivery.label())
        .set(
            CvTemplateField::Message,
            format!(
                "CV Submission from {name}\n\nEducation: {education}\nExperience: {experience}"
            ),
        );
    params.into_parameters()
}
