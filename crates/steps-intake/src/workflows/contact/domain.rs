use serde::{Deserialize, Serialize};

use crate::workflows::cv_submission::domain::FieldErrors;
use crate::workflows::cv_submission::validation::is_valid_email;

/// A general enquiry sent from the contact page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
}

/// Services an enquirer can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultancyService {
    InternationalStudentRecruitment,
    DocumentsAssessment,
    UniversitySelection,
    AdmissionProcess,
    VisaApplication,
    LocalStudentAdmissions,
    EmployabilityServices,
}

impl ConsultancyService {
    pub const ALL: [ConsultancyService; 7] = [
        ConsultancyService::InternationalStudentRecruitment,
        ConsultancyService::DocumentsAssessment,
        ConsultancyService::UniversitySelection,
        ConsultancyService::AdmissionProcess,
        ConsultancyService::VisaApplication,
        ConsultancyService::LocalStudentAdmissions,
        ConsultancyService::EmployabilityServices,
    ];

    /// Value submitted by the form's select box.
    pub const fn value(self) -> &'static str {
        match self {
            ConsultancyService::InternationalStudentRecruitment => {
                "International Student Recruitment"
            }
            ConsultancyService::DocumentsAssessment => "Documents Assessment",
            ConsultancyService::UniversitySelection => "University Selection",
            ConsultancyService::AdmissionProcess => "Admission Process",
            ConsultancyService::VisaApplication => "Visa Application",
            ConsultancyService::LocalStudentAdmissions => "Local Student Admissions",
            ConsultancyService::EmployabilityServices => "Employability Services",
        }
    }

    /// Text shown to the enquirer.
    pub const fn label(self) -> &'static str {
        match self {
            ConsultancyService::VisaApplication => "Visa Application Guidance",
            other => other.value(),
        }
    }

    pub fn from_value(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|service| service.value().eq_ignore_ascii_case(raw))
    }
}

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_SERVICE: &str = "service";
pub const FIELD_MESSAGE: &str = "message";

/// Required-field checks for an enquiry; returns the selected service when everything passes.
pub fn validate_inquiry(inquiry: &ContactInquiry) -> Result<ConsultancyService, FieldErrors> {
    let mut errors = FieldErrors::default();

    if inquiry.name.trim().is_empty() {
        errors.insert(FIELD_NAME, "Name is required");
    }

    let email = inquiry.email.trim();
    if email.is_empty() {
        errors.insert(FIELD_EMAIL, "Email is required");
    } else if !is_valid_email(email) {
        errors.insert(FIELD_EMAIL, "Email is invalid");
    }

    if inquiry.phone.trim().is_empty() {
        errors.insert(FIELD_PHONE, "Phone number is required");
    }

    let service = ConsultancyService::from_value(&inquiry.service);
    if service.is_none() {
        errors.insert(FIELD_SERVICE, "Please select a service");
    }

    if inquiry.message.trim().is_empty() {
        errors.insert(FIELD_MESSAGE, "Message is required");
    }

    match service {
        Some(service) if errors.is_empty() => Ok(service),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visa_option_has_a_longer_label() {
        let visa = ConsultancyService::from_value("visa application").expect("known service");
        assert_eq!(visa, ConsultancyService::VisaApplication);
        assert_eq!(visa.label(), "Visa Application Guidance");
        assert_eq!(
            ConsultancyService::DocumentsAssessment.label(),
            "Documents Assessment"
        );
        assert_eq!(ConsultancyService::from_value("Tutoring"), None);
    }

    #[test]
    fn every_field_is_required() {
        let errors = validate_inquiry(&ContactInquiry::default()).expect_err("empty enquiry");
        assert_eq!(errors.get(FIELD_NAME), Some("Name is required"));
        assert_eq!(errors.get(FIELD_EMAIL), Some("Email is required"));
        assert_eq!(errors.get(FIELD_PHONE), Some("Phone number is required"));
        assert_eq!(errors.get(FIELD_SERVICE), Some("Please select a service"));
        assert_eq!(errors.get(FIELD_MESSAGE), Some("Message is required"));
    }

    #[test]
    fn complete_enquiry_resolves_service() {
        let inquiry = ContactInquiry {
            name: "Ade".into(),
            email: "ade@example.org".into(),
            phone: "0123".into(),
            service: "University Selection".into(),
            message: "Which universities fit a 2:1 in economics?".into(),
        };
        assert_eq!(
            validate_inquiry(&inquiry),
            Ok(ConsultancyService::UniversitySelection)
        );
    }
}
