use std::sync::OnceLock;

use regex::Regex;

use super::domain::{ApplicantSubmission, AttachedFile, FieldErrors};

/// Largest CV accepted by the form: 5 MB.
pub const MAX_CV_BYTES: usize = 5 * 1024 * 1024;

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_EDUCATION: &str = "education";
pub const FIELD_EXPERIENCE: &str = "experience";
pub const FIELD_CV_FILE: &str = "cvFile";

const PDF: &str = "application/pdf";
const DOC: &str = "application/msword";
const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const ALLOWED_CONTENT_TYPES: [&str; 3] = [PDF, DOC, DOCX];
const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"))
}

/// Loose shape check matching the one the site has always applied.
pub fn is_valid_email(raw: &str) -> bool {
    email_pattern().is_match(raw)
}

/// Why an attachment was refused at selection time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentRejection {
    #[error("File size must be less than 5MB")]
    TooLarge { size: usize },
    #[error("Only PDF, DOC, and DOCX files are allowed")]
    UnsupportedType { content_type: String },
    #[error("The selected file is empty")]
    Empty,
}

/// Immediate type/size check run as soon as a file is picked.
pub fn check_attachment(file: &AttachedFile) -> Result<(), AttachmentRejection> {
    if file.size() == 0 {
        return Err(AttachmentRejection::Empty);
    }
    if file.size() > MAX_CV_BYTES {
        return Err(AttachmentRejection::TooLarge { size: file.size() });
    }

    let content_type = normalized_content_type(&file.content_type);
    let allowed = if ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        true
    } else if content_type.is_empty() || content_type == "application/octet-stream" {
        file.extension()
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
    } else {
        false
    };

    if allowed {
        Ok(())
    } else {
        Err(AttachmentRejection::UnsupportedType {
            content_type: file.content_type.clone(),
        })
    }
}

fn normalized_content_type(raw: &str) -> String {
    match raw.trim().parse::<mime::Mime>() {
        Ok(parsed) => parsed.essence_str().to_ascii_lowercase(),
        Err(_) => raw.trim().to_ascii_lowercase(),
    }
}

/// Required-field checks run before any network activity.
pub fn validate_submission(submission: &ApplicantSubmission) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    if submission.full_name.trim().is_empty() {
        errors.insert(FIELD_NAME, "Name is required");
    }

    let email = submission.email.trim();
    if email.is_empty() {
        errors.insert(FIELD_EMAIL, "Email is required");
    } else if !is_valid_email(email) {
        errors.insert(FIELD_EMAIL, "Email is invalid");
    }

    if submission.phone.trim().is_empty() {
        errors.insert(FIELD_PHONE, "Phone number is required");
    }

    match &submission.attachment {
        None => errors.insert(FIELD_CV_FILE, "Please upload your CV"),
        Some(file) => {
            if let Err(rejection) = check_attachment(file) {
                errors.insert(FIELD_CV_FILE, rejection.to_string());
            }
        }
    }

    errors.into_result()
}
