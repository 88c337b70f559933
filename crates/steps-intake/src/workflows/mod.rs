pub mod contact;
pub mod cv_submission;
pub mod scholarship;
pub mod site;

pub use contact::{contact_router, ContactService};
pub use cv_submission::{cv_submission_router, FieldErrors, SubmissionOrchestrator};
pub use scholarship::scholarship_router;
pub use site::site_router;
