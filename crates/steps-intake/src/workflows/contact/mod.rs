//! General enquiries from the contact page, relayed straight to the team inbox.

pub mod domain;
pub mod router;
pub mod service;


pub use domain::{validate_inquiry, ConsultancyService, ContactInquiry};
pub use router::contact_router;
pub use service::{
    contact_parameters, ContactError, ContactService, CONTACT_FAILURE_MESSAGE,
    CONTACT_SUCCESS_MESSAGE,
};
