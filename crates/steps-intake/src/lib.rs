//! Intake workflows behind the Steps Education website: CV submissions, contact enquiries,
//! scholarship estimates, and visitor theme preferences.

pub mod config;
pub mod error;
pub mod preferences;
pub mod relay;
pub mod storage;
pub mod telemetry;
pub mod workflows;
