//! Applications domain module.
//!
//! The application record, its status state machine and submission
//! validation. Pure domain logic: no IO, no HTTP, no storage.

pub mod application;
pub mod status;
pub mod submission;

pub use application::{ApplicantSummary, Application, ApplicationSummary};
pub use status::ApplicationStatus;
pub use submission::{SubmissionDraft, SubmissionFields};
