//! Core domain layer. No external I/O dependencies.
//!
//! Entities and validation rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod validation;

pub use entities::{
    ApplicationDraft, ContactMethod, ContactTime, FileAttachment, HostContext, ServiceCategory,
    Step, SubmissionReceipt, WizardState, MAX_ATTACHMENTS, MAX_ATTACHMENT_BYTES,
};
pub use errors::DomainError;
pub use validation::{first_violation, FieldCheck};
