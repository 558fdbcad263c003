//! Application use cases. Orchestrate domain rules through the ports.

pub mod attachments;
pub mod autosave;
pub mod wizard_service;

pub use attachments::{AttachmentIntake, IntakeReport, StagedRejection};
pub use autosave::{AutosaveHandle, AutosaveWorker};
pub use wizard_service::{AdvanceOutcome, WizardService};
