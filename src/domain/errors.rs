//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Attachment rejected: {0}")]
    Intake(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// HTTP round-trip succeeded but the server reported a non-ok status.
    #[error("Submission rejected: {0}")]
    Rejected(String),

    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    #[error("Request rejected: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerFailure(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Staff notification failed: {0}")]
    Notify(String),

    #[error("Host integration error: {0}")]
    Host(String),
}

impl DomainError {
    /// User-facing message for the review screen. Submission-family errors
    /// keep the user on the review step with the draft intact, so the text
    /// always points at retrying rather than starting over.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::Validation(msg) => msg.clone(),
            DomainError::Intake(msg) => msg.clone(),
            DomainError::Snapshot(_) => {
                "Autosave is unavailable this session; your answers are kept in memory.".to_string()
            }
            DomainError::Rejected(msg) => format!("The server declined the application: {}", msg),
            DomainError::Unauthorized(_) => {
                "Authorization failed. Please reopen the app and try again.".to_string()
            }
            DomainError::BadRequest(_) => {
                "The server could not accept the application data. Please check your answers and retry.".to_string()
            }
            DomainError::ServerFailure(_) => {
                "The service is temporarily unavailable. Your application was kept, so please retry in a minute.".to_string()
            }
            DomainError::Transport(_) => {
                "Could not reach the server. Check your connection and retry; nothing was lost.".to_string()
            }
            DomainError::Notify(msg) => msg.clone(),
            DomainError::Host(msg) => msg.clone(),
        }
    }
}
