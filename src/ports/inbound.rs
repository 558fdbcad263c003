//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: the presentation layer drives the wizard through this.
#[async_trait::async_trait(?Send)]
pub trait InputPort: Send + Sync {
    /// Run the interactive intake flow (category -> description -> contact ->
    /// review/submit). Returns when the wizard finishes or the user exits.
    async fn run_wizard(&self) -> Result<(), DomainError>;
}
