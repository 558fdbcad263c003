//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ApplicationDraft, DomainError, HostContext, SubmissionReceipt, WizardState};

/// Durable snapshot of the wizard state, so a restart does not lose progress.
#[async_trait::async_trait]
pub trait SnapshotPort: Send + Sync {
    /// Read a prior snapshot. Returns `None` when there is none or the saved
    /// one has expired (expired snapshots are discarded on read).
    async fn load(&self) -> Result<Option<WizardState>, DomainError>;

    /// Persist the current state. Stamps `last_persisted_at`.
    async fn save(&self, state: &WizardState) -> Result<(), DomainError>;

    /// Remove the snapshot. Called only after a confirmed successful submit.
    async fn clear(&self) -> Result<(), DomainError>;
}

/// Backend gateway: the one network round-trip that finalizes a draft, plus
/// the best-effort staff notification fired after success.
#[async_trait::async_trait]
pub trait SubmitGateway: Send + Sync {
    /// POST the completed draft. Ok only when the server acknowledged with an
    /// ok status; every failure keeps the draft retryable.
    async fn submit(
        &self,
        draft: &ApplicationDraft,
        context: &HostContext,
    ) -> Result<SubmissionReceipt, DomainError>;

    /// Notify staff that an application landed. Best-effort; callers must not
    /// let a failure here affect the user-visible outcome.
    async fn notify_staff(
        &self,
        application_id: i64,
        draft: &ApplicationDraft,
    ) -> Result<(), DomainError>;
}

/// Haptic cues the hosting chat client may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticFeedback {
    Success,
    Warning,
    Error,
}

/// Capability set of the hosting chat client. The wizard must behave
/// identically when only the no-op variant is available.
pub trait HostPort: Send + Sync {
    /// Launch context (originating user id, start/referral parameter).
    fn context(&self) -> HostContext;

    /// Haptic cue. No-op when the host has no such affordance.
    fn haptic(&self, feedback: HapticFeedback);

    /// Show or hide the host's main action affordance with the given label.
    fn set_main_action(&self, label: Option<&str>);

    /// Ask the host to close the embedded app. No-op without a host.
    fn close(&self);
}
