//! Mock backend gateway for development and testing without a server.
//!
//! Returns deterministic receipts and records the last submitted draft.
//! Simulates network latency with a configurable delay.

use crate::domain::{ApplicationDraft, DomainError, HostContext, SubmissionReceipt};
use crate::ports::SubmitGateway;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

pub struct MockSubmitGateway {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
    next_id: AtomicI64,
    last_submitted: Mutex<Option<ApplicationDraft>>,
}

impl MockSubmitGateway {
    /// Create a new mock gateway with default delay (300ms).
    pub fn new() -> Self {
        Self::with_delay(300)
    }

    /// Create a mock gateway with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            next_id: AtomicI64::new(101),
            last_submitted: Mutex::new(None),
        }
    }

    /// Last draft that went through `submit`, for assertions in tests.
    pub async fn last_submitted(&self) -> Option<ApplicationDraft> {
        self.last_submitted.lock().await.clone()
    }
}

impl Default for MockSubmitGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SubmitGateway for MockSubmitGateway {
    async fn submit(
        &self,
        draft: &ApplicationDraft,
        _context: &HostContext,
    ) -> Result<SubmissionReceipt, DomainError> {
        info!(
            category_id = draft.category_id,
            files = draft.files.len(),
            "[MOCK] Simulating application submit"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        *self.last_submitted.lock().await = Some(draft.clone());

        Ok(SubmissionReceipt {
            application_id: Some(self.next_id.fetch_add(1, Ordering::SeqCst)),
            payment_url: None,
        })
    }

    async fn notify_staff(
        &self,
        application_id: i64,
        _draft: &ApplicationDraft,
    ) -> Result<(), DomainError> {
        info!(application_id, "[MOCK] Simulating staff notification");
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        Ok(())
    }
}
