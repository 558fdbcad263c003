//! The step controller: gates navigation on per-step validity, runs the
//! submission round-trip from the review step, and keeps the draft flowing
//! into the autosave channel.
//!
//! The service owns its `WizardState` outright: one wizard loop, one owner,
//! no locks.

use crate::domain::{
    first_violation, ApplicationDraft, ContactMethod, ContactTime, DomainError, FileAttachment,
    HostContext, ServiceCategory, Step, SubmissionReceipt, WizardState,
};
use crate::ports::{SnapshotPort, SubmitGateway};
use crate::usecases::AutosaveHandle;
use std::sync::Arc;
use tracing::{info, warn};

/// What a call to `advance()` did.
#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    /// Moved forward to the given step.
    Moved(Step),
    /// The current step has an unmet rule; state unchanged.
    Blocked(String),
    /// The review step submitted successfully; terminal state reached.
    Submitted(SubmissionReceipt),
}

pub struct WizardService {
    state: WizardState,
    snapshot: Arc<dyn SnapshotPort>,
    gateway: Arc<dyn SubmitGateway>,
    autosave: AutosaveHandle,
    context: HostContext,
    receipt: Option<SubmissionReceipt>,
}

impl WizardService {
    /// Build the service, adopting a prior snapshot when one is fresh enough.
    /// Returns whether prior progress was restored so the UI can say so.
    /// A failed load degrades to a fresh state; persistence never hard-fails
    /// the wizard.
    pub async fn restore_or_new(
        snapshot: Arc<dyn SnapshotPort>,
        gateway: Arc<dyn SubmitGateway>,
        autosave: AutosaveHandle,
        context: HostContext,
    ) -> (Self, bool) {
        let (mut state, restored) = match snapshot.load().await {
            Ok(Some(prior)) => {
                info!(step = prior.current_step.number(), "restored saved progress");
                (prior, true)
            }
            Ok(None) => (WizardState::fresh(), false),
            Err(e) => {
                warn!(error = %e, "snapshot load failed, starting fresh");
                (WizardState::fresh(), false)
            }
        };
        // The host identity always comes from the current launch, not the save.
        state.draft.external_user_id = context.user_id;

        (
            Self {
                state,
                snapshot,
                gateway,
                autosave,
                context,
                receipt: None,
            },
            restored,
        )
    }

    pub fn current_step(&self) -> Step {
        self.state.current_step
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.state.draft
    }

    pub fn is_finished(&self) -> bool {
        self.receipt.is_some()
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    // --- Draft mutators. Each marks the autosave channel dirty. ---

    pub fn select_category(&mut self, category: &ServiceCategory) {
        self.state.draft.category_id = Some(category.id);
        self.state.draft.category_name = category.name.clone();
        self.touch();
    }

    pub fn set_subcategory(&mut self, subcategory: &str) {
        self.state.draft.subcategory = subcategory.trim().to_string();
        self.touch();
    }

    pub fn set_description(&mut self, description: &str) {
        self.state.draft.description = description.trim().to_string();
        self.touch();
    }

    pub fn set_name(&mut self, name: &str) {
        self.state.draft.name = name.trim().to_string();
        self.touch();
    }

    pub fn set_phone(&mut self, phone: &str) {
        self.state.draft.phone = phone.trim().to_string();
        self.touch();
    }

    pub fn set_email(&mut self, email: &str) {
        self.state.draft.email = email.trim().to_string();
        self.touch();
    }

    pub fn set_contact_method(&mut self, method: ContactMethod) {
        self.state.draft.contact_method = Some(method);
        self.touch();
    }

    pub fn set_contact_time(&mut self, time: ContactTime) {
        self.state.draft.contact_time = time;
        self.touch();
    }

    pub fn add_attachments(&mut self, accepted: Vec<FileAttachment>) {
        if accepted.is_empty() {
            return;
        }
        self.state.draft.files.extend(accepted);
        self.touch();
    }

    /// Unstage a previously added attachment. The autosave signal keeps the
    /// persisted snapshot in step with the removal.
    pub fn remove_attachment(&mut self, index: usize) -> Option<FileAttachment> {
        if index >= self.state.draft.files.len() {
            return None;
        }
        let removed = self.state.draft.files.remove(index);
        self.touch();
        Some(removed)
    }

    // --- Navigation ---

    /// Move forward when the current step's rules are met. On the review step
    /// this runs the submission instead of a step change. A `Blocked` outcome
    /// leaves the state untouched; submission errors propagate with the state
    /// kept on review so the user can retry.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, DomainError> {
        if self.is_finished() {
            return Ok(AdvanceOutcome::Blocked(
                "The application has already been submitted.".to_string(),
            ));
        }
        if let Some(message) = first_violation(self.state.current_step, &self.state.draft) {
            return Ok(AdvanceOutcome::Blocked(message));
        }
        match self.state.current_step.next() {
            Some(next) => {
                self.state.current_step = next;
                self.touch();
                Ok(AdvanceOutcome::Moved(next))
            }
            None => {
                let receipt = self.submit().await?;
                Ok(AdvanceOutcome::Submitted(receipt))
            }
        }
    }

    /// Step back. Never validates; a no-op on the first step.
    pub fn retreat(&mut self) -> bool {
        match self.state.current_step.prev() {
            Some(prev) => {
                self.state.current_step = prev;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Final save when the wizard loop exits without submitting (the
    /// page-unload analog). Failures are logged, never propagated.
    pub async fn flush(&self) {
        if self.is_finished() {
            return;
        }
        if let Err(e) = self.snapshot.save(&self.state).await {
            warn!(error = %e, "final snapshot save failed");
        }
    }

    async fn submit(&mut self) -> Result<SubmissionReceipt, DomainError> {
        let receipt = self
            .gateway
            .submit(&self.state.draft, &self.context)
            .await?;
        info!(
            application_id = receipt.application_id,
            has_payment_url = receipt.payment_url.is_some(),
            "application accepted"
        );
        self.receipt = Some(receipt.clone());

        // The snapshot is only cleared on confirmed success; a failure here
        // costs nothing but a stale file that the TTL will reap.
        if let Err(e) = self.snapshot.clear().await {
            warn!(error = %e, "could not clear snapshot after submit");
        }

        // Best-effort staff notification on a detached task; its outcome never
        // touches the user-visible result.
        if let Some(application_id) = receipt.application_id {
            let gateway = Arc::clone(&self.gateway);
            let draft = self.state.draft.clone();
            tokio::spawn(async move {
                if let Err(e) = gateway.notify_staff(application_id, &draft).await {
                    warn!(application_id, error = %e, "staff notification failed");
                }
            });
        }

        Ok(receipt)
    }

    fn touch(&self) {
        self.autosave.mark_dirty(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::AutosaveWorker;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    struct MemorySnapshot {
        stored: Mutex<Option<WizardState>>,
        cleared: AtomicBool,
    }

    impl MemorySnapshot {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                stored: Mutex::new(None),
                cleared: AtomicBool::new(false),
            })
        }
    }

    #[async_trait::async_trait]
    impl SnapshotPort for MemorySnapshot {
        async fn load(&self) -> Result<Option<WizardState>, DomainError> {
            Ok(self.stored.lock().await.clone())
        }

        async fn save(&self, state: &WizardState) -> Result<(), DomainError> {
            *self.stored.lock().await = Some(state.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<(), DomainError> {
            *self.stored.lock().await = None;
            self.cleared.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ScriptedGateway {
        submitted: Mutex<Vec<ApplicationDraft>>,
        fail_first: AtomicBool,
        notified: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(fail_first: bool) -> Arc<Self> {
            Arc::new(Self {
                submitted: Mutex::new(Vec::new()),
                fail_first: AtomicBool::new(fail_first),
                notified: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl SubmitGateway for ScriptedGateway {
        async fn submit(
            &self,
            draft: &ApplicationDraft,
            _context: &HostContext,
        ) -> Result<SubmissionReceipt, DomainError> {
            self.submitted.lock().await.push(draft.clone());
            if self.fail_first.swap(false, Ordering::SeqCst) {
                return Err(DomainError::Transport("connection reset".into()));
            }
            Ok(SubmissionReceipt {
                application_id: Some(101),
                payment_url: None,
            })
        }

        async fn notify_staff(
            &self,
            _application_id: i64,
            _draft: &ApplicationDraft,
        ) -> Result<(), DomainError> {
            self.notified.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn service_with(
        snapshot: Arc<MemorySnapshot>,
        gateway: Arc<ScriptedGateway>,
    ) -> WizardService {
        let autosave = AutosaveWorker::spawn(snapshot.clone(), Duration::from_millis(10));
        let (service, _) = WizardService::restore_or_new(
            snapshot,
            gateway,
            autosave,
            HostContext {
                user_id: Some(777),
                start_param: Some("utm_test".into()),
            },
        )
        .await;
        service
    }

    fn fill_valid_draft(service: &mut WizardService) {
        let catalog = ServiceCategory::catalog();
        let real_estate = catalog.iter().find(|c| c.id == 3).unwrap();
        service.select_category(real_estate);
        service.set_description("Спор о границах участка с соседом");
        service.set_name("Иван");
        service.set_phone("+79991234567");
        service.set_contact_method(ContactMethod::Telegram);
    }

    #[tokio::test]
    async fn advance_without_category_is_blocked_in_place() {
        let mut service = service_with(MemorySnapshot::new(), ScriptedGateway::new(false)).await;

        let outcome = service.advance().await.unwrap();
        assert!(matches!(outcome, AdvanceOutcome::Blocked(_)));
        assert_eq!(service.current_step(), Step::Category);
    }

    #[tokio::test]
    async fn retreat_never_validates_and_stops_at_step_one() {
        let mut service = service_with(MemorySnapshot::new(), ScriptedGateway::new(false)).await;
        assert!(!service.retreat());

        fill_valid_draft(&mut service);
        service.advance().await.unwrap();
        assert_eq!(service.current_step(), Step::Details);

        // Clearing the description does not stop a retreat.
        service.set_description("");
        assert!(service.retreat());
        assert_eq!(service.current_step(), Step::Category);
    }

    #[tokio::test]
    async fn full_flow_submits_once_and_clears_snapshot() {
        let snapshot = MemorySnapshot::new();
        let gateway = ScriptedGateway::new(false);
        let mut service = service_with(snapshot.clone(), gateway.clone()).await;
        fill_valid_draft(&mut service);

        for expected in [Step::Details, Step::Contact, Step::Review] {
            match service.advance().await.unwrap() {
                AdvanceOutcome::Moved(step) => assert_eq!(step, expected),
                other => panic!("expected Moved, got {:?}", other),
            }
        }

        let outcome = service.advance().await.unwrap();
        let AdvanceOutcome::Submitted(receipt) = outcome else {
            panic!("expected Submitted");
        };
        assert_eq!(receipt.application_id, Some(101));
        assert!(service.is_finished());
        assert!(snapshot.cleared.load(Ordering::SeqCst));

        let submitted = gateway.submitted.lock().await;
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].category_id, Some(3));
        assert_eq!(submitted[0].category_name, "Недвижимость");
        assert_eq!(submitted[0].contact_method, Some(ContactMethod::Telegram));
        assert_eq!(submitted[0].external_user_id, Some(777));
        drop(submitted);

        // Staff notification lands on a detached task.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(gateway.notified.load(Ordering::SeqCst), 1);

        // Terminal state refuses another advance.
        let again = service.advance().await.unwrap();
        assert!(matches!(again, AdvanceOutcome::Blocked(_)));
    }

    #[tokio::test]
    async fn failed_submit_keeps_review_state_and_client_ref_stable() {
        let snapshot = MemorySnapshot::new();
        let gateway = ScriptedGateway::new(true);
        let mut service = service_with(snapshot.clone(), gateway.clone()).await;
        fill_valid_draft(&mut service);
        for _ in 0..3 {
            service.advance().await.unwrap();
        }

        let err = service.advance().await.unwrap_err();
        assert!(matches!(err, DomainError::Transport(_)));
        assert_eq!(service.current_step(), Step::Review);
        assert!(!service.is_finished());
        assert!(!snapshot.cleared.load(Ordering::SeqCst));

        // Retry succeeds; both attempts carried the same idempotency token.
        let outcome = service.advance().await.unwrap();
        assert!(matches!(outcome, AdvanceOutcome::Submitted(_)));

        let submitted = gateway.submitted.lock().await;
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0].client_ref, submitted[1].client_ref);
        assert_ne!(submitted[0].client_ref, Uuid::nil());
    }

    #[tokio::test]
    async fn restore_adopts_saved_state_and_refreshes_host_identity() {
        let snapshot = MemorySnapshot::new();
        let mut saved = WizardState::fresh();
        saved.current_step = Step::Contact;
        saved.draft.description = "Спор о границах участка с соседом".into();
        saved.draft.external_user_id = Some(1); // stale identity from the save
        *snapshot.stored.lock().await = Some(saved);

        let gateway = ScriptedGateway::new(false);
        let autosave = AutosaveWorker::spawn(snapshot.clone(), Duration::from_millis(10));
        let (service, restored) = WizardService::restore_or_new(
            snapshot,
            gateway,
            autosave,
            HostContext {
                user_id: Some(777),
                start_param: None,
            },
        )
        .await;

        assert!(restored);
        assert_eq!(service.current_step(), Step::Contact);
        assert_eq!(service.draft().external_user_id, Some(777));
    }

    #[tokio::test]
    async fn attachment_removal_updates_draft() {
        let mut service = service_with(MemorySnapshot::new(), ScriptedGateway::new(false)).await;
        service.add_attachments(vec![FileAttachment {
            name: "claim.pdf".into(),
            size_bytes: 4,
            mime_type: "application/pdf".into(),
            encoded_data: "JVBERg==".into(),
        }]);
        assert_eq!(service.draft().files.len(), 1);

        assert!(service.remove_attachment(5).is_none());
        let removed = service.remove_attachment(0).unwrap();
        assert_eq!(removed.name, "claim.pdf");
        assert!(service.draft().files.is_empty());
    }
}
