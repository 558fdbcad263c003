//! Debounced draft persistence: a background task coalescing bursts of
//! mutations into single snapshot writes.
//!
//! Persistence failures degrade to "no autosave": they are logged and never
//! surface to the wizard loop.

use crate::domain::WizardState;
use crate::ports::SnapshotPort;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Sending half handed to the wizard. Every draft mutation pushes the whole
/// state; the worker keeps only the newest one per debounce window.
#[derive(Clone)]
pub struct AutosaveHandle {
    tx: mpsc::UnboundedSender<WizardState>,
}

impl AutosaveHandle {
    pub fn mark_dirty(&self, state: WizardState) {
        if self.tx.send(state).is_err() {
            debug!("autosave channel closed, skipping snapshot");
        }
    }
}

/// Background worker: consumes state snapshots and writes the newest one
/// after the debounce window goes quiet.
pub struct AutosaveWorker {
    snapshot: Arc<dyn SnapshotPort>,
    rx: mpsc::UnboundedReceiver<WizardState>,
    debounce: Duration,
}

impl AutosaveWorker {
    /// Spawn the worker onto the runtime and return the handle for the wizard.
    pub fn spawn(snapshot: Arc<dyn SnapshotPort>, debounce: Duration) -> AutosaveHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = AutosaveWorker {
            snapshot,
            rx,
            debounce,
        };
        tokio::spawn(worker.run());
        AutosaveHandle { tx }
    }

    async fn run(mut self) {
        while let Some(first) = self.rx.recv().await {
            let mut latest = first;
            let mut closed = false;
            // Coalesce everything arriving within the debounce window.
            loop {
                match tokio::time::timeout(self.debounce, self.rx.recv()).await {
                    Ok(Some(newer)) => latest = newer,
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }
            if let Err(e) = self.snapshot.save(&latest).await {
                warn!(error = %e, "autosave failed; continuing without persistence");
            }
            if closed {
                break;
            }
        }
        info!("autosave worker finished (channel closed)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, Step};
    use tokio::sync::Mutex;

    struct CountingSnapshot {
        saves: Mutex<Vec<WizardState>>,
    }

    #[async_trait::async_trait]
    impl SnapshotPort for CountingSnapshot {
        async fn load(&self) -> Result<Option<WizardState>, DomainError> {
            Ok(None)
        }

        async fn save(&self, state: &WizardState) -> Result<(), DomainError> {
            self.saves.lock().await.push(state.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn burst_of_mutations_coalesces_into_one_save() {
        let snapshot = Arc::new(CountingSnapshot {
            saves: Mutex::new(Vec::new()),
        });
        let handle = AutosaveWorker::spawn(snapshot.clone(), Duration::from_millis(50));

        let mut state = WizardState::fresh();
        for i in 0..5 {
            state.draft.description = format!("draft revision {}", i);
            handle.mark_dirty(state.clone());
        }
        drop(handle);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let saves = snapshot.saves.lock().await;
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].draft.description, "draft revision 4");
    }

    #[tokio::test]
    async fn separate_bursts_each_get_written() {
        let snapshot = Arc::new(CountingSnapshot {
            saves: Mutex::new(Vec::new()),
        });
        let handle = AutosaveWorker::spawn(snapshot.clone(), Duration::from_millis(20));

        let mut state = WizardState::fresh();
        handle.mark_dirty(state.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;

        state.current_step = Step::Details;
        handle.mark_dirty(state.clone());
        drop(handle);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let saves = snapshot.saves.lock().await;
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[1].current_step, Step::Details);
    }
}
