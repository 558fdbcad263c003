//! Implements SnapshotPort using a JSON file.
//!
//! One snapshot per wizard instance: `{draft, current_step,
//! last_persisted_at}`. Saves use the write-replace pattern (temp file,
//! sync, atomic rename) so a crash mid-write cannot corrupt the snapshot.
//! Snapshots older than the TTL are discarded on load.

use crate::domain::{DomainError, WizardState};
use crate::ports::SnapshotPort;
use chrono::{Duration, Utc};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

pub struct SnapshotJson {
    path: std::path::PathBuf,
    ttl: Duration,
}

impl SnapshotJson {
    pub fn new(path: impl AsRef<Path>, ttl: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ttl,
        }
    }

    fn is_expired(&self, state: &WizardState) -> bool {
        match state.last_persisted_at {
            Some(at) => Utc::now() - at > self.ttl,
            // A snapshot without a timestamp cannot be aged; treat as stale.
            None => true,
        }
    }

    async fn remove_snapshot(&self) -> Result<(), DomainError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Snapshot(format!("remove snapshot: {}", e))),
        }
    }
}

#[async_trait::async_trait]
impl SnapshotPort for SnapshotJson {
    async fn load(&self) -> Result<Option<WizardState>, DomainError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DomainError::Snapshot(format!("read snapshot: {}", e))),
        };

        let state: WizardState = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                // A corrupt snapshot degrades to a fresh start, same as none.
                warn!(path = %self.path.display(), error = %e, "snapshot unreadable, discarding");
                self.remove_snapshot().await?;
                return Ok(None);
            }
        };

        if self.is_expired(&state) {
            info!(path = %self.path.display(), "snapshot expired, starting fresh");
            self.remove_snapshot().await?;
            return Ok(None);
        }

        Ok(Some(state))
    }

    async fn save(&self, state: &WizardState) -> Result<(), DomainError> {
        let mut stamped = state.clone();
        stamped.last_persisted_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(&stamped)
            .map_err(|e| DomainError::Snapshot(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Snapshot(format!("create data dir: {}", e)))?;
        }

        // Write to temp file first, flush, then atomically rename over the
        // target so a crash mid-write never leaves a half-written snapshot.
        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Snapshot(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Snapshot(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Snapshot(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Snapshot(format!("atomic rename failed: {}", e)))?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.remove_snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Step;

    fn store(dir: &tempfile::TempDir, ttl_hours: i64) -> SnapshotJson {
        SnapshotJson::new(dir.path().join("draft.json"), Duration::hours(ttl_hours))
    }

    #[tokio::test]
    async fn save_then_load_roundtrips_state() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = store(&dir, 24);

        let mut state = WizardState::fresh();
        state.current_step = Step::Contact;
        state.draft.description = "Спор о границах участка с соседом".into();
        state.draft.phone = "+79991234567".into();
        snapshot.save(&state).await.unwrap();

        let loaded = snapshot.load().await.unwrap().unwrap();
        assert_eq!(loaded.current_step, Step::Contact);
        assert_eq!(loaded.draft.description, state.draft.description);
        assert_eq!(loaded.draft.phone, state.draft.phone);
        assert_eq!(loaded.draft.client_ref, state.draft.client_ref);
        assert!(loaded.last_persisted_at.is_some());
    }

    #[tokio::test]
    async fn expired_snapshot_is_discarded_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = store(&dir, 24);

        let mut state = WizardState::fresh();
        state.current_step = Step::Details;
        state.last_persisted_at = Some(Utc::now() - Duration::hours(25));
        // Write directly so the stale timestamp is not re-stamped by save().
        std::fs::write(
            dir.path().join("draft.json"),
            serde_json::to_string(&state).unwrap(),
        )
        .unwrap();

        assert!(snapshot.load().await.unwrap().is_none());
        // The stale file is gone too.
        assert!(!dir.path().join("draft.json").exists());
    }

    #[tokio::test]
    async fn fresh_snapshot_within_ttl_survives_load() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = store(&dir, 24);

        let mut state = WizardState::fresh();
        state.last_persisted_at = Some(Utc::now() - Duration::hours(23));
        std::fs::write(
            dir.path().join("draft.json"),
            serde_json::to_string(&state).unwrap(),
        )
        .unwrap();

        assert!(snapshot.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_snapshot_degrades_to_fresh_start() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = store(&dir, 24);
        std::fs::write(dir.path().join("draft.json"), "{not json").unwrap();

        assert!(snapshot.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_removes_the_snapshot_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = store(&dir, 24);

        snapshot.save(&WizardState::fresh()).await.unwrap();
        snapshot.clear().await.unwrap();
        assert!(snapshot.load().await.unwrap().is_none());
        // Clearing again is not an error.
        snapshot.clear().await.unwrap();
    }
}
