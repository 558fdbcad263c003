//! File intake: validate user-selected files and stage them as encoded
//! attachments.
//!
//! Each candidate is judged independently; one rejection never discards
//! already-accepted files, and one failed encode never aborts its siblings.
//! Reads and encoding run concurrently, bounded by a semaphore.

use crate::domain::{FileAttachment, MAX_ATTACHMENTS, MAX_ATTACHMENT_BYTES};
use base64::Engine;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Maximum concurrent file reads/encodes.
const MAX_CONCURRENT: usize = 3;

/// Extension allow-list with the MIME type sent to the backend.
const ALLOWED_TYPES: [(&str, &str); 6] = [
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
];

/// A candidate that failed one of the intake rules, with the reason.
#[derive(Debug, Clone)]
pub struct StagedRejection {
    pub name: String,
    pub reason: String,
}

/// Outcome of staging one selection of files.
#[derive(Debug, Default)]
pub struct IntakeReport {
    pub accepted: Vec<FileAttachment>,
    pub rejected: Vec<StagedRejection>,
}

/// Stages filesystem paths into validated, base64-encoded attachments.
pub struct AttachmentIntake;

impl AttachmentIntake {
    pub fn new() -> Self {
        Self
    }

    /// Validate and encode a selection. `already_staged` is the number of
    /// attachments the draft holds; candidates that would push the total past
    /// the limit are rejected without touching the accepted ones.
    pub async fn stage(&self, paths: &[PathBuf], already_staged: usize) -> IntakeReport {
        let mut report = IntakeReport::default();
        let slots = MAX_ATTACHMENTS.saturating_sub(already_staged);

        // Cheap sequential pre-checks (extension, count) before any I/O.
        let mut candidates: Vec<(PathBuf, String, &'static str)> = Vec::new();
        for path in paths {
            let name = display_name(path);
            let Some(mime) = mime_for_path(path) else {
                report.rejected.push(StagedRejection {
                    name,
                    reason: "unsupported file type (allowed: pdf, doc, docx, jpg, jpeg, png)"
                        .to_string(),
                });
                continue;
            };
            if candidates.len() >= slots {
                report.rejected.push(StagedRejection {
                    name,
                    reason: format!("attachment limit reached ({} files per application)", MAX_ATTACHMENTS),
                });
                continue;
            }
            candidates.push((path.clone(), name, mime));
        }

        // Concurrent read + encode, results collected in selection order.
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT));
        let mut handles = Vec::with_capacity(candidates.len());
        for (path, name, mime) in candidates {
            let sem = Arc::clone(&semaphore);
            handles.push((
                name.clone(),
                tokio::spawn(async move {
                    let _permit = sem.acquire().await.expect("semaphore closed");
                    encode_one(&path, name, mime).await
                }),
            ));
        }

        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(attachment)) => {
                    debug!(name = %attachment.name, size = attachment.size_bytes, "attachment staged");
                    report.accepted.push(attachment);
                }
                Ok(Err(reason)) => {
                    warn!(name = %name, reason = %reason, "attachment rejected");
                    report.rejected.push(StagedRejection { name, reason });
                }
                Err(e) => {
                    warn!(name = %name, error = %e, "attachment task failed");
                    report.rejected.push(StagedRejection {
                        name,
                        reason: "could not read the file".to_string(),
                    });
                }
            }
        }

        report
    }
}

impl Default for AttachmentIntake {
    fn default() -> Self {
        Self::new()
    }
}

async fn encode_one(
    path: &Path,
    name: String,
    mime: &'static str,
) -> Result<FileAttachment, String> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| format!("could not read the file: {}", e))?;
    if meta.len() > MAX_ATTACHMENT_BYTES {
        return Err(format!(
            "file exceeds the {} MiB limit",
            MAX_ATTACHMENT_BYTES / (1024 * 1024)
        ));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("could not read the file: {}", e))?;
    // The file may have grown between metadata and read; the byte count is
    // authoritative.
    if bytes.len() as u64 > MAX_ATTACHMENT_BYTES {
        return Err(format!(
            "file exceeds the {} MiB limit",
            MAX_ATTACHMENT_BYTES / (1024 * 1024)
        ));
    }

    let size_bytes = bytes.len() as u64;
    let encoded_data = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(FileAttachment {
        name,
        size_bytes,
        mime_type: mime.to_string(),
        encoded_data,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(_, mime)| *mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn stages_allowed_files_and_encodes_them() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_file(&dir, "claim.pdf", b"%PDF-1.4 minimal");
        let jpg = write_file(&dir, "photo.jpg", &[0xFF, 0xD8, 0xFF]);

        let report = AttachmentIntake::new().stage(&[pdf, jpg], 0).await;
        assert_eq!(report.accepted.len(), 2);
        assert!(report.rejected.is_empty());
        // Selection order is preserved.
        assert_eq!(report.accepted[0].name, "claim.pdf");
        assert_eq!(report.accepted[0].mime_type, "application/pdf");
        assert_eq!(
            report.accepted[0].encoded_data,
            base64::engine::general_purpose::STANDARD.encode(b"%PDF-1.4 minimal")
        );
    }

    #[tokio::test]
    async fn rejects_disallowed_extension_without_touching_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let exe = write_file(&dir, "malware.exe", b"MZ");
        let png = write_file(&dir, "scan.png", b"\x89PNG");

        let report = AttachmentIntake::new().stage(&[exe, png], 0).await;
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].name, "scan.png");
        assert_eq!(report.rejected.len(), 1);
        assert!(report.rejected[0].reason.contains("unsupported"));
    }

    #[tokio::test]
    async fn sixth_file_is_rejected_but_existing_five_stay() {
        let dir = tempfile::tempdir().unwrap();
        let sixth = write_file(&dir, "extra.pdf", b"%PDF");

        let report = AttachmentIntake::new().stage(&[sixth], 5).await;
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected.len(), 1);
        assert!(report.rejected[0].reason.contains("limit"));
    }

    #[tokio::test]
    async fn size_boundary_is_exactly_ten_mib() {
        let dir = tempfile::tempdir().unwrap();
        let at_limit = write_file(&dir, "at-limit.pdf", &vec![0u8; MAX_ATTACHMENT_BYTES as usize]);
        let over = write_file(
            &dir,
            "over.pdf",
            &vec![0u8; MAX_ATTACHMENT_BYTES as usize + 1],
        );

        let report = AttachmentIntake::new().stage(&[at_limit, over], 0).await;
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].name, "at-limit.pdf");
        assert_eq!(report.accepted[0].size_bytes, MAX_ATTACHMENT_BYTES);
        assert_eq!(report.rejected.len(), 1);
        assert!(report.rejected[0].reason.contains("MiB"));
    }

    #[tokio::test]
    async fn missing_file_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(&dir, "ok.pdf", b"%PDF");
        let missing = dir.path().join("gone.pdf");

        let report = AttachmentIntake::new().stage(&[missing, good], 0).await;
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].name, "ok.pdf");
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].name, "gone.pdf");
    }
}
