//! Backend gateway over HTTP. Implements SubmitGateway with reqwest.
//!
//! One POST finalizes the draft; failures are classified by status family so
//! the wizard can tell the user whether to fix data, retry, or reopen the
//! app. The staff notification endpoint is best-effort.

use crate::domain::{
    ApplicationDraft, ContactMethod, ContactTime, DomainError, HostContext, SubmissionReceipt,
};
use crate::ports::SubmitGateway;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct HttpSubmitGateway {
    client: reqwest::Client,
    submit_url: String,
    notify_url: Option<String>,
}

impl HttpSubmitGateway {
    /// Build the gateway with a hard per-request timeout so a dead backend
    /// cannot leave the wizard hanging.
    pub fn new(
        submit_url: String,
        notify_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Transport(format!("HTTP client init: {}", e)))?;
        Ok(Self {
            client,
            submit_url,
            notify_url,
        })
    }
}

/// Wire shape of the submission body. Mirrors the draft plus launch context.
#[derive(Serialize)]
struct SubmitRequest<'a> {
    category_id: Option<i32>,
    category_name: &'a str,
    subcategory: &'a str,
    description: &'a str,
    name: &'a str,
    phone: &'a str,
    email: &'a str,
    contact_method: Option<ContactMethod>,
    contact_time: ContactTime,
    files: Vec<FilePayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    telegram_user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_param: Option<&'a str>,
    client_ref: Uuid,
}

#[derive(Serialize)]
struct FilePayload<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    mime_type: &'a str,
    size: u64,
    data: &'a str,
}

impl<'a> SubmitRequest<'a> {
    fn from_draft(draft: &'a ApplicationDraft, context: &'a HostContext) -> Self {
        Self {
            category_id: draft.category_id,
            category_name: &draft.category_name,
            subcategory: &draft.subcategory,
            description: &draft.description,
            name: &draft.name,
            phone: &draft.phone,
            email: &draft.email,
            contact_method: draft.contact_method,
            contact_time: draft.contact_time,
            files: draft
                .files
                .iter()
                .map(|f| FilePayload {
                    name: &f.name,
                    mime_type: &f.mime_type,
                    size: f.size_bytes,
                    data: &f.encoded_data,
                })
                .collect(),
            telegram_user_id: draft.external_user_id.or(context.user_id),
            start_param: context.start_param.as_deref(),
            client_ref: draft.client_ref,
        }
    }
}

#[derive(Deserialize)]
struct SubmitResponse {
    status: String,
    #[serde(default)]
    application_id: Option<i64>,
    #[serde(default)]
    payment_url: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct NotifyRequest<'a> {
    application_id: i64,
    name: &'a str,
    phone: &'a str,
    category_name: &'a str,
}

/// Map a non-2xx HTTP status onto the submission error taxonomy.
fn classify_status(status: StatusCode, body: String) -> DomainError {
    match status.as_u16() {
        401 | 403 => DomainError::Unauthorized(body),
        400..=499 => DomainError::BadRequest(body),
        500..=599 => DomainError::ServerFailure(body),
        code => DomainError::Transport(format!("unexpected status {}: {}", code, body)),
    }
}

#[async_trait::async_trait]
impl SubmitGateway for HttpSubmitGateway {
    async fn submit(
        &self,
        draft: &ApplicationDraft,
        context: &HostContext,
    ) -> Result<SubmissionReceipt, DomainError> {
        let request = SubmitRequest::from_draft(draft, context);
        info!(
            category_id = draft.category_id,
            files = draft.files.len(),
            client_ref = %draft.client_ref,
            "submitting application"
        );

        let response = self
            .client
            .post(&self.submit_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::Transport("request timed out".to_string())
                } else {
                    DomainError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "unknown".to_string());
            warn!(status = %status, body = %text, "submit endpoint returned error");
            return Err(classify_status(
                status,
                text.chars().take(200).collect::<String>(),
            ));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Transport(format!("invalid server response: {}", e)))?;

        if body.status != "ok" {
            let detail = body.message.unwrap_or(body.status);
            warn!(detail = %detail, "server declined the application");
            return Err(DomainError::Rejected(detail));
        }

        info!(application_id = body.application_id, "application accepted by server");
        Ok(SubmissionReceipt {
            application_id: body.application_id,
            payment_url: body.payment_url,
        })
    }

    async fn notify_staff(
        &self,
        application_id: i64,
        draft: &ApplicationDraft,
    ) -> Result<(), DomainError> {
        let Some(notify_url) = self.notify_url.as_deref() else {
            debug!("notify endpoint not configured, skipping");
            return Ok(());
        };

        let body = NotifyRequest {
            application_id,
            name: &draft.name,
            phone: &draft.phone,
            category_name: &draft.category_name,
        };

        let response = self
            .client
            .post(notify_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Notify(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(DomainError::Notify(format!(
                "notify endpoint error {}: {}",
                status, text
            )));
        }

        debug!(application_id, "staff notified");
        Ok(())
    }
}
