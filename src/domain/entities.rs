//! Domain entities. Pure data structures for the intake wizard.
//!
//! No prompt/HTTP/storage types here — these are mapped from adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of attachments per draft.
pub const MAX_ATTACHMENTS: usize = 5;

/// Maximum size of a single attachment: 10 MiB. Exactly 10 MiB is accepted.
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// A service category the client can file an application under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCategory {
    pub id: i32,
    pub name: String,
}

impl ServiceCategory {
    /// Built-in catalog of legal-service categories offered by the firm.
    pub fn catalog() -> Vec<ServiceCategory> {
        let names = [
            (1, "Семейное право"),
            (2, "Трудовое право"),
            (3, "Недвижимость"),
            (4, "Наследство"),
            (5, "Автоюрист"),
            (6, "Защита прав потребителей"),
            (7, "Банкротство"),
            (8, "Другое"),
        ];
        names
            .into_iter()
            .map(|(id, name)| ServiceCategory {
                id,
                name: name.to_string(),
            })
            .collect()
    }
}

/// How the client prefers to be contacted back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    Telegram,
    Phone,
    Whatsapp,
    Email,
}

impl ContactMethod {
    pub const ALL: [ContactMethod; 4] = [
        ContactMethod::Telegram,
        ContactMethod::Phone,
        ContactMethod::Whatsapp,
        ContactMethod::Email,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContactMethod::Telegram => "Telegram",
            ContactMethod::Phone => "Phone call",
            ContactMethod::Whatsapp => "WhatsApp",
            ContactMethod::Email => "Email",
        }
    }
}

impl std::fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Preferred time window for the callback. Defaults to `Any`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactTime {
    #[default]
    Any,
    Morning,
    Afternoon,
    Evening,
}

impl ContactTime {
    pub const ALL: [ContactTime; 4] = [
        ContactTime::Any,
        ContactTime::Morning,
        ContactTime::Afternoon,
        ContactTime::Evening,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContactTime::Any => "Any time",
            ContactTime::Morning => "Morning (9:00-12:00)",
            ContactTime::Afternoon => "Afternoon (12:00-17:00)",
            ContactTime::Evening => "Evening (17:00-21:00)",
        }
    }
}

impl std::fmt::Display for ContactTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A staged attachment, already validated and base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttachment {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub encoded_data: String,
}

/// The single mutable record the wizard builds up across its steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub category_id: Option<i32>,
    pub category_name: String,
    pub subcategory: String,
    pub description: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub contact_method: Option<ContactMethod>,
    #[serde(default)]
    pub contact_time: ContactTime,
    #[serde(default)]
    pub files: Vec<FileAttachment>,
    /// Supplied by the hosting chat client; not user-editable.
    pub external_user_id: Option<i64>,
    /// Stable per-draft token sent with every submit so retried submits are
    /// de-duplicatable server-side.
    pub client_ref: Uuid,
}

impl ApplicationDraft {
    pub fn new() -> Self {
        Self {
            category_id: None,
            category_name: String::new(),
            subcategory: String::new(),
            description: String::new(),
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            contact_method: None,
            contact_time: ContactTime::default(),
            files: Vec::new(),
            external_user_id: None,
            client_ref: Uuid::new_v4(),
        }
    }
}

impl Default for ApplicationDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Wizard screens. Serialized as the step number so snapshots stay a plain
/// `{draft, current_step, last_persisted_at}` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Step {
    Category = 1,
    Details = 2,
    Contact = 3,
    Review = 4,
}

impl Step {
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Next screen, or `None` on the review step (advance submits instead).
    pub fn next(self) -> Option<Step> {
        match self {
            Step::Category => Some(Step::Details),
            Step::Details => Some(Step::Contact),
            Step::Contact => Some(Step::Review),
            Step::Review => None,
        }
    }

    /// Previous screen, or `None` on the first step.
    pub fn prev(self) -> Option<Step> {
        match self {
            Step::Category => None,
            Step::Details => Some(Step::Category),
            Step::Contact => Some(Step::Details),
            Step::Review => Some(Step::Contact),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Category => "Service category",
            Step::Details => "Problem description",
            Step::Contact => "Contact details",
            Step::Review => "Review & submit",
        }
    }
}

impl TryFrom<u8> for Step {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Step::Category),
            2 => Ok(Step::Details),
            3 => Ok(Step::Contact),
            4 => Ok(Step::Review),
            other => Err(format!("step out of range: {}", other)),
        }
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> u8 {
        step.number()
    }
}

/// Full wizard state: current screen plus the draft under construction.
/// Owned by a single wizard loop; never shared across tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardState {
    pub current_step: Step,
    pub draft: ApplicationDraft,
    pub last_persisted_at: Option<DateTime<Utc>>,
}

impl WizardState {
    pub fn fresh() -> Self {
        Self {
            current_step: Step::Category,
            draft: ApplicationDraft::new(),
            last_persisted_at: None,
        }
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Server acknowledgment of an accepted application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub application_id: Option<i64>,
    pub payment_url: Option<String>,
}

/// Launch context supplied by the hosting chat client, if any.
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    pub user_id: Option<i64>,
    pub start_param: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_roundtrips_through_number() {
        for step in [Step::Category, Step::Details, Step::Contact, Step::Review] {
            assert_eq!(Step::try_from(step.number()).unwrap(), step);
        }
        assert!(Step::try_from(0u8).is_err());
        assert!(Step::try_from(5u8).is_err());
    }

    #[test]
    fn step_ordering_is_linear() {
        assert_eq!(Step::Category.next(), Some(Step::Details));
        assert_eq!(Step::Review.next(), None);
        assert_eq!(Step::Category.prev(), None);
        assert_eq!(Step::Review.prev(), Some(Step::Contact));
    }

    #[test]
    fn catalog_contains_real_estate_at_id_3() {
        let catalog = ServiceCategory::catalog();
        let real_estate = catalog.iter().find(|c| c.id == 3).unwrap();
        assert_eq!(real_estate.name, "Недвижимость");
    }

    #[test]
    fn fresh_drafts_get_distinct_client_refs() {
        let a = ApplicationDraft::new();
        let b = ApplicationDraft::new();
        assert_ne!(a.client_ref, b.client_ref);
    }
}
