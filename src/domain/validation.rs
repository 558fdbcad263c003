//! Field validation rules. Pure functions; errors are data, never thrown.

use crate::domain::entities::{ApplicationDraft, ContactMethod, Step};

/// Trimmed description length bounds.
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 2000;

/// Minimum digit count for a phone number after stripping formatting.
pub const PHONE_MIN_DIGITS: usize = 11;

/// Outcome of validating a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub valid: bool,
    pub message: Option<String>,
}

impl FieldCheck {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

pub fn check_category(category_id: Option<i32>) -> FieldCheck {
    match category_id {
        Some(_) => FieldCheck::ok(),
        None => FieldCheck::fail("Please choose a service category."),
    }
}

pub fn check_description(description: &str) -> FieldCheck {
    let len = description.trim().chars().count();
    if len < DESCRIPTION_MIN {
        FieldCheck::fail(format!(
            "Please describe the problem in at least {} characters.",
            DESCRIPTION_MIN
        ))
    } else if len > DESCRIPTION_MAX {
        FieldCheck::fail(format!(
            "The description is too long; please keep it under {} characters.",
            DESCRIPTION_MAX
        ))
    } else {
        FieldCheck::ok()
    }
}

pub fn check_name(name: &str) -> FieldCheck {
    if name.trim().chars().count() < 2 {
        FieldCheck::fail("Please enter your name (at least 2 characters).")
    } else {
        FieldCheck::ok()
    }
}

/// Digits are counted after stripping all formatting; a leading `+` is
/// permitted but does not count as a digit.
pub fn check_phone(phone: &str) -> FieldCheck {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits >= PHONE_MIN_DIGITS {
        FieldCheck::ok()
    } else {
        FieldCheck::fail(format!(
            "Please enter a full phone number ({} digits or more), e.g. +7 999 123-45-67.",
            PHONE_MIN_DIGITS
        ))
    }
}

/// Email is optional: empty passes. When present it must have the
/// conventional `local@domain.tld` shape.
pub fn check_email(email: &str) -> FieldCheck {
    let value = email.trim();
    if value.is_empty() {
        return FieldCheck::ok();
    }
    if email_shape_ok(value) {
        FieldCheck::ok()
    } else {
        FieldCheck::fail("Please enter a valid email address or leave it empty.")
    }
}

fn email_shape_ok(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.len() >= 3
        }
        _ => false,
    }
}

pub fn check_contact_method(method: Option<ContactMethod>) -> FieldCheck {
    match method {
        Some(_) => FieldCheck::ok(),
        None => FieldCheck::fail("Please choose how we should contact you."),
    }
}

/// First unmet rule for the given step, or `None` when the step may be left.
///
/// Step 1 requires a category; step 2 collects but never gates; step 3 the
/// contact block; the review step re-checks everything before submission, so
/// a description skipped on step 2 still blocks the submit.
pub fn first_violation(step: Step, draft: &ApplicationDraft) -> Option<String> {
    let checks: Vec<FieldCheck> = match step {
        Step::Category => vec![check_category(draft.category_id)],
        Step::Details => vec![],
        Step::Contact => vec![
            check_name(&draft.name),
            check_phone(&draft.phone),
            check_contact_method(draft.contact_method),
            check_email(&draft.email),
        ],
        Step::Review => vec![
            check_category(draft.category_id),
            check_description(&draft.description),
            check_name(&draft.name),
            check_phone(&draft.phone),
            check_contact_method(draft.contact_method),
            check_email(&draft.email),
        ],
    };
    checks.into_iter().find(|c| !c.valid).and_then(|c| c.message)
}
