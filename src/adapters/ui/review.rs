//! Review renderer: projects the draft into the confirmation shown before
//! submission.

use crate::domain::ApplicationDraft;
use std::fmt::Write;

/// Human-readable size: bytes up to 1 KiB, then one decimal of KiB/MiB.
pub fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Render the confirmation block for the review step.
pub fn render_review(draft: &ApplicationDraft) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "────────────────────────────────────────");
    let _ = writeln!(out, " Please check your application");
    let _ = writeln!(out, "────────────────────────────────────────");
    let _ = writeln!(out, " Category:      {}", draft.category_name);
    if !draft.subcategory.is_empty() {
        let _ = writeln!(out, " Clarification: {}", draft.subcategory);
    }
    let _ = writeln!(out, " Description:   {}", draft.description);
    let _ = writeln!(out, " Name:          {}", draft.name);
    let _ = writeln!(out, " Phone:         {}", draft.phone);
    if !draft.email.is_empty() {
        let _ = writeln!(out, " Email:         {}", draft.email);
    }
    if let Some(method) = draft.contact_method {
        let _ = writeln!(out, " Contact via:   {}", method);
    }
    let _ = writeln!(out, " Call time:     {}", draft.contact_time);
    if draft.files.is_empty() {
        let _ = writeln!(out, " Documents:     none attached");
    } else {
        let _ = writeln!(out, " Documents:");
        for file in &draft.files {
            let _ = writeln!(out, "   • {} ({})", file.name, human_size(file.size_bytes));
        }
    }
    let _ = writeln!(out, "────────────────────────────────────────");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContactMethod, FileAttachment};

    #[test]
    fn human_sizes_pick_the_right_unit() {
        assert_eq!(human_size(17), "17 B");
        assert_eq!(human_size(1024), "1.0 KiB");
        assert_eq!(human_size(1536), "1.5 KiB");
        assert_eq!(human_size(10 * 1024 * 1024), "10.0 MiB");
    }

    #[test]
    fn review_shows_filled_fields_and_hides_empty_ones() {
        let mut draft = ApplicationDraft::new();
        draft.category_name = "Недвижимость".into();
        draft.description = "Спор о границах участка с соседом".into();
        draft.name = "Иван".into();
        draft.phone = "+79991234567".into();
        draft.contact_method = Some(ContactMethod::Telegram);
        draft.files.push(FileAttachment {
            name: "claim.pdf".into(),
            size_bytes: 2048,
            mime_type: "application/pdf".into(),
            encoded_data: String::new(),
        });

        let rendered = render_review(&draft);
        assert!(rendered.contains("Недвижимость"));
        assert!(rendered.contains("Иван"));
        assert!(rendered.contains("claim.pdf (2.0 KiB)"));
        assert!(rendered.contains("Telegram"));
        // Optional email left empty stays off the summary.
        assert!(!rendered.contains("Email:"));
    }
}
