//! Implements InputPort. Inquire-based interactive wizard.
//!
//! Drives the four intake steps against the WizardService, surfacing blocked
//! navigation as transient warnings and submission errors as retryable
//! messages on the review step. Esc steps back (exits from step 1), Ctrl-C
//! saves and exits.

use crate::adapters::ui::{self, review};
use crate::domain::{
    ContactMethod, ContactTime, DomainError, ServiceCategory, Step, SubmissionReceipt,
    MAX_ATTACHMENTS,
};
use crate::domain::validation::{check_description, check_email, check_name, check_phone};
use crate::ports::{HapticFeedback, HostPort, InputPort, SnapshotPort, SubmitGateway};
use crate::usecases::{AdvanceOutcome, AttachmentIntake, AutosaveHandle, WizardService};
use async_trait::async_trait;
use indicatif::ProgressBar;
use inquire::validator::Validation;
use inquire::{InquireError, Select, Text};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// What the wizard loop should do after a step ran.
enum StepFlow {
    Continue,
    Back,
    Exit,
}

/// A prompt either yields a value or a navigation intent.
enum PromptOutcome<T> {
    Value(T),
    Cancelled,
    Interrupted,
}

fn handle<T>(result: Result<T, InquireError>) -> Result<PromptOutcome<T>, DomainError> {
    match result {
        Ok(value) => Ok(PromptOutcome::Value(value)),
        Err(InquireError::OperationCanceled) => Ok(PromptOutcome::Cancelled),
        Err(InquireError::OperationInterrupted) => Ok(PromptOutcome::Interrupted),
        Err(e) => Err(DomainError::Host(e.to_string())),
    }
}

/// TUI adapter. Inquire prompts over the wizard service.
pub struct TuiInputPort {
    snapshot: Arc<dyn SnapshotPort>,
    gateway: Arc<dyn SubmitGateway>,
    host: Arc<dyn HostPort>,
    autosave: AutosaveHandle,
    intake: AttachmentIntake,
    catalog: Vec<ServiceCategory>,
}

impl TuiInputPort {
    pub fn new(
        snapshot: Arc<dyn SnapshotPort>,
        gateway: Arc<dyn SubmitGateway>,
        host: Arc<dyn HostPort>,
        autosave: AutosaveHandle,
    ) -> Self {
        Self {
            snapshot,
            gateway,
            host,
            autosave,
            intake: AttachmentIntake::new(),
            catalog: ServiceCategory::catalog(),
        }
    }

    /// Try to leave the current step; a blocked attempt stays put and shows
    /// the first unmet rule.
    async fn try_advance(&self, service: &mut WizardService) -> Result<StepFlow, DomainError> {
        match service.advance().await {
            Ok(AdvanceOutcome::Moved(_)) | Ok(AdvanceOutcome::Submitted(_)) => {
                Ok(StepFlow::Continue)
            }
            Ok(AdvanceOutcome::Blocked(message)) => {
                self.host.haptic(HapticFeedback::Warning);
                ui::notify_warning(&message);
                Ok(StepFlow::Continue)
            }
            Err(e) => Err(e),
        }
    }

    async fn step_category(&self, service: &mut WizardService) -> Result<StepFlow, DomainError> {
        let options: Vec<String> = self.catalog.iter().map(|c| c.name.clone()).collect();
        let mut select = Select::new("What do you need help with?", options)
            .with_help_message("↑↓ to move, Enter to select, Esc to exit");
        if let Some(current) = self
            .catalog
            .iter()
            .position(|c| Some(c.id) == service.draft().category_id)
        {
            select = select.with_starting_cursor(current);
        }

        match handle(select.raw_prompt())? {
            PromptOutcome::Value(choice) => {
                service.select_category(&self.catalog[choice.index]);
                self.try_advance(service).await
            }
            PromptOutcome::Cancelled | PromptOutcome::Interrupted => Ok(StepFlow::Exit),
        }
    }

    async fn step_details(&self, service: &mut WizardService) -> Result<StepFlow, DomainError> {
        let subcategory = match handle(
            Text::new("Clarify the area (optional):")
                .with_initial_value(&service.draft().subcategory)
                .with_help_message("Enter to skip")
                .prompt(),
        )? {
            PromptOutcome::Value(value) => value,
            PromptOutcome::Cancelled => return Ok(StepFlow::Back),
            PromptOutcome::Interrupted => return Ok(StepFlow::Exit),
        };
        service.set_subcategory(&subcategory);

        let description = match handle(
            Text::new("Describe your problem:")
                .with_initial_value(&service.draft().description)
                .with_help_message("10-2000 characters; Enter on an empty line to fill in later")
                .with_validator(|input: &str| {
                    // Step 2 never gates; an empty value is "fill in later"
                    // and the review step will insist on it.
                    if input.trim().is_empty() {
                        return Ok(Validation::Valid);
                    }
                    let check = check_description(input);
                    match check.message {
                        Some(message) if !check.valid => Ok(Validation::Invalid(message.into())),
                        _ => Ok(Validation::Valid),
                    }
                })
                .prompt(),
        )? {
            PromptOutcome::Value(value) => value,
            PromptOutcome::Cancelled => return Ok(StepFlow::Back),
            PromptOutcome::Interrupted => return Ok(StepFlow::Exit),
        };
        service.set_description(&description);

        if let Some(flow) = self.attachments_menu(service).await? {
            return Ok(flow);
        }

        self.try_advance(service).await
    }

    /// Attachment submenu. Returns Some(flow) when the user navigated away.
    async fn attachments_menu(
        &self,
        service: &mut WizardService,
    ) -> Result<Option<StepFlow>, DomainError> {
        loop {
            let staged = service.draft().files.len();
            let mut options = vec![format!(
                "Attach a document ({}/{})",
                staged, MAX_ATTACHMENTS
            )];
            if staged > 0 {
                options.push("Remove an attachment".to_string());
            }
            options.push("Continue".to_string());

            let choice = match handle(
                Select::new("Supporting documents:", options)
                    .with_help_message("pdf, doc, docx, jpg, jpeg, png; up to 10 MiB each")
                    .raw_prompt(),
            )? {
                PromptOutcome::Value(choice) => choice,
                PromptOutcome::Cancelled => return Ok(None),
                PromptOutcome::Interrupted => return Ok(Some(StepFlow::Exit)),
            };

            match (choice.index, staged > 0) {
                (0, _) => self.attach_one(service).await?,
                (1, true) => self.remove_one(service)?,
                _ => return Ok(None),
            }
        }
    }

    async fn attach_one(&self, service: &mut WizardService) -> Result<(), DomainError> {
        let path = match handle(
            Text::new("Path to the document:")
                .with_help_message("full path to the file on disk")
                .prompt(),
        )? {
            PromptOutcome::Value(value) => value,
            PromptOutcome::Cancelled | PromptOutcome::Interrupted => return Ok(()),
        };
        let path = path.trim();
        if path.is_empty() {
            return Ok(());
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_message("Reading the document...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        let report = self
            .intake
            .stage(&[PathBuf::from(path)], service.draft().files.len())
            .await;
        spinner.finish_and_clear();

        for rejection in &report.rejected {
            self.host.haptic(HapticFeedback::Warning);
            ui::notify_warning(&format!("{}: {}", rejection.name, rejection.reason));
        }
        for accepted in &report.accepted {
            ui::notify_success(&format!(
                "{} attached ({})",
                accepted.name,
                review::human_size(accepted.size_bytes)
            ));
        }
        service.add_attachments(report.accepted);
        Ok(())
    }

    fn remove_one(&self, service: &mut WizardService) -> Result<(), DomainError> {
        let names: Vec<String> = service
            .draft()
            .files
            .iter()
            .map(|f| format!("{} ({})", f.name, review::human_size(f.size_bytes)))
            .collect();
        match handle(Select::new("Remove which document?", names).raw_prompt())? {
            PromptOutcome::Value(choice) => {
                if let Some(removed) = service.remove_attachment(choice.index) {
                    ui::notify_info(&format!("{} removed", removed.name));
                }
            }
            PromptOutcome::Cancelled | PromptOutcome::Interrupted => {}
        }
        Ok(())
    }

    async fn step_contact(&self, service: &mut WizardService) -> Result<StepFlow, DomainError> {
        let name = match handle(
            Text::new("Your name:")
                .with_initial_value(&service.draft().name)
                .with_validator(|input: &str| {
                    let check = check_name(input);
                    match check.message {
                        Some(message) if !check.valid => Ok(Validation::Invalid(message.into())),
                        _ => Ok(Validation::Valid),
                    }
                })
                .prompt(),
        )? {
            PromptOutcome::Value(value) => value,
            PromptOutcome::Cancelled => return Ok(StepFlow::Back),
            PromptOutcome::Interrupted => return Ok(StepFlow::Exit),
        };
        service.set_name(&name);

        let phone = match handle(
            Text::new("Phone number:")
                .with_initial_value(&service.draft().phone)
                .with_help_message("e.g. +7 999 123-45-67")
                .with_validator(|input: &str| {
                    let check = check_phone(input);
                    match check.message {
                        Some(message) if !check.valid => Ok(Validation::Invalid(message.into())),
                        _ => Ok(Validation::Valid),
                    }
                })
                .prompt(),
        )? {
            PromptOutcome::Value(value) => value,
            PromptOutcome::Cancelled => return Ok(StepFlow::Back),
            PromptOutcome::Interrupted => return Ok(StepFlow::Exit),
        };
        service.set_phone(&phone);

        let email = match handle(
            Text::new("Email (optional):")
                .with_initial_value(&service.draft().email)
                .with_help_message("Enter to skip")
                .with_validator(|input: &str| {
                    let check = check_email(input);
                    match check.message {
                        Some(message) if !check.valid => Ok(Validation::Invalid(message.into())),
                        _ => Ok(Validation::Valid),
                    }
                })
                .prompt(),
        )? {
            PromptOutcome::Value(value) => value,
            PromptOutcome::Cancelled => return Ok(StepFlow::Back),
            PromptOutcome::Interrupted => return Ok(StepFlow::Exit),
        };
        service.set_email(&email);

        let methods: Vec<String> = ContactMethod::ALL.iter().map(|m| m.to_string()).collect();
        let mut method_select = Select::new("How should we contact you?", methods);
        if let Some(current) = service.draft().contact_method {
            let idx = ContactMethod::ALL.iter().position(|m| *m == current);
            if let Some(idx) = idx {
                method_select = method_select.with_starting_cursor(idx);
            }
        }
        match handle(method_select.raw_prompt())? {
            PromptOutcome::Value(choice) => {
                service.set_contact_method(ContactMethod::ALL[choice.index]);
            }
            PromptOutcome::Cancelled => return Ok(StepFlow::Back),
            PromptOutcome::Interrupted => return Ok(StepFlow::Exit),
        }

        let times: Vec<String> = ContactTime::ALL.iter().map(|t| t.to_string()).collect();
        let time_idx = ContactTime::ALL
            .iter()
            .position(|t| *t == service.draft().contact_time)
            .unwrap_or(0);
        match handle(
            Select::new("Best time to call?", times)
                .with_starting_cursor(time_idx)
                .raw_prompt(),
        )? {
            PromptOutcome::Value(choice) => {
                service.set_contact_time(ContactTime::ALL[choice.index]);
            }
            PromptOutcome::Cancelled => return Ok(StepFlow::Back),
            PromptOutcome::Interrupted => return Ok(StepFlow::Exit),
        }

        self.try_advance(service).await
    }

    async fn step_review(&self, service: &mut WizardService) -> Result<StepFlow, DomainError> {
        println!("{}", review::render_review(service.draft()));

        let options = vec![
            "Submit the application".to_string(),
            "Go back and edit".to_string(),
            "Save and exit".to_string(),
        ];
        let choice = match handle(Select::new("Everything correct?", options).raw_prompt())? {
            PromptOutcome::Value(choice) => choice,
            PromptOutcome::Cancelled => return Ok(StepFlow::Back),
            PromptOutcome::Interrupted => return Ok(StepFlow::Exit),
        };

        match choice.index {
            0 => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_message("Sending your application...");
                spinner.enable_steady_tick(Duration::from_millis(80));
                let outcome = service.advance().await;
                spinner.finish_and_clear();

                match outcome {
                    Ok(AdvanceOutcome::Submitted(_)) => Ok(StepFlow::Continue),
                    Ok(AdvanceOutcome::Blocked(message)) => {
                        self.host.haptic(HapticFeedback::Warning);
                        ui::notify_warning(&message);
                        Ok(StepFlow::Continue)
                    }
                    Ok(AdvanceOutcome::Moved(_)) => Ok(StepFlow::Continue),
                    Err(e) => {
                        // Submission failures keep the draft on review so the
                        // user can retry; nothing is lost.
                        self.host.haptic(HapticFeedback::Error);
                        ui::notify_warning(&e.user_message());
                        Ok(StepFlow::Continue)
                    }
                }
            }
            1 => Ok(StepFlow::Back),
            _ => Ok(StepFlow::Exit),
        }
    }

    fn show_success(&self, receipt: Option<&SubmissionReceipt>) {
        self.host.haptic(HapticFeedback::Success);
        println!();
        ui::notify_success("Your application has been submitted!");
        if let Some(receipt) = receipt {
            if let Some(id) = receipt.application_id {
                ui::notify_info(&format!("Application number: {}", id));
            }
            if let Some(url) = &receipt.payment_url {
                ui::notify_info(&format!("You can pay for the consultation here: {}", url));
            }
        }
        println!("A lawyer will review your case and contact you shortly.");
        self.host.set_main_action(None);
        self.host.close();
    }

    fn print_step_header(step: Step) {
        println!();
        ui::notify_info(&format!("Step {}/4 — {}", step.number(), step.title()));
    }
}

#[async_trait(?Send)]
impl InputPort for TuiInputPort {
    async fn run_wizard(&self) -> Result<(), DomainError> {
        let (mut service, restored) = WizardService::restore_or_new(
            Arc::clone(&self.snapshot),
            Arc::clone(&self.gateway),
            self.autosave.clone(),
            self.host.context(),
        )
        .await;
        if restored {
            ui::notify_info("Restored your saved progress, continuing where you left off.");
        }
        self.host.set_main_action(Some("Continue"));

        loop {
            if service.is_finished() {
                self.show_success(service.receipt());
                return Ok(());
            }

            let step = service.current_step();
            Self::print_step_header(step);
            let flow = match step {
                Step::Category => self.step_category(&mut service).await?,
                Step::Details => self.step_details(&mut service).await?,
                Step::Contact => self.step_contact(&mut service).await?,
                Step::Review => self.step_review(&mut service).await?,
            };

            match flow {
                StepFlow::Continue => {}
                StepFlow::Back => {
                    service.retreat();
                }
                StepFlow::Exit => {
                    service.flush().await;
                    if !service.is_finished() {
                        ui::notify_info("Progress saved. Come back any time within 24 hours.");
                    }
                    return Ok(());
                }
            }
        }
    }
}
