//! Terminal presentation layer: banner, prompt theme, notifications, the
//! review renderer and the interactive wizard itself.

pub mod banner;
pub mod review;
pub mod wizard_tui;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::ExecutableCommand;
use inquire::ui::{Color as PromptColor, RenderConfig, StyleSheet, Styled};
use std::io::stdout;

/// Prints the welcome banner and applies the prompt theme for all subsequent
/// inquire prompts. Call once at startup (e.g. in main after tracing init).
pub fn init_ui() {
    banner::print_welcome();
    apply_theme();
}

fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("»").with_fg(PromptColor::LightBlue))
        .with_answer(StyleSheet::new().with_fg(PromptColor::LightCyan))
        .with_help_message(StyleSheet::new().with_fg(PromptColor::DarkGrey));
    inquire::set_global_render_config(config);
}

fn notify(color: Color, prefix: &str, message: &str) {
    let mut out = stdout();
    let _ = out.execute(SetForegroundColor(color));
    let _ = out.execute(Print(format!("{} {}\r\n", prefix, message)));
    let _ = out.execute(ResetColor);
}

/// Transient warning line, used for blocked navigation and retryable errors.
pub fn notify_warning(message: &str) {
    notify(Color::Yellow, "⚠", message);
}

pub fn notify_success(message: &str) {
    notify(Color::Green, "✓", message);
}

pub fn notify_info(message: &str) {
    notify(Color::Cyan, "ℹ", message);
}
