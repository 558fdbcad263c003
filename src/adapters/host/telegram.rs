//! Telegram host adapter: launch context passed through the environment by
//! the hosting chat client (user identity, start/referral parameter), with
//! the affordances mapped onto terminal equivalents.

use crate::domain::HostContext;
use crate::ports::{HapticFeedback, HostPort};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::ExecutableCommand;
use std::io::{stdout, Write};
use tracing::debug;

pub struct TelegramHost {
    context: HostContext,
}

impl TelegramHost {
    pub fn new(user_id: Option<i64>, start_param: Option<String>) -> Self {
        Self {
            context: HostContext {
                user_id,
                start_param,
            },
        }
    }
}

impl HostPort for TelegramHost {
    fn context(&self) -> HostContext {
        self.context.clone()
    }

    /// Terminal bell stands in for the chat client's haptic engine. Success
    /// stays silent.
    fn haptic(&self, feedback: HapticFeedback) {
        if matches!(feedback, HapticFeedback::Warning | HapticFeedback::Error) {
            let mut out = stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
    }

    fn set_main_action(&self, label: Option<&str>) {
        if let Some(label) = label {
            let mut out = stdout();
            let _ = out.execute(SetForegroundColor(Color::DarkGrey));
            let _ = out.execute(Print(format!("[{}]\r\n", label)));
            let _ = out.execute(ResetColor);
        }
    }

    fn close(&self) {
        // The terminal session ends with the process; nothing to tear down.
        debug!("host close requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_carries_launch_identity() {
        let host = TelegramHost::new(Some(777), Some("utm_ads".into()));
        let ctx = host.context();
        assert_eq!(ctx.user_id, Some(777));
        assert_eq!(ctx.start_param.as_deref(), Some("utm_ads"));
    }

    #[test]
    fn noop_host_reports_empty_context() {
        let ctx = super::super::NoopHost.context();
        assert_eq!(ctx.user_id, None);
        assert_eq!(ctx.start_param, None);
    }
}
