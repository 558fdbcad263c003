//! No-op host: used when the app runs outside any hosting chat client.

use crate::domain::HostContext;
use crate::ports::{HapticFeedback, HostPort};

pub struct NoopHost;

impl HostPort for NoopHost {
    fn context(&self) -> HostContext {
        HostContext::default()
    }

    fn haptic(&self, _feedback: HapticFeedback) {}

    fn set_main_action(&self, _label: Option<&str>) {}

    fn close(&self) {}
}
