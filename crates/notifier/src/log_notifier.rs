// In crates/notifier/src/log_notifier.rs

use crate::{Notifier, Result};
use async_trait::async_trait;

/// Writes messages to the log instead of a chat. Used when no chat is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "Log"
    }

    async fn send(&self, message: &str) -> Result<()> {
        tracing::info!(channel = self.name(), %message, "Notification.");
        Ok(())
    }
}
