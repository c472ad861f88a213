// In crates/notifier/src/lib.rs

use async_trait::async_trait;

pub mod error;
pub mod log_notifier;
pub mod telegram;

// Re-export public types
pub use error::{Error, Result};
pub use log_notifier::LogNotifier;
pub use telegram::TelegramNotifier;

/// The universal interface for an outbound message channel.
///
/// Callers treat delivery as best effort: a failed `send` is logged, never fatal.
#[async_trait]
pub trait Notifier {
    /// The name of the channel (e.g., "Telegram").
    fn name(&self) -> &'static str;

    async fn send(&self, message: &str) -> Result<()>;
}
