//! Outbound alert delivery.
//!
//! A [`Notifier`] gets exactly one attempt per alert. Failures come back as
//! [`NotificationError`] for the caller to log; nothing is retried or queued.

mod telegram;

pub use telegram::{DEFAULT_NOTIFY_TIMEOUT, DEFAULT_TELEGRAM_API, TelegramNotifier};

use crate::NotificationError;

/// Sends a text message to a fixed destination.
pub trait Notifier {
    /// Deliver `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handed to the transport.
    fn notify(&self, message: &str) -> impl Future<Output = Result<(), NotificationError>> + Send;
}

/// Writes alerts to the log instead of sending them anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        info!(message = message, "Alert (dry run)");
        Ok(())
    }
}
