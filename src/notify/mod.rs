// =============================================================================
// Notification Module
// =============================================================================

pub mod telegram;

pub use telegram::TelegramNotifier;

use std::future::Future;

use crate::error::SignalError;

pub trait Notifier: Send + Sync {
    /// Deliver one message. Failures come back as `NotifyFailure`; the caller
    /// decides whether to log and move on.
    fn notify(&self, message: &str) -> impl Future<Output = Result<(), SignalError>> + Send;
}
