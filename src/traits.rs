use std::error::Error;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::item::ItemId;
use crate::task::Task;

/// The persistence layer the reminder dispatcher reads tasks from.
///
/// The actual CRUD layer (REST handlers, document store) lives elsewhere; the dispatcher only
/// needs this narrow surface.
#[async_trait]
pub trait TaskSource {
    /// Returns every task that is eligible for a reminder check: flagged as a reminder, not
    /// completed, and with a deadline at or after `now`.
    /// Tasks whose deadline has already passed are never returned again
    async fn pending_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Task>, Box<dyn Error>>;

    /// Persist that `threshold` has been notified for the given task.
    ///
    /// This must be a scoped update of the sent-thresholds list only: concurrent writes to
    /// unrelated fields of the same task (e.g. a user completing it mid-tick) must not be
    /// clobbered
    async fn mark_reminder_sent(&mut self, id: &ItemId, threshold: u32) -> Result<(), Box<dyn Error>>;
}

/// A notification delivery channel pair.
///
/// One send attempt uses one channel: the dispatcher prefers chat whenever a webhook is
/// configured, and falls back to e-mailing the task owner otherwise
#[async_trait]
pub trait Notifier {
    /// Whether a chat webhook is configured at all
    fn chat_configured(&self) -> bool;

    /// Post a message to the configured chat webhook
    async fn send_chat(&self, text: &str) -> Result<(), Box<dyn Error>>;

    /// Send an e-mail, with an optional HTML alternative body
    async fn send_email(&self, to: &str, subject: &str, text: &str, html: Option<&str>) -> Result<(), Box<dyn Error>>;
}
