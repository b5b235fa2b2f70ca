//! This module watches reminder deadlines and sends notifications when they come close
//!
//! The [`ReminderDispatcher`] is meant to run detached from any request handling: a periodic
//! tick scans the task source for upcoming deadlines, and each lead-time threshold of each
//! task is notified at most once over the task's lifetime. The already-notified thresholds are
//! re-read from the source on every tick (never accumulated in memory across ticks), so
//! process restarts, slow overlapping ticks or multiple scheduler instances can only ever
//! duplicate a notification, never corrupt state.

use std::error::Error;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::task::Task;
use crate::traits::{Notifier, TaskSource};

/// How long before a deadline each notification fires, in minutes.
/// Order matters: this is also the order thresholds are evaluated in within a tick
pub const REMINDER_THRESHOLDS: [u32; 4] = [60, 30, 10, 5];

/// How much wall-clock time elapses between two ticks of [`ReminderDispatcher::run`]
pub const TICK_PERIOD: Duration = Duration::from_secs(60);

/// How long a single notification send may take before it is given up on.
/// A stuck channel must not block the other tasks of the same tick forever; a timed-out send
/// is treated as a failed send (i.e. it will be retried on the next tick)
const SEND_TIMEOUT: Duration = Duration::from_secs(30);


/// Scans a [`TaskSource`] for tasks whose reminder deadline comes close, and notifies their
/// owner through a [`Notifier`].
///
/// Notifications prefer the chat channel whenever one is configured, and fall back to
/// e-mailing the task owner otherwise.
pub struct ReminderDispatcher<S, N>
where
    S: TaskSource,
    N: Notifier,
{
    source: S,
    notifier: N,
}

impl<S, N> ReminderDispatcher<S, N>
where
    S: TaskSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: N) -> Self {
        Self { source, notifier }
    }

    /// Returns the task source this dispatcher scans
    pub fn source(&self) -> &S { &self.source }

    /// Runs ticks forever, one every [`TICK_PERIOD`], for the lifetime of the process.
    ///
    /// A tick is awaited to completion before the next one is scheduled. There is no
    /// cancellation primitive: drop the future to stop the dispatcher.
    pub async fn run(&mut self) {
        log::info!("Reminder dispatcher started");
        let mut interval = tokio::time::interval(TICK_PERIOD);
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// A single scan pass.
    ///
    /// This never returns an error: the dispatcher runs detached from any user-facing caller,
    /// so failures are only ever logged. A failed scan leaves all state untouched and the next
    /// tick retries from scratch.
    pub async fn tick(&mut self) {
        if let Err(err) = self.tick_inner().await {
            log::warn!("Error checking reminders: {}", err);
        }
    }

    async fn tick_inner(&mut self) -> Result<(), Box<dyn Error>> {
        let now = Utc::now();
        let tasks = self.source.pending_reminders(now).await?;
        log::debug!("Checking {} pending reminder(s)", tasks.len());

        for task in tasks {
            // Tasks are independent: a failure on one never prevents processing the others
            self.process_task(&task, now).await;
        }
        Ok(())
    }

    async fn process_task(&mut self, task: &Task, now: DateTime<Utc>) {
        let deadline = match task.reminder_deadline() {
            Some(deadline) => *deadline,
            None => return, // cannot happen with a well-behaved source, but not worth a crash
        };

        let minutes_remaining = deadline.signed_duration_since(now).num_minutes();

        // In case the process was delayed, several thresholds may have been crossed since the
        // last tick. Each crossed, not-yet-sent threshold fires exactly once in this tick
        for threshold in crossed_thresholds(minutes_remaining, task.reminders_sent()) {
            match self.send_reminder(task, threshold, &deadline).await {
                Err(err) => {
                    // Not marked as sent: this threshold will be retried on the next tick
                    log::warn!("Failed to send the {}-minute reminder for task \"{}\": {}", threshold, task.name(), err);
                },
                Ok(()) => {
                    log::info!("Reminder sent for task \"{}\" ({} min before deadline)", task.name(), threshold);
                    if let Err(err) = self.source.mark_reminder_sent(task.id(), threshold).await {
                        // The send went through but could not be recorded. At-least-once
                        // delivery: this threshold may fire again on the next tick
                        log::warn!("The {}-minute reminder for task \"{}\" was sent but could not be recorded: {}",
                                   threshold, task.name(), err);
                    }
                },
            }
        }
    }

    async fn send_reminder(&self, task: &Task, threshold: u32, deadline: &DateTime<Utc>) -> Result<(), Box<dyn Error>> {
        let text = format!("⏰ Reminder: \"{}\" is due in {} minutes!\n\nDescription: {}",
                           task.name(), threshold, task.description());

        let send = async {
            if self.notifier.chat_configured() {
                self.notifier.send_chat(&text).await
            } else {
                let subject = format!("Reminder: {} ({} min)", task.name(), threshold);
                let html = format!(
                    "<h2>⏰ Task Reminder</h2>\
                     <p><strong>{}</strong> is due in <strong>{} minutes</strong>!</p>\
                     <p><strong>Description:</strong> {}</p>\
                     <p><strong>Deadline:</strong> {}</p>",
                    task.name(), threshold, task.description(), deadline.format("%Y-%m-%d %H:%M"),
                );
                self.notifier.send_email(task.owner_email(), &subject, &text, Some(&html)).await
            }
        };

        match tokio::time::timeout(SEND_TIMEOUT, send).await {
            Err(_elapsed) => Err(format!("Notification send timed out after {:?}", SEND_TIMEOUT).into()),
            Ok(result) => result,
        }
    }
}


/// The thresholds that should fire for a task that has `minutes_remaining` left on the clock
/// and has already notified `already_sent`
fn crossed_thresholds(minutes_remaining: i64, already_sent: &[u32]) -> Vec<u32> {
    REMINDER_THRESHOLDS.iter()
        .filter(|threshold| minutes_remaining <= **threshold as i64)
        .filter(|threshold| already_sent.contains(*threshold) == false)
        .copied()
        .collect()
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn threshold_crossing() {
        // 45 minutes left: only the 60-minute threshold has been crossed
        assert_eq!(crossed_thresholds(45, &[]), vec![60]);
        // ...and it only fires once
        assert_eq!(crossed_thresholds(45, &[60]), vec![] as Vec<u32>);

        // A delayed process can cross several thresholds in one tick
        assert_eq!(crossed_thresholds(4, &[60, 30]), vec![10, 5]);
        assert_eq!(crossed_thresholds(0, &[]), vec![60, 30, 10, 5]);

        // Far-future deadlines fire nothing
        assert_eq!(crossed_thresholds(61, &[]), vec![] as Vec<u32>);
    }
}
