//! To-do tasks (kanban cards, some of which carry a deadline reminder)

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::item::ItemId;
use crate::schedule::Schedule;

/// The store keeps completion as two separate optional fields (a flag and a timestamp), yet
/// some combinations make no sense: a completion date on an uncompleted task is obviously
/// bogus. This enum provides an API that forbids such impossible combinations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CompletionStatus {
    Completed(Option<DateTime<Utc>>),
    Uncompleted,
}
impl CompletionStatus {
    pub fn is_completed(&self) -> bool {
        match self {
            CompletionStatus::Completed(_) => true,
            _ => false,
        }
    }
}

/// A to-do task
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// The document id of this task
    id: ItemId,

    /// The display name of the task
    name: String,
    /// The task description, included in reminder notifications
    description: String,

    /// The e-mail address of the owning user. This is the fallback notification target when no
    /// chat webhook is configured. The reminder machinery only ever reads it, user records are
    /// managed elsewhere
    owner_email: String,

    /// When and how often this task happens. Tasks without a start date live on the kanban
    /// board only and never show up on the calendar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schedule: Option<Schedule>,

    /// The completion status of this task
    completion_status: CompletionStatus,

    /// Whether this task should trigger deadline notifications
    is_reminder: bool,
    /// The deadline notifications count down to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reminder_deadline: Option<DateTime<Utc>>,
    /// The lead-time thresholds (in minutes before the deadline) that have already been
    /// notified. Grows monotonically, one entry per threshold, so that no threshold is ever
    /// notified twice
    #[serde(default)]
    reminders_sent: Vec<u32>,

    /// The time this task was created
    creation_date: Option<DateTime<Utc>>,
    /// The last time this task was modified
    last_modified: DateTime<Utc>,
}


impl Task {
    /// Create a brand new Task that is not stored yet.
    /// This will pick a new (random) task ID.
    pub fn new(name: String, description: String, owner_email: String) -> Self {
        Self::new_with_parameters(
            ItemId::random(), name, description, owner_email,
            None, CompletionStatus::Uncompleted,
            Some(Utc::now()), Utc::now(),
        )
    }

    /// Create a new Task instance from stored data
    pub fn new_with_parameters(id: ItemId, name: String, description: String, owner_email: String,
                               schedule: Option<Schedule>, completion_status: CompletionStatus,
                               creation_date: Option<DateTime<Utc>>, last_modified: DateTime<Utc>,
                            ) -> Self
    {
        Self {
            id,
            name,
            description,
            owner_email,
            schedule,
            completion_status,
            is_reminder: false,
            reminder_deadline: None,
            reminders_sent: Vec::new(),
            creation_date,
            last_modified,
        }
    }

    pub fn id(&self) -> &ItemId         { &self.id          }
    pub fn name(&self) -> &str          { &self.name        }
    pub fn description(&self) -> &str   { &self.description }
    pub fn owner_email(&self) -> &str   { &self.owner_email }
    pub fn completed(&self) -> bool     { self.completion_status.is_completed() }
    pub fn is_reminder(&self) -> bool   { self.is_reminder  }
    pub fn schedule(&self) -> Option<&Schedule>             { self.schedule.as_ref() }
    pub fn completion_status(&self) -> &CompletionStatus    { &self.completion_status }
    pub fn reminder_deadline(&self) -> Option<&DateTime<Utc>>   { self.reminder_deadline.as_ref() }
    pub fn reminders_sent(&self) -> &[u32]                  { &self.reminders_sent }
    pub fn last_modified(&self) -> &DateTime<Utc>           { &self.last_modified }
    pub fn creation_date(&self) -> Option<&DateTime<Utc>>   { self.creation_date.as_ref() }

    fn update_last_modified(&mut self) {
        self.last_modified = Utc::now();
    }

    /// Rename a task.
    /// This updates its "last modified" field
    pub fn set_name(&mut self, new_name: String) {
        self.update_last_modified();
        self.name = new_name;
    }

    pub fn set_description(&mut self, new_description: String) {
        self.update_last_modified();
        self.description = new_description;
    }

    /// Set the completion status
    pub fn set_completion_status(&mut self, new_completion_status: CompletionStatus) {
        self.update_last_modified();
        self.completion_status = new_completion_status;
    }

    /// Give this task a start date and recurrence rule, so it shows up on the calendar
    pub fn set_schedule(&mut self, schedule: Option<Schedule>) {
        self.update_last_modified();
        self.schedule = schedule;
    }

    /// Turn this task into a reminder counting down to `deadline`.
    ///
    /// The sent-thresholds list starts over: a task that becomes a reminder (again) has not
    /// notified anything yet
    pub fn set_reminder(&mut self, deadline: DateTime<Utc>) {
        self.update_last_modified();
        self.is_reminder = true;
        self.reminder_deadline = Some(deadline);
        self.reminders_sent.clear();
    }

    /// Whether the given threshold (minutes before the deadline) has already been notified
    pub fn reminder_sent_for(&self, threshold: u32) -> bool {
        self.reminders_sent.contains(&threshold)
    }

    /// Record that the given threshold has been notified. Idempotent per threshold: recording
    /// the same threshold twice keeps a single entry
    pub fn mark_reminder_sent(&mut self, threshold: u32) {
        if self.reminder_sent_for(threshold) == false {
            self.reminders_sent.push(threshold);
            self.update_last_modified();
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn marking_a_threshold_sent_is_idempotent() {
        let mut task = Task::new("Do the dishes".to_string(), "They pile up".to_string(), "someone@example.org".to_string());
        task.set_reminder(Utc::now() + chrono::Duration::minutes(90));

        assert!(task.reminder_sent_for(60) == false);
        task.mark_reminder_sent(60);
        task.mark_reminder_sent(60);
        assert!(task.reminder_sent_for(60));
        assert_eq!(task.reminders_sent(), &[60]);
    }

    #[test]
    fn becoming_a_reminder_starts_with_no_sent_threshold() {
        let mut task = Task::new("Do the dishes".to_string(), "They pile up".to_string(), "someone@example.org".to_string());
        task.set_reminder(Utc::now() + chrono::Duration::minutes(90));
        task.mark_reminder_sent(60);

        task.set_reminder(Utc::now() + chrono::Duration::minutes(300));
        assert!(task.reminders_sent().is_empty());
    }
}
