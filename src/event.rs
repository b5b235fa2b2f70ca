//! Calendar events

use serde::{Deserialize, Serialize};
use chrono::{Utc, DateTime};

use crate::item::ItemId;
use crate::schedule::Schedule;

/// A calendar event.
///
/// Unlike tasks, events always have a schedule: an event without a date makes no sense
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    id: ItemId,
    name: String,
    description: String,
    schedule: Schedule,
    creation_date: Option<DateTime<Utc>>,
    last_modified: DateTime<Utc>,
}

impl Event {
    /// Create a brand new Event that is not stored yet.
    /// This will pick a new (random) event ID.
    pub fn new(name: String, description: String, schedule: Schedule) -> Self {
        Self {
            id: ItemId::random(),
            name,
            description,
            schedule,
            creation_date: Some(Utc::now()),
            last_modified: Utc::now(),
        }
    }

    pub fn id(&self) -> &ItemId         { &self.id          }
    pub fn name(&self) -> &str          { &self.name        }
    pub fn description(&self) -> &str   { &self.description }
    pub fn schedule(&self) -> &Schedule { &self.schedule    }
    pub fn last_modified(&self) -> &DateTime<Utc>           { &self.last_modified }
    pub fn creation_date(&self) -> Option<&DateTime<Utc>>   { self.creation_date.as_ref() }

    pub fn set_name(&mut self, new_name: String) {
        self.last_modified = Utc::now();
        self.name = new_name;
    }

    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.last_modified = Utc::now();
        self.schedule = schedule;
    }
}
