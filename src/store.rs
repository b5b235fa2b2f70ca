//! This module provides a local file-backed store for tasks and events
//!
//! It is mostly useful as a stand-in for the application's document store: the dispatcher and
//! the calendar helpers only ever go through the [`TaskSource`] trait and the item getters, so
//! a production deployment can swap in a real database client instead.

use std::path::PathBuf;
use std::path::Path;
use std::error::Error;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::traits::TaskSource;
use crate::item::{Item, ItemId};
use crate::task::Task;
use crate::event::Event;
use crate::mock_behaviour::MockBehaviour;


/// A task source that stores its items in a local file
#[derive(Debug)]
pub struct LocalStore {
    backing_file: PathBuf,
    data: StoredData,

    /// Tweaks that describe whether this instance should fail in some tests
    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

#[derive(Default, Debug, Serialize, Deserialize)]
struct StoredData {
    tasks: HashMap<ItemId, Task>,
    events: HashMap<ItemId, Event>,
}

impl LocalStore {
    /// Get the path to the default store file
    pub fn store_file() -> PathBuf {
        return PathBuf::from(String::from("~/.config/tada/items.json"))
    }

    /// Initialize a store from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let data = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };

        Ok(Self{
            backing_file: PathBuf::from(path),
            data,
            mock_behaviour: None,
        })
    }

    /// Initialize an empty store
    pub fn new(path: &Path) -> Self {
        Self{
            backing_file: PathBuf::from(path),
            data: StoredData::default(),
            mock_behaviour: None,
        }
    }

    /// Make this instance able to fail on some requests (useful in tests)
    pub fn set_mock_behaviour(&mut self, behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = behaviour;
    }

    /// Store the current data to its backing file
    fn save_to_file(&mut self) {
        // Save the contents to the file
        let path = &self.backing_file;
        let file = match std::fs::File::create(path) {
            Err(err) => {
                log::warn!("Unable to save file {:?}: {}", path, err);
                return;
            },
            Ok(f) => f,
        };

        if let Err(err) = serde_json::to_writer(file, &self.data) {
            log::warn!("Unable to serialize: {}", err);
            return;
        };
    }


    pub fn add_task(&mut self, task: Task) {
        self.data.tasks.insert(task.id().clone(), task);
        self.save_to_file();
    }

    pub fn add_event(&mut self, event: Event) {
        self.data.events.insert(event.id().clone(), event);
        self.save_to_file();
    }

    pub fn get_task(&self, id: &ItemId) -> Option<&Task> {
        self.data.tasks.get(id)
    }

    pub fn get_task_mut(&mut self, id: &ItemId) -> Option<&mut Task> {
        self.data.tasks.get_mut(id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.data.tasks.values()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.data.events.values()
    }

    /// Every task and event that shows up on the given calendar day
    pub fn items_on_day(&self, day: NaiveDate) -> Vec<Item> {
        let tasks = self.data.tasks.values().cloned().map(Item::Task);
        let events = self.data.events.values().cloned().map(Item::Event);
        tasks.chain(events)
            .filter(|item| item.occurs_on(day))
            .collect()
    }
}

#[async_trait]
impl TaskSource for LocalStore {
    async fn pending_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Task>, Box<dyn Error>> {
        if let Some(behaviour) = &self.mock_behaviour {
            behaviour.lock().unwrap().can_pending_reminders()?;
        }

        Ok(self.data.tasks.values()
            .filter(|task| task.is_reminder() && task.completed() == false)
            .filter(|task| match task.reminder_deadline() {
                Some(deadline) => deadline >= &now,
                None => false,
            })
            .cloned()
            .collect())
    }

    async fn mark_reminder_sent(&mut self, id: &ItemId, threshold: u32) -> Result<(), Box<dyn Error>> {
        if let Some(behaviour) = &self.mock_behaviour {
            behaviour.lock().unwrap().can_mark_reminder_sent()?;
        }

        // Scoped update: only the sent-thresholds list is touched, other fields keep whatever
        // value they have by now
        match self.data.tasks.get_mut(id) {
            None => return Err(format!("No task {} in this store", id).into()),
            Some(task) => task.mark_reminder_sent(threshold),
        }
        self.save_to_file();
        Ok(())
    }
}
