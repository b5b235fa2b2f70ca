//! Schedulable items (tasks and calendar events)

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::schedule::Schedule;



#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Item {
    Event(crate::event::Event),
    Task(crate::task::Task),
}

/// Returns `task.$property_name` or `event.$property_name`, depending on whether self is a Task or an Event
macro_rules! synthetise_common_getter {
    ($property_name:ident, $return_type:ty) => {
        pub fn $property_name(&self) -> $return_type {
            match self {
                Item::Event(e) => e.$property_name(),
                Item::Task(t) => t.$property_name(),
            }
        }
    }
}

impl Item {
    synthetise_common_getter!(id, &ItemId);
    synthetise_common_getter!(name, &str);
    synthetise_common_getter!(description, &str);
    synthetise_common_getter!(creation_date, Option<&DateTime<Utc>>);
    synthetise_common_getter!(last_modified, &DateTime<Utc>);

    /// The recurrence rule of this item.
    ///
    /// Events always have one. Tasks only have one in case they were given a start date
    /// (a kanban-only task does not belong on the calendar)
    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            Item::Event(e) => Some(e.schedule()),
            Item::Task(t) => t.schedule(),
        }
    }

    /// Whether this item shows up on the given calendar day
    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        match self.schedule() {
            Some(schedule) => schedule.occurs_on(day),
            None => false,
        }
    }

}


/// The identifier of a stored task or event.
///
/// The persistence layer is a document store, so this is the document's object id rather than
/// a URL
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemId {
    content: Uuid,
}
impl ItemId {
    /// Generate a random ItemId
    pub fn random() -> Self {
        Self { content: Uuid::new_v4() }
    }
}
impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self { content: uuid }
    }
}
impl FromStr for ItemId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let u: Uuid = s.parse()?;
        Ok(Self::from(u))
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

/// Used to support serde (ItemIds are also used as map keys, so they must (de)serialize as plain strings)
impl Serialize for ItemId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.content.to_string())
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<ItemId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let u = Uuid::deserialize(deserializer)?;
        Ok(ItemId{ content: u })
    }
}
