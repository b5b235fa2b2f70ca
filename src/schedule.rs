//! Recurrence rules for tasks and calendar events
//!
//! This module provides the [`Schedule`] attached to every schedulable item, and its
//! [`occurs_on`](Schedule::occurs_on) predicate that decides whether an item shows up on a given
//! calendar day.

use std::collections::HashMap;

use bitflags::bitflags;
use chrono::{DateTime, NaiveDate, Utc, Datelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How often a task or event repeats.
///
/// Stored documents and query parameters carry this as a plain lowercase string. Parsing is
/// case-insensitive (see [`Frequency::parse`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Happens on its anchor day only
    Once,
    /// Happens every day from the anchor day on
    Daily,
    /// Happens Monday to Friday
    Weekdays,
    /// Happens on Saturdays and Sundays
    Weekends,
    /// Happens on the days listed in the item's [`DaySet`]
    Custom,
}

impl Frequency {
    /// Parse a frequency from its string form, ignoring case.
    ///
    /// Returns `None` for unrecognized values. Callers are expected to treat `None` as
    /// "never occurs" rather than an error, so that a bogus value stored in the database can
    /// never crash a rendering or query path.
    pub fn parse<S: AsRef<str>>(value: S) -> Option<Self> {
        match value.as_ref().trim().to_lowercase().as_str() {
            "once" => Some(Frequency::Once),
            "daily" => Some(Frequency::Daily),
            "weekdays" => Some(Frequency::Weekdays),
            "weekends" => Some(Frequency::Weekends),
            "custom" => Some(Frequency::Custom),
            _ => None,
        }
    }
}

bitflags! {
    /// The set of weekdays a [`Frequency::Custom`] item happens on
    pub struct DaySet: u8 {
        const MONDAY    = 1 << 0;
        const TUESDAY   = 1 << 1;
        const WEDNESDAY = 1 << 2;
        const THURSDAY  = 1 << 3;
        const FRIDAY    = 1 << 4;
        const SATURDAY  = 1 << 5;
        const SUNDAY    = 1 << 6;
    }
}

/// Canonical (lowercase) names, in storage order
const DAY_NAMES: [(DaySet, &str); 7] = [
    (DaySet::MONDAY,    "monday"),
    (DaySet::TUESDAY,   "tuesday"),
    (DaySet::WEDNESDAY, "wednesday"),
    (DaySet::THURSDAY,  "thursday"),
    (DaySet::FRIDAY,    "friday"),
    (DaySet::SATURDAY,  "saturday"),
    (DaySet::SUNDAY,    "sunday"),
];

impl DaySet {
    /// The flag matching a [`chrono::Weekday`]
    pub fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DaySet::MONDAY,
            Weekday::Tue => DaySet::TUESDAY,
            Weekday::Wed => DaySet::WEDNESDAY,
            Weekday::Thu => DaySet::THURSDAY,
            Weekday::Fri => DaySet::FRIDAY,
            Weekday::Sat => DaySet::SATURDAY,
            Weekday::Sun => DaySet::SUNDAY,
        }
    }

    pub fn contains_weekday(&self, day: Weekday) -> bool {
        self.contains(Self::from_weekday(day))
    }

    /// Match a weekday name, ignoring case. Unknown names match nothing.
    fn from_name(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        for (flag, flag_name) in &DAY_NAMES {
            if &name == flag_name {
                return *flag;
            }
        }
        DaySet::empty()
    }
}

/// Serialized as the canonical representation: an array of lowercase weekday names
impl Serialize for DaySet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let names: Vec<&str> = DAY_NAMES.iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        serializer.collect_seq(names)
    }
}

/// The two persisted representations of a day selector.
///
/// Older documents store a record of per-day boolean flags, newer ones an array of weekday
/// names. Both must keep deserializing.
#[derive(Deserialize)]
#[serde(untagged)]
enum DaySetRepr {
    Names(Vec<String>),
    Flags(HashMap<String, bool>),
}

impl From<DaySetRepr> for DaySet {
    fn from(repr: DaySetRepr) -> Self {
        let mut set = DaySet::empty();
        match repr {
            DaySetRepr::Names(names) => {
                for name in names {
                    set.insert(DaySet::from_name(&name));
                }
            },
            DaySetRepr::Flags(flags) => {
                for (name, enabled) in flags {
                    if enabled {
                        set.insert(DaySet::from_name(&name));
                    }
                }
            },
        }
        set
    }
}

impl<'de> Deserialize<'de> for DaySet {
    fn deserialize<D>(deserializer: D) -> Result<DaySet, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = DaySetRepr::deserialize(deserializer)?;
        Ok(repr.into())
    }
}

/// Accept a frequency stored as any string, mapping unrecognized values to `None`
fn lenient_frequency<'de, D>(deserializer: D) -> Result<Option<Frequency>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(Frequency::parse))
}

/// When and how often a task or event happens.
///
/// This is the part of a schedulable item the calendar cares about: an anchor date, an
/// optional inclusive end date, and a repetition rule.
///
/// Dates are compared at day granularity, so the time-of-day part of `start_date` and
/// `end_date` is irrelevant here (it is only used for display purposes). This comparison is
/// timezone-sensitive: callers must have normalized every date to the same reference timezone
/// beforehand, no conversion happens here.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// The first day this item can happen on
    start_date: DateTime<Utc>,
    /// The last day this item can happen on (inclusive), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<DateTime<Utc>>,
    /// The repetition rule. `None` (e.g. an unrecognized string in the database) means this
    /// item never occurs
    #[serde(default, deserialize_with = "lenient_frequency")]
    frequency: Option<Frequency>,
    /// The selected days, only meaningful for [`Frequency::Custom`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_days: Option<DaySet>,
}

impl Schedule {
    /// A non-repeating schedule for a given day
    pub fn once(start_date: DateTime<Utc>) -> Self {
        Self::new(start_date, None, Some(Frequency::Once), None)
    }

    pub fn new(start_date: DateTime<Utc>, end_date: Option<DateTime<Utc>>,
               frequency: Option<Frequency>, custom_days: Option<DaySet>) -> Self
    {
        Self { start_date, end_date, frequency, custom_days }
    }

    pub fn start_date(&self) -> &DateTime<Utc>          { &self.start_date  }
    pub fn end_date(&self) -> Option<&DateTime<Utc>>    { self.end_date.as_ref() }
    pub fn frequency(&self) -> Option<Frequency>        { self.frequency    }
    pub fn custom_days(&self) -> Option<&DaySet>        { self.custom_days.as_ref() }

    /// Whether this item happens on the given calendar day.
    ///
    /// This is a pure predicate: same arguments, same answer. Anything invalid (missing or
    /// unrecognized frequency, custom frequency without selected days) makes the item never
    /// occur rather than erroring, so the calendar can never be crashed by a malformed
    /// document.
    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        let anchor = self.start_date.date_naive();

        // Recurrence never projects backward
        if day < anchor {
            return false;
        }

        // The end date is inclusive, at day granularity
        if let Some(end) = &self.end_date {
            if day > end.date_naive() {
                return false;
            }
        }

        let frequency = match self.frequency {
            Some(f) => f,
            None => return false,
        };

        match frequency {
            Frequency::Once => day == anchor,
            Frequency::Daily => true,
            Frequency::Weekdays => is_weekend(day.weekday()) == false,
            Frequency::Weekends => is_weekend(day.weekday()),
            Frequency::Custom => match &self.custom_days {
                // Note that the anchor day is not special-cased here: a custom item with no
                // selected day never occurs, not even on its own anchor day
                None => false,
                Some(days) => days.contains_weekday(day.weekday()),
            },
        }
    }
}

fn is_weekend(day: Weekday) -> bool {
    match day {
        Weekday::Sat | Weekday::Sun => true,
        _ => false,
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn date_time(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn once_occurs_on_its_anchor_day_only() {
        // Time-of-day noise on the anchor must not matter
        let schedule = Schedule::once(date_time(2024, 1, 5, 23, 0));

        assert!(schedule.occurs_on(day(2024, 1, 5)));
        assert!(schedule.occurs_on(day(2024, 1, 4)) == false);
        assert!(schedule.occurs_on(day(2024, 1, 6)) == false);
        assert!(schedule.occurs_on(day(2025, 1, 5)) == false);
    }

    #[test]
    fn daily_occurs_from_the_anchor_onwards() {
        let schedule = Schedule::new(date_time(2024, 1, 5, 9, 0), None, Some(Frequency::Daily), None);

        assert!(schedule.occurs_on(day(2024, 1, 4)) == false);
        assert!(schedule.occurs_on(day(2024, 1, 5)));
        assert!(schedule.occurs_on(day(2024, 1, 6)));
        assert!(schedule.occurs_on(day(2027, 12, 31)));
    }

    #[test]
    fn end_date_is_inclusive() {
        // end date == anchor date: occurs exactly once
        let schedule = Schedule::new(
            date_time(2024, 1, 5, 9, 0),
            Some(date_time(2024, 1, 5, 0, 0)),
            Some(Frequency::Daily),
            None,
        );

        assert!(schedule.occurs_on(day(2024, 1, 5)));
        assert!(schedule.occurs_on(day(2024, 1, 6)) == false);
    }

    #[test]
    fn weekdays_skip_saturdays_and_sundays() {
        // 2024-03-01 is a Friday
        let schedule = Schedule::new(date_time(2024, 3, 1, 0, 0), None, Some(Frequency::Weekdays), None);

        assert!(schedule.occurs_on(day(2024, 3, 1)));           // Friday
        assert!(schedule.occurs_on(day(2024, 3, 2)) == false);  // Saturday
        assert!(schedule.occurs_on(day(2024, 3, 3)) == false);  // Sunday
        assert!(schedule.occurs_on(day(2024, 3, 4)));           // Monday
    }

    #[test]
    fn weekends_only() {
        let schedule = Schedule::new(date_time(2024, 3, 1, 0, 0), None, Some(Frequency::Weekends), None);

        assert!(schedule.occurs_on(day(2024, 3, 1)) == false);  // Friday
        assert!(schedule.occurs_on(day(2024, 3, 2)));           // Saturday
        assert!(schedule.occurs_on(day(2024, 3, 3)));           // Sunday
        assert!(schedule.occurs_on(day(2024, 3, 4)) == false);  // Monday
    }

    #[test]
    fn custom_matches_the_selected_days() {
        let schedule = Schedule::new(
            date_time(2024, 3, 1, 0, 0),
            None,
            Some(Frequency::Custom),
            Some(DaySet::MONDAY | DaySet::WEDNESDAY),
        );

        assert!(schedule.occurs_on(day(2024, 3, 4)));           // Monday
        assert!(schedule.occurs_on(day(2024, 3, 5)) == false);  // Tuesday
        assert!(schedule.occurs_on(day(2024, 3, 6)));           // Wednesday
        // The anchor day itself (a Friday) is not selected, so it does not occur
        assert!(schedule.occurs_on(day(2024, 3, 1)) == false);
    }

    #[test]
    fn custom_with_no_selected_day_never_occurs() {
        let empty = Schedule::new(date_time(2024, 3, 1, 0, 0), None, Some(Frequency::Custom), Some(DaySet::empty()));
        let missing = Schedule::new(date_time(2024, 3, 1, 0, 0), None, Some(Frequency::Custom), None);

        for offset in 0..30 {
            let target = day(2024, 3, 1) + chrono::Duration::days(offset);
            assert!(empty.occurs_on(target) == false);
            assert!(missing.occurs_on(target) == false);
        }
    }

    #[test]
    fn missing_or_unrecognized_frequency_never_occurs() {
        let schedule = Schedule::new(date_time(2024, 3, 1, 0, 0), None, None, None);
        assert!(schedule.occurs_on(day(2024, 3, 1)) == false);
        assert!(schedule.occurs_on(day(2024, 3, 2)) == false);

        // An unknown frequency string in a stored document is mapped to "never occurs" as well
        let schedule: Schedule = serde_json::from_str(r#"{
            "startDate": "2024-03-01T00:00:00Z",
            "frequency": "fortnightly"
        }"#).unwrap();
        assert_eq!(schedule.frequency(), None);
        assert!(schedule.occurs_on(day(2024, 3, 1)) == false);
    }

    #[test]
    fn occurs_on_is_a_pure_predicate() {
        let schedule = Schedule::new(date_time(2024, 3, 1, 0, 0), None, Some(Frequency::Weekends), None);
        for _ in 0..3 {
            assert!(schedule.occurs_on(day(2024, 3, 2)));
            assert!(schedule.occurs_on(day(2024, 3, 4)) == false);
        }
    }

    #[test]
    fn frequency_parsing_ignores_case() {
        assert_eq!(Frequency::parse("WEEKDAYS"), Some(Frequency::Weekdays));
        assert_eq!(Frequency::parse("Once"), Some(Frequency::Once));
        assert_eq!(Frequency::parse(" daily "), Some(Frequency::Daily));
        assert_eq!(Frequency::parse("yearly"), None);
        assert_eq!(Frequency::parse(""), None);
    }

    #[test]
    fn day_set_accepts_both_stored_representations() {
        // Newer documents: array of weekday names
        let from_names: DaySet = serde_json::from_str(r#"["Monday", "saturday", "notaday"]"#).unwrap();
        assert_eq!(from_names, DaySet::MONDAY | DaySet::SATURDAY);

        // Older documents: record of boolean flags
        let from_flags: DaySet = serde_json::from_str(r#"{
            "monday": true,
            "tuesday": false,
            "sunday": true
        }"#).unwrap();
        assert_eq!(from_flags, DaySet::MONDAY | DaySet::SUNDAY);

        // Canonical serialization is the names array
        let json = serde_json::to_string(&from_flags).unwrap();
        assert_eq!(json, r#"["monday","sunday"]"#);
    }
}
