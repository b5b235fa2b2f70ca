//! Calendar-side queries over schedulable items
//!
//! The calendar UI renders a grid of days and asks, for each displayed day, which items occur
//! on it. This is O(items × days displayed), which is perfectly fine for a personal-scale
//! dataset.

use chrono::NaiveDate;

use crate::item::Item;

/// The items that occur on the given calendar day
pub fn items_on_day<'a, I>(items: I, day: NaiveDate) -> Vec<&'a Item>
where
    I: IntoIterator<Item = &'a Item>,
{
    items.into_iter()
        .filter(|item| item.occurs_on(day))
        .collect()
}

/// Every day of `[first, last]` (inclusive) the given item occurs on
pub fn occurrences_between(item: &Item, first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    first.iter_days()
        .take_while(|day| day <= &last)
        .filter(|day| item.occurs_on(*day))
        .collect()
}


#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::event::Event;
    use crate::schedule::{Frequency, Schedule};
    use crate::task::Task;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekend_task_shows_up_on_weekends_only() {
        // Anchored on Friday 2024-03-01, recurring on weekends, no end date
        let mut task = Task::new("Sleep in".to_string(), "No alarm clock".to_string(), "someone@example.org".to_string());
        task.set_schedule(Some(Schedule::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            None,
            Some(Frequency::Weekends),
            None,
        )));
        let item = Item::Task(task);

        assert!(item.occurs_on(day(2024, 3, 2)));           // Saturday
        assert!(item.occurs_on(day(2024, 3, 4)) == false);  // Monday

        let march = occurrences_between(&item, day(2024, 3, 1), day(2024, 3, 31));
        assert_eq!(march, vec![
            day(2024, 3, 2), day(2024, 3, 3),
            day(2024, 3, 9), day(2024, 3, 10),
            day(2024, 3, 16), day(2024, 3, 17),
            day(2024, 3, 23), day(2024, 3, 24),
            day(2024, 3, 30), day(2024, 3, 31),
        ]);
    }

    #[test]
    fn day_query_mixes_tasks_and_events() {
        let monday = day(2024, 3, 4);

        let event = Event::new("Standup".to_string(), "Short one".to_string(),
            Schedule::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(), None, Some(Frequency::Weekdays), None));

        // A kanban-only task, no schedule: never on the calendar
        let board_task = Task::new("Someday".to_string(), "Not scheduled".to_string(), "someone@example.org".to_string());

        let mut daily_task = Task::new("Water plants".to_string(), "The fern first".to_string(), "someone@example.org".to_string());
        daily_task.set_schedule(Some(Schedule::new(
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap(), None, Some(Frequency::Daily), None)));

        let items = vec![Item::Event(event), Item::Task(board_task), Item::Task(daily_task)];

        let shown = items_on_day(&items, monday);
        let names: Vec<&str> = shown.iter().map(|item| item.name()).collect();
        assert_eq!(names, vec!["Standup", "Water plants"]);

        // Nothing recurs before its anchor
        assert!(items_on_day(&items, day(2023, 12, 31)).is_empty());
    }
}
