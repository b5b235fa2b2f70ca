//! This crate provides the scheduling core of a personal task-management app.
//!
//! Two independent pieces live here, sharing only the domain model:
//!
//! * the recurrence evaluator in the [`schedule`] module: a pure predicate deciding whether a
//! task or event occurs on a given calendar day, consumed by the calendar rendering path (see
//! the [`calendar`] module helpers).
//! * the reminder dispatcher in the [`reminder`] module: a once-per-minute background job that
//! watches upcoming deadlines and notifies each lead-time threshold at most once, over a chat
//! webhook or by e-mail (see the [`notify`] module).
//!
//! The surrounding application (REST handlers, document store, UI) is not part of this crate;
//! it plugs in through the [`traits`] module. A simple file-backed implementation of the
//! persistence side is provided in the [`store`] module.

pub mod traits;

pub mod schedule;
pub use schedule::{DaySet, Frequency, Schedule};
mod item;
pub use item::{Item, ItemId};
mod task;
pub use task::{CompletionStatus, Task};
mod event;
pub use event::Event;

pub mod calendar;
pub mod reminder;
pub use reminder::ReminderDispatcher;
pub mod notify;
pub mod store;

pub mod config;
pub mod mock_behaviour;
