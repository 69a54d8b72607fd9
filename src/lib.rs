//! This crate turns per-day task records into per-employee task timelines.
//!
//! The backend returns, for every day, the tasks of every user on that day. A task that spans a week thus appears seven times.
//! The [`aggregate`](aggregate::aggregate) module merges these occurrences back into tasks with a start and an end,
//! and the [`grid`] module renders them as a Gantt-like occupancy grid and a flat list.
//!
//! The data comes from a [`TaskSource`](traits::TaskSource): usually the HTTP [`Client`](client::Client), or a [`MemorySource`](memory_source::MemorySource) in tests. \
//! A [`Dashboard`] ties everything together: it validates filters, fetches data and builds the [`DashboardView`](dashboard::DashboardView) to display.

pub mod traits;

pub mod date;
pub mod user;
mod task;
pub use task::{AggregatedTask, CompletionStatus, RawTaskEntry, StatusCode, TaskId, COMPLETED_STATUS_CODE};
pub mod day_record;
pub mod aggregate;
pub mod grid;

pub mod client;
pub mod memory_source;
pub mod mock_behaviour;

pub mod config;
pub mod dashboard;
pub use dashboard::Dashboard;
