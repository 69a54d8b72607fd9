//! Per-day task records, as returned by `GET /api/data`, and their date-window filter

use std::collections::HashMap;
use std::convert::TryFrom;
use std::error::Error;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::date::{parse_date, DateWindow};
use crate::task::{RawTaskEntry, TaskId};

/// Keys that may hold the date of a day record. Every other key is a user email.
pub const DATE_KEYS: &[&str] = &["Дата", "date", "Date"];

/// The tasks of one user on one day, in the order the backend listed them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserTasks {
    entries: Vec<(TaskId, RawTaskEntry)>,
}

impl UserTasks {
    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, &RawTaskEntry)> {
        self.entries.iter().map(|(id, entry)| (id, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, id: TaskId, entry: RawTaskEntry) {
        self.entries.push((id, entry));
    }
}


/// One day worth of task data: a date, and for every user email, the tasks of that user
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawDayRecord {
    date: Option<String>,
    users: HashMap<String, UserTasks>,
}

impl RawDayRecord {
    /// Create an empty record. `date` is kept verbatim, it is only parsed when filtering by window.
    pub fn new(date: Option<String>) -> Self {
        Self { date, users: HashMap::new() }
    }

    /// Append a task to the bucket of a user (emails are lowercased)
    pub fn add_entry(&mut self, email: &str, id: TaskId, entry: RawTaskEntry) {
        self.users
            .entry(email.to_lowercase())
            .or_default()
            .push(id, entry);
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// The tasks of a user on this day, if there are any
    pub fn tasks_of(&self, email: &str) -> Option<&UserTasks> {
        self.users.get(email)
    }

    /// The emails that have a bucket in this record
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }
}

impl TryFrom<Value> for RawDayRecord {
    type Error = Box<dyn Error>;

    /// Build a record from a JSON object such as `{"Дата": "2024.01.05", "a@x.com": {"12": {...}}}`
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let object = match value {
            Value::Object(object) => object,
            other => return Err(format!("A day record must be a JSON object, got {}", other).into()),
        };

        let mut record = RawDayRecord::default();
        for (key, value) in object {
            if DATE_KEYS.contains(&key.as_str()) {
                match value {
                    Value::String(s) => record.date = Some(s),
                    Value::Null => (),
                    other => log::debug!("Ignoring non-textual date {}", other),
                }
                continue;
            }

            let tasks = match value {
                Value::Object(tasks) => tasks,
                Value::Null => continue,
                Value::Array(a) if a.is_empty() => continue,
                other => {
                    log::debug!("Ignoring unexpected value for user {}: {}", key, other);
                    continue;
                },
            };
            for (task_id, entry) in tasks {
                match serde_json::from_value::<RawTaskEntry>(entry) {
                    Ok(entry) => record.add_entry(&key, TaskId::from(task_id), entry),
                    Err(err) => log::warn!("Ignoring invalid task {} of {}: {}", task_id, key, err),
                }
            }
        }

        Ok(record)
    }
}

/// Used to support serde
impl<'de> Deserialize<'de> for RawDayRecord {
    fn deserialize<D>(deserializer: D) -> Result<RawDayRecord, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        RawDayRecord::try_from(value).map_err(serde::de::Error::custom)
    }
}


/// Day records that are known to lie within a date window.
///
/// This can only be built by [`filter_by_window`], which is what the aggregator relies on.
#[derive(Clone, Debug)]
pub struct WindowedDays<'a> {
    window: DateWindow,
    days: Vec<&'a RawDayRecord>,
}

impl<'a> WindowedDays<'a> {
    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a RawDayRecord> + '_ {
        self.days.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Keep the records whose own date falls within `window`, in input order.
///
/// The backend may return more days than asked. Records without a date, or with an unparseable one, are dropped.
pub fn filter_by_window<'a>(days: &'a [RawDayRecord], window: &DateWindow) -> WindowedDays<'a> {
    let kept = days.iter()
        .filter(|day| {
            let date = match day.date() {
                None => {
                    log::debug!("Dropping a day record without date");
                    return false;
                },
                Some(d) => d,
            };
            match parse_date(Some(date)) {
                Ok(dt) => window.contains(dt.date()),
                Err(err) => {
                    log::debug!("Dropping a day record: {}", err);
                    false
                },
            }
        })
        .collect();

    WindowedDays { window: *window, days: kept }
}
