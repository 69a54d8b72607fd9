//! Tasks, as sent by the backend and as aggregated by this crate

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};
use chrono::NaiveDateTime;

/// The backend status code of a completed task
pub const COMPLETED_STATUS_CODE: &str = "5";

/// Identifier of a task, as used in the keys of a day record
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}


/// A raw backend status code.
///
/// Only `"5"` has a meaning for this crate (completed). Every other code is "active or other".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StatusCode(String);

impl StatusCode {
    pub fn completed() -> Self {
        Self(COMPLETED_STATUS_CODE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_completed(&self) -> bool {
        self.0 == COMPLETED_STATUS_CODE
    }

    pub fn completion_status(&self) -> CompletionStatus {
        if self.is_completed() {
            CompletionStatus::Completed
        } else {
            CompletionStatus::Active
        }
    }
}

impl From<&str> for StatusCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Used to support serde. Some backends send status codes as numbers.
impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D>(deserializer: D) -> Result<StatusCode, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawCode {
            Text(String),
            Number(i64),
        }

        Ok(match RawCode::deserialize(deserializer)? {
            RawCode::Text(s) => StatusCode(s),
            RawCode::Number(n) => StatusCode(n.to_string()),
        })
    }
}


/// The two states a task can be displayed in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    Completed,
    Active,
}

impl CompletionStatus {
    pub fn is_completed(&self) -> bool {
        match self {
            CompletionStatus::Completed => true,
            _ => false,
        }
    }
}

impl Display for CompletionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionStatus::Completed => write!(f, "Completed"),
            CompletionStatus::Active => write!(f, "Active"),
        }
    }
}


/// One occurrence of a task in a day record.
///
/// Two schema variants exist upstream: `start`/`end` and `start_date`/`end_date`.
/// Both are kept, the resolution happens in [`RawTaskEntry::start_field`] and [`RawTaskEntry::end_field`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTaskEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<StatusCode>,
    #[serde(default)]
    pub status_code: Option<StatusCode>,
}

impl RawTaskEntry {
    /// The start value to parse: `start_date` if it is set, `start` otherwise
    pub fn start_field(&self) -> Option<&str> {
        prefer_non_empty(self.start_date.as_deref(), self.start.as_deref())
    }

    /// The end value to parse: `end_date` if it is set, `end` otherwise
    pub fn end_field(&self) -> Option<&str> {
        prefer_non_empty(self.end_date.as_deref(), self.end.as_deref())
    }

    /// The status code: `status` if it is set, `status_code` otherwise.
    /// An entry without either counts as not completed.
    pub fn status_code(&self) -> StatusCode {
        self.status.as_ref()
            .or(self.status_code.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

fn prefer_non_empty<'a>(preferred: Option<&'a str>, fallback: Option<&'a str>) -> Option<&'a str> {
    match preferred {
        Some(s) if !s.is_empty() => Some(s),
        _ => fallback.filter(|s| !s.is_empty()),
    }
}


/// A task merged over every day it appears in
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedTask {
    id: TaskId,
    title: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    status: StatusCode,
}

impl AggregatedTask {
    /// Create a task from its first occurrence. An empty title is replaced by `Task <id>`.
    pub fn new(id: TaskId, title: Option<&str>, start: NaiveDateTime, end: NaiveDateTime, status: StatusCode) -> Self {
        let title = match title {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Task {}", id),
        };
        Self { id, title, start, end, status }
    }

    pub fn id(&self) -> &TaskId             { &self.id     }
    pub fn title(&self) -> &str             { &self.title  }
    pub fn start(&self) -> NaiveDateTime    { self.start   }
    pub fn end(&self) -> NaiveDateTime      { self.end     }
    pub fn status(&self) -> &StatusCode     { &self.status }
    pub fn completed(&self) -> bool         { self.status.is_completed() }
    pub fn completion_status(&self) -> CompletionStatus { self.status.completion_status() }

    /// Widen the interval to include another occurrence, and take its status.
    ///
    /// Only the aggregator calls this: an aggregated task is never modified once it has been returned.
    pub(crate) fn merge(&mut self, start: NaiveDateTime, end: NaiveDateTime, status: StatusCode) {
        if start < self.start {
            self.start = start;
        }
        if end > self.end {
            self.end = end;
        }
        if status != self.status {
            log::debug!("Task {} changes status from {:?} to {:?} (last occurrence wins)", self.id, self.status.as_str(), status.as_str());
        }
        self.status = status;
    }
}
