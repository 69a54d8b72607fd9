//! The seam between the dashboard and wherever its data comes from

use std::error::Error;

use async_trait::async_trait;

use crate::aggregate::StatusFilter;
use crate::date::{format_date, DateFormat, DateWindow};
use crate::day_record::RawDayRecord;
use crate::user::{User, UserId};

/// What to ask the backend for
#[derive(Clone, Debug, PartialEq)]
pub struct TaskQuery {
    pub user_id: UserId,
    pub window: DateWindow,
    pub status: StatusFilter,
}

impl TaskQuery {
    pub fn new(user_id: UserId, window: DateWindow, status: StatusFilter) -> Self {
        Self { user_id, window, status }
    }

    /// The query string parameters of `GET /api/data`. Dates use the `yyyy.MM.dd` layout the backend expects.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("userId", self.user_id.to_string()),
            ("dateStart", format_date(self.window.from(), DateFormat::Api)),
            ("dateEnd", format_date(self.window.to(), DateFormat::Api)),
            ("status", self.status.as_query().to_string()),
        ]
    }
}

/// A source of users and day records.
///
/// Usually a [`Client`](crate::client::Client). A [`MemorySource`](crate::memory_source::MemorySource) can be used for tests and demos.
#[async_trait]
pub trait TaskSource {
    /// Returns the list of users
    /// This may be slow or fail (e.g. in case of a remote server)
    async fn get_users(&self) -> Result<Vec<User>, Box<dyn Error>>;

    /// Returns the day records matching a query.
    /// Sources are allowed to return more days than the query window: callers must filter them again.
    async fn get_day_records(&self, query: &TaskQuery) -> Result<Vec<RawDayRecord>, Box<dyn Error>>;
}
