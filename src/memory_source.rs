//! A [`TaskSource`] that serves data from memory
//!
//! It behaves like the real backend: the day records it returns are not filtered by date, user nor status.
//! Its behaviour can be tweaked with a [`MockBehaviour`] to simulate transport errors.

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::date::{enumerate_days, format_date, DateFormat};
use crate::day_record::RawDayRecord;
use crate::mock_behaviour::MockBehaviour;
use crate::task::{RawTaskEntry, StatusCode, TaskId};
use crate::traits::{TaskQuery, TaskSource};
use crate::user::User;

const ENTRY_DATE_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";

/// A task as the upstream task tracker knows it, before it is spread over days
#[derive(Clone, Debug)]
pub struct SourceTask {
    pub id: TaskId,
    pub title: String,
    pub status: StatusCode,
    pub created_date: NaiveDateTime,
    pub deadline: NaiveDateTime,
    pub responsible_email: String,
}

/// Spread tasks over the days they span, the way the backend builds its day records.
///
/// A task appears in the record of every day from its creation date to its deadline date (both included).
/// Records are sorted by date.
pub fn expand_into_days(tasks: &[SourceTask]) -> Vec<RawDayRecord> {
    let mut days = BTreeMap::new();
    for task in tasks {
        let entry = RawTaskEntry {
            title: Some(task.title.clone()),
            start_date: Some(task.created_date.format(ENTRY_DATE_LAYOUT).to_string()),
            end_date: Some(task.deadline.format(ENTRY_DATE_LAYOUT).to_string()),
            status: Some(task.status.clone()),
            ..RawTaskEntry::default()
        };

        for day in enumerate_days(task.created_date.date(), task.deadline.date()) {
            days.entry(day)
                .or_insert_with(|| RawDayRecord::new(Some(format_date(day, DateFormat::Api))))
                .add_entry(&task.responsible_email, task.id.clone(), entry.clone());
        }
    }
    days.into_iter().map(|(_, record)| record).collect()
}


/// An in-memory backend
#[derive(Debug)]
pub struct MemorySource {
    users: Vec<User>,
    days: Vec<RawDayRecord>,

    mock_behaviour: Mutex<MockBehaviour>,
    received_queries: Mutex<Vec<TaskQuery>>,
}

impl MemorySource {
    pub fn new(users: Vec<User>, days: Vec<RawDayRecord>) -> Self {
        Self {
            users,
            days,
            mock_behaviour: Mutex::new(MockBehaviour::default()),
            received_queries: Mutex::new(Vec::new()),
        }
    }

    /// Create a source whose day records are built from whole tasks, see [`expand_into_days`]
    pub fn from_tasks(users: Vec<User>, tasks: &[SourceTask]) -> Self {
        Self::new(users, expand_into_days(tasks))
    }

    pub fn with_mock_behaviour(self, behaviour: MockBehaviour) -> Self {
        Self {
            mock_behaviour: Mutex::new(behaviour),
            ..self
        }
    }

    pub fn days(&self) -> &[RawDayRecord] {
        &self.days
    }

    /// The queries that have been received by `get_day_records` so far (including the failed ones)
    pub fn received_queries(&self) -> Vec<TaskQuery> {
        match self.received_queries.lock() {
            Ok(queries) => queries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn check_behaviour<F>(&self, check: F) -> Result<(), Box<dyn Error>>
    where
        F: FnOnce(&mut MockBehaviour) -> Result<(), Box<dyn Error>>,
    {
        let mut behaviour = self.mock_behaviour.lock()
            .map_err(|_| "The mock behaviour lock is poisoned")?;
        check(&mut *behaviour)
    }
}

#[async_trait]
impl TaskSource for MemorySource {
    async fn get_users(&self) -> Result<Vec<User>, Box<dyn Error>> {
        self.check_behaviour(MockBehaviour::can_get_users)?;
        Ok(self.users.clone())
    }

    async fn get_day_records(&self, query: &TaskQuery) -> Result<Vec<RawDayRecord>, Box<dyn Error>> {
        if let Ok(mut queries) = self.received_queries.lock() {
            queries.push(query.clone());
        }
        self.check_behaviour(MockBehaviour::can_get_day_records)?;
        Ok(self.days.clone())
    }
}


#[cfg(test)]
mod test {
    use super::*;

    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn source_task(id: &str, created: NaiveDateTime, deadline: NaiveDateTime, email: &str) -> SourceTask {
        SourceTask {
            id: TaskId::from(id),
            title: format!("Title of {}", id),
            status: StatusCode::from("2"),
            created_date: created,
            deadline,
            responsible_email: email.to_string(),
        }
    }

    #[test]
    fn test_expand_into_days() {
        let tasks = vec![
            source_task("t1", at(2, 9), at(4, 18), "A@x.com"),
            source_task("t2", at(1, 9), at(2, 9), "b@x.com"),
        ];
        let days = expand_into_days(&tasks);

        let dates: Vec<Option<&str>> = days.iter().map(|d| d.date()).collect();
        assert_eq!(dates, vec![Some("2024.01.01"), Some("2024.01.02"), Some("2024.01.03"), Some("2024.01.04")]);

        assert!(days[0].tasks_of("a@x.com").is_none());
        assert_eq!(days[1].tasks_of("a@x.com").unwrap().len(), 1);
        assert_eq!(days[1].tasks_of("b@x.com").unwrap().len(), 1);
        assert!(days[2].tasks_of("b@x.com").is_none());

        let (id, entry) = days[3].tasks_of("a@x.com").unwrap().iter().next().unwrap();
        assert_eq!(id.as_str(), "t1");
        assert_eq!(entry.start_field(), Some("2024-01-02T09:00:00"));
        assert_eq!(entry.end_field(), Some("2024-01-04T18:00:00"));
    }

    #[tokio::test]
    async fn test_memory_source() {
        let _ = env_logger::builder().is_test(true).try_init();

        let users = vec![User::new("1", None, None, Some("a@x.com".to_string()))];
        let tasks = vec![source_task("t1", at(2, 9), at(3, 18), "a@x.com")];
        let source = MemorySource::from_tasks(users.clone(), &tasks)
            .with_mock_behaviour(MockBehaviour { get_day_records_behaviour: (0, 1), ..MockBehaviour::default() });

        assert_eq!(source.get_users().await.unwrap(), users);

        let window = crate::date::DateWindow::parse(Some("2024-01-01"), Some("2024-01-01")).unwrap();
        let query = TaskQuery::new("1".into(), window, crate::aggregate::StatusFilter::All);
        assert!(source.get_day_records(&query).await.is_err());
        // Days outside of the query window are returned as well
        assert_eq!(source.get_day_records(&query).await.unwrap().len(), 2);
        assert_eq!(source.received_queries().len(), 2);
    }
}
