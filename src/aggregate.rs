//! Turns sparse per-day task records into deduplicated task intervals
//!
//! A task that is active over several days appears once per day in the backend data.
//! [`aggregate`] merges these occurrences into a single [`AggregatedTask`] whose interval spans all of them.
//!
//! Merge rules, for the occurrences of a task id (in the iteration order: days in input order, then entries in the order the backend listed them):
//! * the first occurrence seeds the task (including its title),
//! * `start` is the earliest start seen, `end` the latest end seen,
//! * `status` is the status of the *last* occurrence seen. \
//!   Note that this is "last in iteration order", not "most recent day": the two only match when the backend sends its days sorted.
//!
//! The result is sorted by start. Tasks that start at the same instant keep the order in which they were first seen.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::date::parse_date;
use crate::day_record::WindowedDays;
use crate::task::{AggregatedTask, StatusCode, TaskId};

/// Which tasks to keep, depending on their status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    /// Keep every task
    All,
    /// Keep only tasks with status `5`
    Completed,
    /// Keep every task whose status is not `5`
    Other,
}

impl StatusFilter {
    pub fn admits(&self, status: &StatusCode) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => status.is_completed(),
            StatusFilter::Other => !status.is_completed(),
        }
    }

    /// The value of the `status` query parameter of `GET /api/data`
    pub fn as_query(&self) -> &'static str {
        match self {
            StatusFilter::All => "",
            StatusFilter::Completed => crate::task::COMPLETED_STATUS_CODE,
            StatusFilter::Other => "other",
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::All
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(StatusFilter::All),
            crate::task::COMPLETED_STATUS_CODE => Ok(StatusFilter::Completed),
            "other" => Ok(StatusFilter::Other),
            other => Err(format!("Unknown status filter {:?}", other)),
        }
    }
}

impl Display for StatusFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all tasks"),
            StatusFilter::Completed => write!(f, "completed tasks"),
            StatusFilter::Other => write!(f, "other tasks"),
        }
    }
}


/// Merge the tasks of `user_email` over `days`.
///
/// `user_email` must already be resolved (and lowercased) by the caller, this function does not validate it.
/// A day without a bucket for this user simply contributes no task.
pub fn aggregate(days: &WindowedDays, user_email: &str, filter: StatusFilter) -> Vec<AggregatedTask> {
    // First-seen order is kept in `tasks`, `index` only points into it
    let mut tasks: Vec<AggregatedTask> = Vec::new();
    let mut index: HashMap<TaskId, usize> = HashMap::new();

    for day in days.iter() {
        let user_tasks = match day.tasks_of(user_email) {
            None => continue,
            Some(t) => t,
        };

        for (id, entry) in user_tasks.iter() {
            let status = entry.status_code();
            if !filter.admits(&status) {
                continue;
            }

            let start = match parse_date(entry.start_field()) {
                Ok(s) => s,
                Err(err) => {
                    log::warn!("Ignoring an occurrence of task {}: invalid start ({})", id, err);
                    continue;
                },
            };
            let end = match parse_date(entry.end_field()) {
                Ok(e) => e,
                Err(err) => {
                    log::warn!("Ignoring an occurrence of task {}: invalid end ({})", id, err);
                    continue;
                },
            };

            match index.get(id) {
                Some(&position) => tasks[position].merge(start, end, status),
                None => {
                    index.insert(id.clone(), tasks.len());
                    tasks.push(AggregatedTask::new(id.clone(), entry.title.as_deref(), start, end, status));
                },
            }
        }
    }

    // `sort_by_key` is stable, ties stay in first-seen order
    tasks.sort_by_key(|task| task.start());
    log::debug!("Aggregated {} tasks of {} over {} days ({})", tasks.len(), user_email, days.len(), filter);
    tasks
}


#[cfg(test)]
mod test {
    use super::*;

    use chrono::{NaiveDate, NaiveDateTime};

    use crate::date::DateWindow;
    use crate::day_record::{filter_by_window, RawDayRecord};

    fn at(m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn days_from(json: &str) -> Vec<RawDayRecord> {
        serde_json::from_str(json).unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::parse(Some("2024-01-01"), Some("2024-01-03")).unwrap()
    }

    const MULTI_DAY: &str = r#"[
        {"Дата": "2024.01.01", "a@x.com": {"t1": {"title": "Report", "start": "2024-01-01", "end": "2024-01-02", "status": "1"}}},
        {"Дата": "2024.01.02", "a@x.com": {"t1": {"title": "Report", "start": "2024-01-01", "end": "2024-01-03", "status": "5"}}}
    ]"#;

    #[test]
    fn test_merge_across_days() {
        let days = days_from(MULTI_DAY);
        let windowed = filter_by_window(&days, &window());
        let tasks = aggregate(&windowed, "a@x.com", StatusFilter::All);

        assert_eq!(tasks.len(), 1);
        let t1 = &tasks[0];
        assert_eq!(t1.id().as_str(), "t1");
        assert_eq!(t1.title(), "Report");
        assert_eq!(t1.start(), at(1, 1));
        assert_eq!(t1.end(), at(1, 3));
        assert_eq!(t1.status().as_str(), "5");
    }

    #[test]
    fn test_bounds_do_not_depend_on_day_order_but_status_does() {
        let mut days = days_from(MULTI_DAY);
        days.reverse();
        let windowed = filter_by_window(&days, &window());
        let tasks = aggregate(&windowed, "a@x.com", StatusFilter::All);

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].start(), at(1, 1));
        assert_eq!(tasks[0].end(), at(1, 3));
        // The last occurrence in iteration order is now the one from 2024-01-01
        assert_eq!(tasks[0].status().as_str(), "1");
    }

    const SAME_DAY: &str = r#"[
        {"Дата": "2024.01.01", "a@x.com": {
            "done": {"title": "Done", "start": "2024-01-01", "end": "2024-01-01", "status": "5"},
            "open": {"title": "Open", "start": "2024-01-01", "end": "2024-01-02", "status": "1"}
        }}
    ]"#;

    #[test]
    fn test_status_filters() {
        let days = days_from(SAME_DAY);
        let windowed = filter_by_window(&days, &window());

        let completed = aggregate(&windowed, "a@x.com", StatusFilter::Completed);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id().as_str(), "done");

        let other = aggregate(&windowed, "a@x.com", StatusFilter::Other);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].id().as_str(), "open");

        let all = aggregate(&windowed, "a@x.com", StatusFilter::All);
        let ids: Vec<&str> = all.iter().map(|t| t.id().as_str()).collect();
        // same start: first-seen order is kept
        assert_eq!(ids, vec!["done", "open"]);
    }

    #[test]
    fn test_numeric_status_codes() {
        let days = days_from(r#"[
            {"Дата": "2024.01.01", "a@x.com": {
                "n": {"title": "Numeric", "start": "2024-01-01", "end": "2024-01-02", "status": 5},
                "c": {"title": "Numeric code", "start": "2024-01-01", "end": "2024-01-01", "status_code": 5},
                "o": {"title": "Numeric other", "start": "2024-01-02", "end": "2024-01-02", "status": 3}
            }}
        ]"#);
        let windowed = filter_by_window(&days, &window());

        let completed = aggregate(&windowed, "a@x.com", StatusFilter::Completed);
        let ids: Vec<&str> = completed.iter().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, vec!["n", "c"]);
        assert_eq!(completed[0].status().as_str(), "5");

        let list = crate::grid::TaskList::build(&completed);
        assert_eq!(list.rows()[0].status(), crate::CompletionStatus::Completed);
        assert_eq!(list.rows()[1].status(), crate::CompletionStatus::Completed);

        let other = aggregate(&windowed, "a@x.com", StatusFilter::Other);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].id().as_str(), "o");
        assert_eq!(other[0].completion_status(), crate::CompletionStatus::Active);
    }

    #[test]
    fn test_filtered_occurrences_are_not_merged() {
        let days = days_from(MULTI_DAY);
        let windowed = filter_by_window(&days, &window());

        let other = aggregate(&windowed, "a@x.com", StatusFilter::Other);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].end(), at(1, 2));
        assert_eq!(other[0].status().as_str(), "1");

        let completed = aggregate(&windowed, "a@x.com", StatusFilter::Completed);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].end(), at(1, 3));
    }

    #[test]
    fn test_same_id_same_day_different_statuses_merge_when_unfiltered() {
        let days = days_from(r#"[
            {"Дата": "2024.01.01", "a@x.com": {"t1": {"title": "Open", "start": "2024-01-01", "end": "2024-01-01", "status": "1"}}},
            {"Дата": "2024.01.01", "a@x.com": {"t1": {"title": "Done", "start": "2024-01-01", "end": "2024-01-02", "status": "5"}}}
        ]"#);
        let windowed = filter_by_window(&days, &window());

        let all = aggregate(&windowed, "a@x.com", StatusFilter::All);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title(), "Open");
        assert_eq!(all[0].end(), at(1, 2));
        assert!(all[0].completed());
    }

    #[test]
    fn test_schema_variants_resolve_identically() {
        let primary = days_from(r#"[{"Дата": "2024.01.02", "a@x.com": {"t": {"start": "2024-01-02T09:00:00", "end": "2024-01-03T18:00:00", "status": "2"}}}]"#);
        let snake = days_from(r#"[{"Дата": "2024.01.02", "a@x.com": {"t": {"start_date": "2024-01-02T09:00:00", "end_date": "2024-01-03T18:00:00", "status": "2"}}}]"#);

        let from_primary = aggregate(&filter_by_window(&primary, &window()), "a@x.com", StatusFilter::All);
        let from_snake = aggregate(&filter_by_window(&snake, &window()), "a@x.com", StatusFilter::All);
        assert_eq!(from_primary, from_snake);
        assert_eq!(from_primary[0].title(), "Task t");
    }

    #[test]
    fn test_sorted_by_start() {
        let days = days_from(r#"[
            {"Дата": "2024.01.01", "a@x.com": {
                "late": {"start": "2024-01-03", "end": "2024-01-03"},
                "early": {"start": "2024-01-01", "end": "2024-01-03"}
            }},
            {"Дата": "2024.01.02", "a@x.com": {
                "middle": {"start": "2024-01-02", "end": "2024-01-02"},
                "late": {"start": "2023-12-30", "end": "2024-01-03"}
            }}
        ]"#);
        let tasks = aggregate(&filter_by_window(&days, &window()), "a@x.com", StatusFilter::All);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id().as_str()).collect();
        // "late" was widened to start on 2023-12-30
        assert_eq!(ids, vec!["late", "early", "middle"]);
    }

    #[test]
    fn test_other_users_and_missing_buckets() {
        let days = days_from(r#"[
            {"Дата": "2024.01.01", "b@x.com": {"t1": {"start": "2024-01-01", "end": "2024-01-01"}}},
            {"Дата": "2024.01.02"}
        ]"#);
        let windowed = filter_by_window(&days, &window());
        assert!(aggregate(&windowed, "a@x.com", StatusFilter::All).is_empty());
        assert_eq!(aggregate(&windowed, "b@x.com", StatusFilter::All).len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let windowed = filter_by_window(&[], &window());
        assert!(aggregate(&windowed, "a@x.com", StatusFilter::All).is_empty());
    }

    #[test]
    fn test_invalid_dates_skip_the_occurrence() {
        let days = days_from(r#"[
            {"Дата": "2024.01.01", "a@x.com": {"t1": {"start": "2024-01-01", "end": "2024-01-01"}}},
            {"Дата": "2024.01.02", "a@x.com": {"t1": {"start": "2024-01-01", "end": "whenever"}}}
        ]"#);
        let tasks = aggregate(&filter_by_window(&days, &window()), "a@x.com", StatusFilter::All);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].end(), at(1, 1));
    }

    #[test]
    fn test_status_filter_query_values() {
        for filter in &[StatusFilter::All, StatusFilter::Completed, StatusFilter::Other] {
            assert_eq!(filter.as_query().parse::<StatusFilter>().unwrap(), *filter);
        }
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert!("done".parse::<StatusFilter>().is_err());
    }
}
