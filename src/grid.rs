//! Rendering of aggregated tasks: a day-by-day occupancy grid, and a flat task list

use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, NaiveDateTime};
use csscolorparser::Color;
use serde::Serialize;

use crate::date::{format_date, midnight, DateFormat};
use crate::task::{AggregatedTask, CompletionStatus, TaskId};

const COVERED_CELL: &str = "  █  ";
const EMPTY_CELL: &str = "     ";

/// Whether `task` covers the calendar day `day`.
///
/// A task covers a day when it starts before the day ends, and (for completed tasks only) it ends after the day starts.
/// Tasks that are not completed have no meaningful end yet: they cover every day from their start onwards.
pub fn covers_day(task: &AggregatedTask, day: NaiveDate) -> bool {
    let day_start = midnight(day);
    let day_end = match day.succ_opt() {
        Some(next) => midnight(next),
        None => NaiveDateTime::MAX,
    };

    task.start() < day_end && (!task.completed() || task.end() >= day_start)
}

/// The colour of the `row`-th row. Colours are reused cyclically.
pub fn row_color(palette: &[Color], row: usize) -> Option<&Color> {
    if palette.is_empty() {
        return None;
    }
    palette.get(row % palette.len())
}


/// One task in the grid
#[derive(Clone, Debug, Serialize)]
pub struct GridRow {
    task_id: TaskId,
    title: String,
    color: Option<Color>,
    cells: Vec<bool>,
}

impl GridRow {
    pub fn task_id(&self) -> &TaskId        { &self.task_id }
    pub fn title(&self) -> &str             { &self.title }
    pub fn color(&self) -> Option<&Color>   { self.color.as_ref() }
    /// One entry per day column, `true` when the task covers that day
    pub fn cells(&self) -> &[bool]          { &self.cells }
}

/// A Gantt-like grid: one row per task, one column per day
#[derive(Clone, Debug, Default, Serialize)]
pub struct OccupancyGrid {
    days: Vec<NaiveDate>,
    rows: Vec<GridRow>,
}

impl OccupancyGrid {
    pub fn build<I>(tasks: &[AggregatedTask], days: I, palette: &[Color]) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let days: Vec<NaiveDate> = days.into_iter().collect();
        let rows = tasks.iter()
            .enumerate()
            .map(|(index, task)| GridRow {
                task_id: task.id().clone(),
                title: task.title().to_string(),
                color: row_color(palette, index).cloned(),
                cells: days.iter().map(|day| covers_day(task, *day)).collect(),
            })
            .collect();

        Self { days, rows }
    }

    pub fn days(&self) -> &[NaiveDate] { &self.days }
    pub fn rows(&self) -> &[GridRow]    { &self.rows }

    /// A grid with nothing to show
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.days.is_empty()
    }

    /// Render as an HTML `<table>` fragment
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"excel-grid\"><tbody>");
        for row in &self.rows {
            let style = match row.color() {
                Some(color) => format!(" style=\"background-color: {}\"", color.to_hex_string()),
                None => String::new(),
            };
            html.push_str("<tr>");
            html.push_str(&format!("<td class=\"fixed-cell\"{}>{}</td>", style, escape_html(row.title())));
            for covered in row.cells() {
                if *covered {
                    html.push_str(&format!("<td{}></td>", style));
                } else {
                    html.push_str("<td></td>");
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody><tfoot><tr><td></td>");
        for day in &self.days {
            html.push_str(&format!("<td class=\"date-cell\">{}</td>", format_date(*day, DateFormat::DayMonth)));
        }
        html.push_str("</tr></tfoot></table>");
        html
    }
}

impl Display for OccupancyGrid {
    /// A text rendering, with a footer of `dd.MM` day labels
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let width = self.rows.iter()
            .map(|row| row.title().chars().count())
            .max()
            .unwrap_or(0);

        for row in &self.rows {
            let mut line = format!("{:<width$}", row.title(), width = width);
            for covered in row.cells() {
                line.push(' ');
                line.push_str(if *covered { COVERED_CELL } else { EMPTY_CELL });
            }
            writeln!(f, "{}", line.trim_end())?;
        }

        let mut footer = " ".repeat(width);
        for day in &self.days {
            footer.push(' ');
            footer.push_str(&format_date(*day, DateFormat::DayMonth));
        }
        writeln!(f, "{}", footer)
    }
}


/// One line of the task list
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskListRow {
    start: String,
    title: String,
    status: CompletionStatus,
}

impl TaskListRow {
    /// Start date, formatted `dd.MM.yyyy`
    pub fn start(&self) -> &str                 { &self.start }
    pub fn title(&self) -> &str                 { &self.title }
    pub fn status(&self) -> CompletionStatus    { self.status }
}

/// The companion list of the grid: one row per task
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TaskList {
    rows: Vec<TaskListRow>,
}

impl TaskList {
    pub fn build(tasks: &[AggregatedTask]) -> Self {
        let rows = tasks.iter()
            .map(|task| TaskListRow {
                start: format_date(task.start().date(), DateFormat::DayMonthYear),
                title: task.title().to_string(),
                status: task.completion_status(),
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[TaskListRow] { &self.rows }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as HTML `<tr>` rows, for the body of a three-column table
    pub fn to_html(&self) -> String {
        if self.rows.is_empty() {
            return String::from("<tr><td colspan=\"3\">No tasks</td></tr>");
        }

        self.rows.iter()
            .map(|row| {
                let class = match row.status() {
                    CompletionStatus::Completed => "status-completed",
                    CompletionStatus::Active => "status-active",
                };
                format!("<tr><td>{}</td><td>{}</td><td><span class=\"{}\">{}</span></td></tr>",
                    row.start(), escape_html(row.title()), class, row.status())
            })
            .collect()
    }
}

impl Display for TaskList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "No tasks");
        }
        for row in &self.rows {
            let completion = if row.status().is_completed() { "✓" } else { " " };
            writeln!(f, "{} {}  {}\t{}", completion, row.start(), row.title(), row.status())?;
        }
        Ok(())
    }
}


fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
