//! The dashboard: wires filter inputs to a [`TaskSource`], the aggregator and the renderers
//!
//! A [`Dashboard`] owns an explicit [`SessionState`]: the last loaded users and the last fetched day records.
//! Each successful fetch replaces the corresponding part of this state wholesale, nothing is merged across fetches.

use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;

use crate::aggregate::{aggregate, StatusFilter};
use crate::config::Config;
use crate::date::{format_date, DateFormat, DateWindow};
use crate::day_record::{filter_by_window, RawDayRecord};
use crate::grid::{OccupancyGrid, TaskList};
use crate::task::AggregatedTask;
use crate::traits::{TaskQuery, TaskSource};
use crate::user::{build_user_index, User, UserDirectory, UserId};

pub mod progress;
use progress::{FeedbackSender, LoadEvent, LoadProgress};


/// Why a load did not produce a view
#[derive(Clone, Debug, PartialEq)]
pub enum DashboardError {
    /// The filters are incomplete or invalid. No request has been sent.
    Validation(String),
    /// The backend could not be reached, or answered with an error
    Transport(String),
    /// The selected user has no known email, so none of the fetched tasks can be attributed to them
    Resolution(UserId),
}

impl Display for DashboardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardError::Validation(details) => write!(f, "Invalid filters: {}", details),
            DashboardError::Transport(details) => write!(f, "Unable to load data: {}", details),
            DashboardError::Resolution(user_id) => write!(f, "No email is known for user {}", user_id),
        }
    }
}

impl Error for DashboardError {}


/// Conditions that are worth telling the user, but that are not errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Warning {
    /// None of the fetched day records lies in the selected window
    NoDataInWindow,
    /// There are records, but no task to display once filtered
    NoTasks,
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::NoDataInWindow => write!(f, "No data for the selected period"),
            Warning::NoTasks => write!(f, "No tasks or dates to display"),
        }
    }
}


/// The filters, as typed by the user
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterForm {
    pub user_id: String,
    pub date_from: String,
    pub date_to: String,
    pub status: StatusFilter,
}

impl FilterForm {
    /// A form for a user, pre-filled with the default window that ends on `today`
    pub fn with_default_window(user_id: &str, today: NaiveDate, config: &Config) -> Self {
        let window = DateWindow::lookback(today, config.default_date_range);
        Self {
            user_id: user_id.to_string(),
            date_from: format_date(window.from(), DateFormat::Iso),
            date_to: format_date(window.to(), DateFormat::Iso),
            status: StatusFilter::All,
        }
    }

    /// Check every field is filled, and turn the form into a query
    pub fn validate(&self) -> Result<TaskQuery, DashboardError> {
        let user_id = self.user_id.trim();
        if user_id.is_empty() || self.date_from.trim().is_empty() || self.date_to.trim().is_empty() {
            return Err(DashboardError::Validation(String::from("every filter field must be filled")));
        }

        let window = DateWindow::parse(Some(&self.date_from), Some(&self.date_to))
            .map_err(|err| DashboardError::Validation(err.to_string()))?;
        Ok(TaskQuery::new(UserId::from(user_id), window, self.status))
    }
}


/// What the dashboard displays after a load
#[derive(Clone, Debug)]
pub struct DashboardView {
    window: DateWindow,
    tasks: Vec<AggregatedTask>,
    grid: OccupancyGrid,
    list: TaskList,
    warning: Option<Warning>,
}

impl DashboardView {
    fn empty(window: DateWindow, warning: Warning) -> Self {
        Self {
            window,
            tasks: Vec::new(),
            grid: OccupancyGrid::default(),
            list: TaskList::default(),
            warning: Some(warning),
        }
    }

    pub fn window(&self) -> &DateWindow            { &self.window }
    pub fn tasks(&self) -> &[AggregatedTask]       { &self.tasks }
    pub fn grid(&self) -> &OccupancyGrid           { &self.grid }
    pub fn list(&self) -> &TaskList                { &self.list }
    pub fn warning(&self) -> Option<Warning>       { self.warning }
}

impl Display for DashboardView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(warning) = self.warning {
            return writeln!(f, "{} ({})", warning, self.window);
        }
        write!(f, "{}", self.grid)?;
        writeln!(f)?;
        write!(f, "{}", self.list)
    }
}


/// Everything the dashboard remembers between two operations
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    users: Vec<User>,
    directory: UserDirectory,
    days: Vec<RawDayRecord>,
}

impl SessionState {
    pub fn users(&self) -> &[User]                 { &self.users }
    pub fn directory(&self) -> &UserDirectory      { &self.directory }
    /// The day records of the last successful fetch
    pub fn days(&self) -> &[RawDayRecord]          { &self.days }

    fn set_users(&mut self, users: Vec<User>) {
        self.directory = build_user_index(&users);
        self.users = users;
    }
}


/// A single-session task dashboard
pub struct Dashboard<S: TaskSource> {
    source: S,
    config: Config,
    state: SessionState,

    feedback_channel: Option<FeedbackSender>,
}

impl<S: TaskSource> Dashboard<S> {
    /// Create a dashboard. Nothing is fetched yet, see [`Self::init`]
    pub fn new(source: S, config: Config) -> Result<Self, Box<dyn Error>> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            state: SessionState::default(),
            feedback_channel: None,
        })
    }

    /// Publish the loading state of this dashboard on a channel (see [`progress::feedback_channel`])
    pub fn with_feedback_channel(self, sender: FeedbackSender) -> Self {
        Self { feedback_channel: Some(sender), ..self }
    }

    pub fn source(&self) -> &S              { &self.source }
    pub fn config(&self) -> &Config         { &self.config }
    pub fn state(&self) -> &SessionState    { &self.state }

    /// Load the users, so that they can be picked. This is the first thing to do with a dashboard.
    pub async fn init(&mut self) -> Result<(), DashboardError> {
        self.load_users().await?;
        Ok(())
    }

    /// (Re-)load the list of users from the source
    pub async fn load_users(&mut self) -> Result<&[User], DashboardError> {
        let mut progress = LoadProgress::new(self.feedback_channel.as_ref());
        progress.feedback(LoadEvent::Loading{ what: String::from("Loading users") });

        let fetched = self.source.get_users().await
            .map_err(|err| DashboardError::Transport(err.to_string()));
        let outcome = match fetched {
            Err(err) => {
                progress.error(&err.to_string());
                Err(err)
            },
            Ok(users) => {
                progress.info(&format!("Loaded {} users", users.len()));
                self.state.set_users(users);
                Ok(())
            },
        };
        progress.finish();

        outcome?;
        Ok(self.state.users())
    }

    /// The users that can be picked, with their display names. Users without an ID cannot be picked.
    pub fn user_choices(&self) -> Vec<(UserId, String)> {
        self.state.users()
            .iter()
            .filter(|user| !user.id().is_empty())
            .map(|user| (user.id().clone(), user.display_name()))
            .collect()
    }

    /// The filters to show when the dashboard starts, for the day `today`
    pub fn default_filters(&self, user_id: &str, today: NaiveDate) -> FilterForm {
        FilterForm::with_default_window(user_id, today, &self.config)
    }

    /// Validate the filters, fetch the matching day records and build the view.
    ///
    /// Invalid filters abort before any request is sent. Empty results are not errors: they come back as a view with a [`Warning`].
    pub async fn load_tasks(&mut self, form: &FilterForm) -> Result<DashboardView, DashboardError> {
        let query = match form.validate() {
            Ok(query) => query,
            Err(err) => {
                log::error!("{}", err);
                return Err(err);
            }
        };

        let mut progress = LoadProgress::new(self.feedback_channel.as_ref());
        progress.feedback(LoadEvent::Loading{ what: String::from("Loading tasks") });

        let fetched = self.source.get_day_records(&query).await
            .map_err(|err| DashboardError::Transport(err.to_string()));
        let days = match fetched {
            Err(err) => {
                progress.error(&err.to_string());
                progress.finish();
                return Err(err);
            },
            Ok(days) => days,
        };
        self.state.days = days;

        let outcome = self.process(&query);
        match &outcome {
            Err(err) => progress.error(&err.to_string()),
            Ok(view) => match view.warning() {
                Some(warning) => progress.warn(&warning.to_string()),
                None => progress.info(&format!("Displaying {} tasks", view.tasks().len())),
            },
        }
        progress.finish();
        outcome
    }

    /// Build the view of a query from the day records already in the session.
    ///
    /// This never fetches anything.
    pub fn process(&self, query: &TaskQuery) -> Result<DashboardView, DashboardError> {
        let email = match self.state.directory().email_of(&query.user_id) {
            Some(email) => email,
            None => return Err(DashboardError::Resolution(query.user_id.clone())),
        };

        let windowed = filter_by_window(self.state.days(), &query.window);
        if windowed.is_empty() {
            return Ok(DashboardView::empty(query.window, Warning::NoDataInWindow));
        }

        let tasks = aggregate(&windowed, email, query.status);
        let grid = OccupancyGrid::build(&tasks, query.window.days(), &self.config.row_colors);
        if grid.is_empty() {
            return Ok(DashboardView::empty(query.window, Warning::NoTasks));
        }

        let list = TaskList::build(&tasks);
        Ok(DashboardView {
            window: query.window,
            tasks,
            grid,
            list,
            warning: None,
        })
    }
}
