//! Utilities to track the progression of a load

use std::fmt::{Display, Error, Formatter};

/// The state of the loading indicator
#[derive(Clone, Debug, PartialEq)]
pub enum LoadEvent {
    /// Nothing has been loaded yet
    NotStarted,
    /// A fetch is in flight. The load trigger should be disabled meanwhile.
    Loading{ what: String },
    /// The last load is finished
    Finished{ success: bool },
}

impl LoadEvent {
    pub fn is_loading(&self) -> bool {
        match self {
            LoadEvent::Loading{..} => true,
            _ => false,
        }
    }
}

impl Display for LoadEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            LoadEvent::NotStarted => write!(f, "Load tasks"),
            LoadEvent::Loading{what} => write!(f, "⌛ {}...", what),
            LoadEvent::Finished{success} => match success {
                true => write!(f, "Load tasks"),
                false => write!(f, "Load tasks (last attempt failed)"),
            }
        }
    }
}

impl Default for LoadEvent {
    fn default() -> Self {
        Self::NotStarted
    }
}



/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<LoadEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<LoadEvent>;

/// Create a feeback channel, that can be used to follow the loading state of a dashboard
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(LoadEvent::default())
}




/// A structure that tracks the progression and the errors that happen during a load
pub struct LoadProgress<'a> {
    n_errors: u32,
    feedback_channel: Option<&'a FeedbackSender>,
}
impl<'a> LoadProgress<'a> {
    pub fn new(channel: Option<&'a FeedbackSender>) -> Self {
        Self { n_errors: 0, feedback_channel: channel }
    }

    pub fn is_success(&self) -> bool {
        self.n_errors == 0
    }

    /// Log an error
    pub fn error(&mut self, text: &str) {
        log::error!("{}", text);
        self.n_errors += 1;
    }
    /// Log a warning. Warnings do not make a load fail.
    pub fn warn(&mut self, text: &str) {
        log::warn!("{}", text);
    }
    /// Log an info
    pub fn info(&mut self, text: &str) {
        log::info!("{}", text);
    }
    /// Send an event as a feedback to the listener (if any).
    pub fn feedback(&mut self, event: LoadEvent) {
        if let Some(sender) = self.feedback_channel {
            // Nobody listening is fine
            let _ = sender.send(event);
        }
    }
    /// Tell the listener this load is over
    pub fn finish(&mut self) {
        let success = self.is_success();
        self.feedback(LoadEvent::Finished{ success });
    }
}
