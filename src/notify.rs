#[cfg(test)]
use std::sync::{Arc, Mutex};

use color_eyre::owo_colors::style;

/// Kind of a user notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

/// Surface where the user is notified about the outcome of a run
pub trait Notifier: Send + Sync {
    /// Shows the message to the user, fire-and-forget
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Notifies on the standard error, using colors
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => eprintln!("{}{message}", style().yellow().style("-> ")),
            NotificationKind::Failure => eprintln!("{}{message}", style().red().style("[Error] ")),
        }
    }
}

/// Keeps every notification received, shared between its clones
#[cfg(test)]
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<(NotificationKind, String)>>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<(NotificationKind, String)> {
        self.notifications.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.notifications.lock().unwrap().push((kind, message.to_string()));
    }
}
