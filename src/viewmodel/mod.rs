//! Screen state holders.
//!
//! Each view-model publishes its state on a `watch` channel, reports
//! transient messages through a [`SnackBar`], and re-queries the store
//! whenever [`Database::subscribe`] signals a write.

pub mod dashboard;
pub mod session;
pub mod subject;
pub mod task;
pub mod validation;

use std::future::Future;

use anyhow::Result;
use log::{debug, error, warn};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::db::{Database, Session, Task};

pub use dashboard::{DashboardEvent, DashboardState, DashboardViewModel};
pub use session::{SessionEvent, SessionState, SessionViewModel};
pub use subject::{SubjectEvent, SubjectState, SubjectViewModel};
pub use task::{TaskEvent, TaskState, TaskViewModel};
pub use validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnackBarDuration {
    Short,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnackBarEvent {
    ShowSnackBar {
        message: String,
        duration: SnackBarDuration,
    },
    NavigateUp,
}

impl SnackBarEvent {
    pub fn message(&self) -> Option<&str> {
        match self {
            SnackBarEvent::ShowSnackBar { message, .. } => Some(message),
            SnackBarEvent::NavigateUp => None,
        }
    }
}

pub type SnackBarReceiver = mpsc::UnboundedReceiver<SnackBarEvent>;

/// Sending half of a view-model's message stream. Messages sent after the
/// screen went away are dropped.
#[derive(Clone)]
pub struct SnackBar {
    sender: mpsc::UnboundedSender<SnackBarEvent>,
}

impl SnackBar {
    pub fn channel() -> (Self, SnackBarReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn show(&self, message: impl Into<String>) {
        self.emit(SnackBarEvent::ShowSnackBar {
            message: message.into(),
            duration: SnackBarDuration::Short,
        });
    }

    pub fn show_long(&self, message: impl Into<String>) {
        self.emit(SnackBarEvent::ShowSnackBar {
            message: message.into(),
            duration: SnackBarDuration::Long,
        });
    }

    pub fn navigate_up(&self) {
        self.emit(SnackBarEvent::NavigateUp);
    }

    fn emit(&self, event: SnackBarEvent) {
        if self.sender.send(event).is_err() {
            debug!("Snackbar receiver dropped; message discarded");
        }
    }
}

/// Runs `refresh` once, then again after every store write, until the task is
/// aborted. Refresh failures are logged and the loop keeps going.
pub(crate) fn spawn_observer<F, Fut>(db: &Database, name: &'static str, refresh: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let mut changes = db.subscribe();
    tokio::spawn(async move {
        loop {
            let _ = changes.borrow_and_update();
            if let Err(err) = refresh().await {
                warn!("Failed to refresh {name} state: {err:#}");
            }
            if changes.changed().await.is_err() {
                break;
            }
        }
    })
}

/// Flips a task between upcoming and completed.
pub(crate) async fn toggle_task_completion(db: &Database, snackbar: &SnackBar, task: Task) {
    let updated = Task {
        is_complete: !task.is_complete,
        ..task
    };
    match db.upsert_task(&updated).await {
        Ok(_) if updated.is_complete => snackbar.show("Saved in completed tasks."),
        Ok(_) => snackbar.show("Saved in upcoming tasks."),
        Err(err) => {
            error!("Failed to update task {}: {err:#}", updated.id);
            snackbar.show_long(format!("Couldn't update task. {err}"));
        }
    }
}

/// Deletes the session picked earlier, if any. Returns whether it was removed.
pub(crate) async fn delete_pending_session(
    db: &Database,
    snackbar: &SnackBar,
    pending: Option<Session>,
) -> bool {
    let Some(session) = pending else {
        return false;
    };
    match db.delete_session(session.id).await {
        Ok(()) => {
            snackbar.show("Session deleted successfully");
            true
        }
        Err(err) => {
            error!("Failed to delete session {}: {err:#}", session.id);
            snackbar.show_long(format!("Couldn't delete session. {err}"));
            false
        }
    }
}
