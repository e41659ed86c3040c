use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info};
use tokio::{sync::watch, task::JoinHandle};

use crate::db::{Database, Priority, Subject, Task};

use super::{
    spawn_observer,
    validation::{start_of_today_millis, validate_due_date, validate_task_title, ValidationError},
    SnackBar, SnackBarReceiver,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskState {
    pub title: String,
    pub description: String,
    pub due_date: Option<i64>,
    pub is_task_complete: bool,
    pub priority: Priority,
    pub related_to_subject: Option<String>,
    pub subjects: Vec<Subject>,
    pub subject_id: Option<i64>,
    /// Set when editing a stored task.
    pub current_task_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub enum TaskEvent {
    TitleChanged(String),
    DescriptionChanged(String),
    DueDateChanged(i64),
    PriorityChanged(Priority),
    RelatedSubjectSelected(Subject),
    ToggleComplete,
    SaveTask,
    DeleteTask,
}

/// Add/edit screen for a single task.
pub struct TaskViewModel {
    db: Database,
    state: watch::Sender<TaskState>,
    snackbar: SnackBar,
}

impl TaskViewModel {
    /// Opens an existing task when `task_id` resolves, otherwise a blank form
    /// pre-bound to `subject_id` if that subject exists.
    pub async fn new(
        db: Database,
        task_id: Option<i64>,
        subject_id: Option<i64>,
    ) -> Result<(Self, SnackBarReceiver)> {
        let (snackbar, receiver) = SnackBar::channel();

        let existing = match task_id {
            Some(id) => db
                .get_task(id)
                .await
                .with_context(|| format!("failed to load task {id}"))?,
            None => None,
        };

        let initial = match existing {
            Some(task) => TaskState {
                title: task.title,
                description: task.description,
                due_date: Some(task.due_date),
                is_task_complete: task.is_complete,
                priority: task.priority,
                related_to_subject: Some(task.related_to_subject),
                subject_id: Some(task.subject_id),
                current_task_id: Some(task.id),
                ..TaskState::default()
            },
            None => {
                let subject = match subject_id {
                    Some(id) => db
                        .get_subject(id)
                        .await
                        .with_context(|| format!("failed to load subject {id}"))?,
                    None => None,
                };
                TaskState {
                    related_to_subject: subject.as_ref().map(|s| s.name.clone()),
                    subject_id: subject.map(|s| s.id),
                    ..TaskState::default()
                }
            }
        };
        let (state, _) = watch::channel(initial);

        Ok((
            Self {
                db,
                state,
                snackbar,
            },
            receiver,
        ))
    }

    pub fn state(&self) -> TaskState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    pub async fn refresh(&self) -> Result<()> {
        let subjects = self.db.get_all_subjects().await?;
        self.state.send_modify(|state| state.subjects = subjects);
        Ok(())
    }

    pub fn observe(self: &Arc<Self>) -> JoinHandle<()> {
        let vm = Arc::clone(self);
        spawn_observer(&self.db, "task", move || {
            let vm = Arc::clone(&vm);
            async move { vm.refresh().await }
        })
    }

    pub async fn on_event(&self, event: TaskEvent) {
        match event {
            TaskEvent::TitleChanged(title) => {
                self.state.send_modify(|state| state.title = title);
            }
            TaskEvent::DescriptionChanged(description) => {
                self.state.send_modify(|state| state.description = description);
            }
            TaskEvent::DueDateChanged(due_date) => {
                match validate_due_date(due_date, start_of_today_millis()) {
                    Ok(()) => self.state.send_modify(|state| state.due_date = Some(due_date)),
                    Err(err) => self.snackbar.show_long(err.to_string()),
                }
            }
            TaskEvent::PriorityChanged(priority) => {
                self.state.send_modify(|state| state.priority = priority);
            }
            TaskEvent::RelatedSubjectSelected(subject) => {
                self.state.send_modify(|state| {
                    state.subject_id = Some(subject.id);
                    state.related_to_subject = Some(subject.name);
                });
            }
            TaskEvent::ToggleComplete => {
                self.state
                    .send_modify(|state| state.is_task_complete = !state.is_task_complete);
            }
            TaskEvent::SaveTask => self.save_task().await,
            TaskEvent::DeleteTask => self.delete_task().await,
        }
    }

    async fn save_task(&self) {
        let form = self.state();
        let (Some(subject_id), Some(related_to_subject)) =
            (form.subject_id, form.related_to_subject)
        else {
            self.snackbar
                .show_long(ValidationError::MissingSubject.to_string());
            return;
        };
        let title = match validate_task_title(&form.title) {
            Ok(title) => title,
            Err(err) => {
                self.snackbar.show_long(err.to_string());
                return;
            }
        };

        let task = Task {
            id: form.current_task_id.unwrap_or(0),
            subject_id,
            title,
            description: form.description,
            due_date: form
                .due_date
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
            priority: form.priority,
            related_to_subject,
            is_complete: form.is_task_complete,
        };
        match self.db.upsert_task(&task).await {
            Ok(id) => {
                info!("Saved task {id} for subject {subject_id}");
                self.state.send_modify(|state| state.current_task_id = Some(id));
                self.snackbar.show("Task saved successfully");
                self.snackbar.navigate_up();
            }
            Err(err) => {
                error!("Failed to save task: {err:#}");
                self.snackbar.show_long(format!("Couldn't save task. {err}"));
            }
        }
    }

    async fn delete_task(&self) {
        let Some(id) = self.state().current_task_id else {
            self.snackbar.show_long("No task to delete");
            return;
        };
        match self.db.delete_task(id).await {
            Ok(()) => {
                self.state.send_modify(|state| state.current_task_id = None);
                self.snackbar.show("Task deleted successfully");
                self.snackbar.navigate_up();
            }
            Err(err) => {
                error!("Failed to delete task {id}: {err:#}");
                self.snackbar
                    .show_long(format!("Couldn't delete task. {err}"));
            }
        }
    }
}
