use std::sync::Arc;

use anyhow::Result;
use log::error;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    db::{models::random_gradient, Database, Session, Subject, Task},
    stats,
};

use super::{
    delete_pending_session, spawn_observer, toggle_task_completion,
    validation::{validate_goal_hours, validate_subject_name},
    SnackBar, SnackBarReceiver,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub total_subject_count: i64,
    pub total_studied_hours: f32,
    pub total_goal_study_hours: f32,
    pub subjects: Vec<Subject>,
    pub upcoming_tasks: Vec<Task>,
    pub recent_sessions: Vec<Session>,
    /// New-subject form.
    pub subject_name: String,
    pub goal_study_hours: String,
    pub subject_card_colors: Vec<i32>,
    /// Session picked for deletion, awaiting confirmation.
    pub session: Option<Session>,
}

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    SubjectNameChanged(String),
    GoalStudyHoursChanged(String),
    SubjectCardColorChanged(Vec<i32>),
    SaveSubject,
    ToggleTaskComplete(Task),
    DeleteSessionClicked(Session),
    DeleteSession,
}

pub struct DashboardViewModel {
    db: Database,
    state: watch::Sender<DashboardState>,
    snackbar: SnackBar,
}

impl DashboardViewModel {
    pub fn new(db: Database) -> (Self, SnackBarReceiver) {
        let (snackbar, receiver) = SnackBar::channel();
        let (state, _) = watch::channel(DashboardState {
            subject_card_colors: random_gradient(),
            ..DashboardState::default()
        });
        (
            Self {
                db,
                state,
                snackbar,
            },
            receiver,
        )
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Re-reads every derived value from the store.
    pub async fn refresh(&self) -> Result<()> {
        let total_subject_count = self.db.get_total_subject_count().await?;
        let total_goal_study_hours = self.db.get_total_goal_hours().await?;
        let subjects = self.db.get_all_subjects().await?;
        let total_duration = self.db.get_total_sessions_duration().await?;
        let upcoming_tasks = self.db.get_all_upcoming_tasks().await?;
        let recent_sessions = self.db.get_recent_five_sessions().await?;

        self.state.send_modify(|state| {
            state.total_subject_count = total_subject_count;
            state.total_goal_study_hours = total_goal_study_hours;
            state.subjects = subjects;
            state.total_studied_hours = stats::to_hours(total_duration);
            state.upcoming_tasks = upcoming_tasks;
            state.recent_sessions = recent_sessions;
        });
        Ok(())
    }

    pub fn observe(self: &Arc<Self>) -> JoinHandle<()> {
        let vm = Arc::clone(self);
        spawn_observer(&self.db, "dashboard", move || {
            let vm = Arc::clone(&vm);
            async move { vm.refresh().await }
        })
    }

    pub async fn on_event(&self, event: DashboardEvent) {
        match event {
            DashboardEvent::SubjectNameChanged(name) => {
                self.state.send_modify(|state| state.subject_name = name);
            }
            DashboardEvent::GoalStudyHoursChanged(hours) => {
                self.state.send_modify(|state| state.goal_study_hours = hours);
            }
            DashboardEvent::SubjectCardColorChanged(colors) => {
                self.state.send_modify(|state| state.subject_card_colors = colors);
            }
            DashboardEvent::SaveSubject => self.save_subject().await,
            DashboardEvent::ToggleTaskComplete(task) => {
                toggle_task_completion(&self.db, &self.snackbar, task).await
            }
            DashboardEvent::DeleteSessionClicked(session) => {
                self.state.send_modify(|state| state.session = Some(session));
            }
            DashboardEvent::DeleteSession => self.delete_session().await,
        }
    }

    async fn save_subject(&self) {
        let form = self.state();
        let (name, goal_hours) = match validate_subject_name(&form.subject_name)
            .and_then(|name| Ok((name, validate_goal_hours(&form.goal_study_hours)?)))
        {
            Ok(validated) => validated,
            Err(err) => {
                self.snackbar.show_long(err.to_string());
                return;
            }
        };

        let subject = Subject::new(
            name,
            goal_hours,
            form.subject_card_colors.clone(),
        );
        match self.db.upsert_subject(&subject).await {
            Ok(_) => {
                self.state.send_modify(|state| {
                    state.subject_name.clear();
                    state.goal_study_hours.clear();
                    state.subject_card_colors = random_gradient();
                });
                self.snackbar.show("Subject saved successfully");
            }
            Err(err) => {
                error!("Failed to save subject: {err:#}");
                self.snackbar
                    .show_long(format!("Couldn't save subject. {err}"));
            }
        }
    }

    async fn delete_session(&self) {
        if delete_pending_session(&self.db, &self.snackbar, self.state().session).await {
            self.state.send_modify(|state| state.session = None);
        }
    }
}
