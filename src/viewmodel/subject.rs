use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info};
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    db::{Database, Session, Subject, Task},
    stats,
};

use super::{
    delete_pending_session, spawn_observer, toggle_task_completion,
    validation::{validate_goal_hours, validate_subject_name},
    SnackBar, SnackBarReceiver,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectState {
    /// `None` when the subject no longer exists.
    pub current_subject_id: Option<i64>,
    pub subject_name: String,
    pub goal_study_hours: String,
    pub subject_card_colors: Vec<i32>,
    pub studied_hours: f32,
    pub progress: f32,
    pub upcoming_tasks: Vec<Task>,
    pub completed_tasks: Vec<Task>,
    pub recent_sessions: Vec<Session>,
    pub session: Option<Session>,
}

impl SubjectState {
    /// Progress against the goal currently typed in the form; an unparsable
    /// goal counts as one hour.
    fn recompute_progress(&mut self) {
        let goal = self.goal_study_hours.trim().parse::<f32>().unwrap_or(1.0);
        self.progress = stats::goal_progress(self.studied_hours, goal);
    }
}

#[derive(Debug, Clone)]
pub enum SubjectEvent {
    SubjectNameChanged(String),
    GoalStudyHoursChanged(String),
    SubjectCardColorChanged(Vec<i32>),
    UpdateSubject,
    DeleteSubject,
    ToggleTaskComplete(Task),
    UpdateProgress,
    DeleteSessionClicked(Session),
    DeleteSession,
}

/// Detail screen for one subject.
pub struct SubjectViewModel {
    db: Database,
    subject_id: i64,
    state: watch::Sender<SubjectState>,
    snackbar: SnackBar,
}

impl SubjectViewModel {
    /// Loads the subject into the edit form. A missing subject leaves the
    /// default state in place.
    pub async fn new(db: Database, subject_id: i64) -> Result<(Self, SnackBarReceiver)> {
        let (snackbar, receiver) = SnackBar::channel();
        let subject = db
            .get_subject(subject_id)
            .await
            .with_context(|| format!("failed to load subject {subject_id}"))?;

        let initial = match subject {
            Some(subject) => SubjectState {
                current_subject_id: Some(subject.id),
                subject_name: subject.name,
                goal_study_hours: subject.goal_hours.to_string(),
                subject_card_colors: subject.colors,
                ..SubjectState::default()
            },
            None => {
                info!("Subject {subject_id} not found");
                SubjectState::default()
            }
        };
        let (state, _) = watch::channel(initial);

        Ok((
            Self {
                db,
                subject_id,
                state,
                snackbar,
            },
            receiver,
        ))
    }

    pub fn state(&self) -> SubjectState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubjectState> {
        self.state.subscribe()
    }

    pub async fn refresh(&self) -> Result<()> {
        let id = self.subject_id;
        let exists = self.db.get_subject(id).await?.is_some();
        let duration = self.db.get_total_sessions_duration_for_subject(id).await?;
        let upcoming_tasks = self.db.get_upcoming_tasks_for_subject(id).await?;
        let completed_tasks = self.db.get_completed_tasks_for_subject(id).await?;
        let recent_sessions = self.db.get_recent_ten_sessions_for_subject(id).await?;

        self.state.send_modify(|state| {
            if !exists {
                *state = SubjectState::default();
                return;
            }
            state.studied_hours = stats::to_hours(duration);
            state.upcoming_tasks = upcoming_tasks;
            state.completed_tasks = completed_tasks;
            state.recent_sessions = recent_sessions;
            state.recompute_progress();
        });
        Ok(())
    }

    pub fn observe(self: &Arc<Self>) -> JoinHandle<()> {
        let vm = Arc::clone(self);
        spawn_observer(&self.db, "subject", move || {
            let vm = Arc::clone(&vm);
            async move { vm.refresh().await }
        })
    }

    pub async fn on_event(&self, event: SubjectEvent) {
        match event {
            SubjectEvent::SubjectNameChanged(name) => {
                self.state.send_modify(|state| state.subject_name = name);
            }
            SubjectEvent::GoalStudyHoursChanged(hours) => {
                self.state.send_modify(|state| state.goal_study_hours = hours);
            }
            SubjectEvent::SubjectCardColorChanged(colors) => {
                self.state.send_modify(|state| state.subject_card_colors = colors);
            }
            SubjectEvent::UpdateSubject => self.update_subject().await,
            SubjectEvent::DeleteSubject => self.delete_subject().await,
            SubjectEvent::ToggleTaskComplete(task) => {
                toggle_task_completion(&self.db, &self.snackbar, task).await
            }
            SubjectEvent::UpdateProgress => {
                self.state.send_modify(SubjectState::recompute_progress);
            }
            SubjectEvent::DeleteSessionClicked(session) => {
                self.state.send_modify(|state| state.session = Some(session));
            }
            SubjectEvent::DeleteSession => {
                if delete_pending_session(&self.db, &self.snackbar, self.state().session).await {
                    self.state.send_modify(|state| state.session = None);
                }
            }
        }
    }

    async fn update_subject(&self) {
        let form = self.state();
        let Some(id) = form.current_subject_id else {
            self.snackbar
                .show_long("Couldn't update subject. It no longer exists.");
            return;
        };
        let (name, goal_hours) = match validate_subject_name(&form.subject_name)
            .and_then(|name| Ok((name, validate_goal_hours(&form.goal_study_hours)?)))
        {
            Ok(validated) => validated,
            Err(err) => {
                self.snackbar.show_long(err.to_string());
                return;
            }
        };

        let subject = Subject {
            id,
            name,
            goal_hours,
            colors: form.subject_card_colors,
        };
        match self.db.upsert_subject(&subject).await {
            Ok(_) => self.snackbar.show("Subject updated successfully"),
            Err(err) => {
                error!("Failed to update subject {id}: {err:#}");
                self.snackbar
                    .show_long(format!("Couldn't update subject. {err}"));
            }
        }
    }

    /// Removes the subject together with its tasks and sessions.
    async fn delete_subject(&self) {
        let Some(id) = self.state().current_subject_id else {
            self.snackbar.show_long("No subject to delete");
            return;
        };

        let result: Result<()> = async {
            self.db.delete_subject(id).await?;
            self.db.delete_tasks_for_subject(id).await?;
            self.db.delete_sessions_for_subject(id).await
        }
        .await;

        match result {
            Ok(()) => {
                info!("Deleted subject {id} with its tasks and sessions");
                self.state.send_modify(|state| *state = SubjectState::default());
                self.snackbar.show("Subject deleted successfully");
                self.snackbar.navigate_up();
            }
            Err(err) => {
                error!("Failed to delete subject {id}: {err:#}");
                self.snackbar
                    .show_long(format!("Couldn't delete subject. {err}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{connection::test_support::temp_database, Priority},
        viewmodel::{
            test_support::{drain, messages},
            SnackBarDuration, SnackBarEvent,
        },
    };
    use pretty_assertions::assert_eq;

    fn task(subject_id: i64, title: &str, due_date: i64, done: bool) -> Task {
        Task {
            id: 0,
            subject_id,
            title: title.into(),
            description: String::new(),
            due_date,
            priority: Priority::Medium,
            related_to_subject: "Physics".into(),
            is_complete: done,
        }
    }

    fn session(subject_id: i64, date: i64, duration: u64) -> Session {
        Session {
            id: 0,
            subject_id,
            related_to_subject: "Physics".into(),
            date,
            duration,
        }
    }

    async fn seed(db: &Database) -> i64 {
        let id = db
            .upsert_subject(&Subject::new("Physics", 4.0, vec![1, 2]))
            .await
            .unwrap();
        db.upsert_task(&task(id, "Lab report", 20, false)).await.unwrap();
        db.upsert_task(&task(id, "Reading", 10, false)).await.unwrap();
        db.upsert_task(&task(id, "Quiz prep", 5, true)).await.unwrap();
        db.insert_session(&session(id, 1, 3_600)).await.unwrap();
        db.insert_session(&session(id, 2, 1_800)).await.unwrap();
        db.insert_session(&session(id + 1, 3, 7_200)).await.unwrap();
        id
    }

    #[tokio::test]
    async fn loads_form_and_derived_values() {
        let (_dir, db) = temp_database();
        let id = seed(&db).await;

        let (vm, _snackbar) = SubjectViewModel::new(db, id).await.unwrap();
        vm.refresh().await.unwrap();
        let state = vm.state();

        assert_eq!(state.current_subject_id, Some(id));
        assert_eq!(state.subject_name, "Physics");
        assert_eq!(state.goal_study_hours, "4");
        assert_eq!(state.subject_card_colors, vec![1, 2]);
        assert_eq!(state.studied_hours, 1.5);
        assert_eq!(state.progress, 0.375);
        let upcoming: Vec<_> = state.upcoming_tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(upcoming, vec!["Reading", "Lab report"]);
        assert_eq!(state.completed_tasks.len(), 1);
        assert_eq!(state.recent_sessions.len(), 2);
        assert_eq!(state.recent_sessions[0].date, 2);
    }

    #[tokio::test]
    async fn missing_subject_gives_default_state() {
        let (_dir, db) = temp_database();
        let (vm, mut snackbar) = SubjectViewModel::new(db, 42).await.unwrap();
        vm.refresh().await.unwrap();

        assert_eq!(vm.state(), SubjectState::default());

        vm.on_event(SubjectEvent::DeleteSubject).await;
        assert_eq!(messages(&mut snackbar), vec!["No subject to delete"]);
    }

    #[tokio::test]
    async fn progress_follows_the_goal_field() {
        let (_dir, db) = temp_database();
        let id = seed(&db).await;
        let (vm, _snackbar) = SubjectViewModel::new(db, id).await.unwrap();
        vm.refresh().await.unwrap();

        vm.on_event(SubjectEvent::GoalStudyHoursChanged("1".into()))
            .await;
        vm.on_event(SubjectEvent::UpdateProgress).await;
        assert_eq!(vm.state().progress, 1.0);

        vm.on_event(SubjectEvent::GoalStudyHoursChanged("abc".into()))
            .await;
        vm.on_event(SubjectEvent::UpdateProgress).await;
        assert_eq!(vm.state().progress, 1.0);

        vm.on_event(SubjectEvent::GoalStudyHoursChanged("3".into()))
            .await;
        vm.on_event(SubjectEvent::UpdateProgress).await;
        assert_eq!(vm.state().progress, 0.5);
    }

    #[tokio::test]
    async fn update_validates_then_saves() {
        let (_dir, db) = temp_database();
        let id = seed(&db).await;
        let (vm, mut snackbar) = SubjectViewModel::new(db.clone(), id).await.unwrap();

        vm.on_event(SubjectEvent::GoalStudyHoursChanged("0".into()))
            .await;
        vm.on_event(SubjectEvent::UpdateSubject).await;
        assert_eq!(
            drain(&mut snackbar),
            vec![SnackBarEvent::ShowSnackBar {
                message: "Please set at least 1 hour".into(),
                duration: SnackBarDuration::Long,
            }]
        );

        vm.on_event(SubjectEvent::SubjectNameChanged("Astrophysics".into()))
            .await;
        vm.on_event(SubjectEvent::GoalStudyHoursChanged("25".into()))
            .await;
        vm.on_event(SubjectEvent::UpdateSubject).await;
        assert_eq!(messages(&mut snackbar), vec!["Subject updated successfully"]);

        let stored = db.get_subject(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Astrophysics");
        assert_eq!(stored.goal_hours, 25.0);
        assert_eq!(db.get_total_subject_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_and_navigates_up() {
        let (_dir, db) = temp_database();
        let id = seed(&db).await;
        let (vm, mut snackbar) = SubjectViewModel::new(db.clone(), id).await.unwrap();

        vm.on_event(SubjectEvent::DeleteSubject).await;

        assert_eq!(
            drain(&mut snackbar),
            vec![
                SnackBarEvent::ShowSnackBar {
                    message: "Subject deleted successfully".into(),
                    duration: SnackBarDuration::Short,
                },
                SnackBarEvent::NavigateUp,
            ]
        );
        assert!(db.get_subject(id).await.unwrap().is_none());
        assert!(db.get_tasks_for_subject(id).await.unwrap().is_empty());
        assert!(db.get_sessions_for_subject(id).await.unwrap().is_empty());
        // Other subjects' sessions are untouched.
        assert_eq!(db.get_all_sessions().await.unwrap().len(), 1);
        assert_eq!(vm.state().current_subject_id, None);
    }

    #[tokio::test]
    async fn toggling_moves_task_between_lists() {
        let (_dir, db) = temp_database();
        let id = seed(&db).await;
        let (vm, mut snackbar) = SubjectViewModel::new(db, id).await.unwrap();
        vm.refresh().await.unwrap();

        let done = vm.state().completed_tasks[0].clone();
        vm.on_event(SubjectEvent::ToggleTaskComplete(done)).await;
        vm.refresh().await.unwrap();

        let state = vm.state();
        assert!(state.completed_tasks.is_empty());
        assert_eq!(state.upcoming_tasks[0].title, "Quiz prep");
        assert_eq!(messages(&mut snackbar), vec!["Saved in upcoming tasks."]);
    }
}
