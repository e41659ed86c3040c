use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    db::{Database, Session, Subject},
    timer::{TimerAction, TimerController, TimerSnapshot},
};

use super::{delete_pending_session, spawn_observer, SnackBar, SnackBarReceiver};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub subjects: Vec<Subject>,
    pub subject_id: Option<i64>,
    pub related_to_subject: Option<String>,
    /// Every stored session, newest first.
    pub sessions: Vec<Session>,
    pub session: Option<Session>,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    RelatedSubjectSelected(Subject),
    Timer(TimerAction),
    FinishSession,
    DeleteSessionClicked(Session),
    DeleteSession,
}

/// Study-session screen: picks the subject, drives the shared timer and
/// lists past sessions.
pub struct SessionViewModel {
    db: Database,
    timer: TimerController,
    state: watch::Sender<SessionState>,
    snackbar: SnackBar,
}

impl SessionViewModel {
    /// The subject already attached to a running timer is carried over.
    pub async fn new(db: Database, timer: TimerController) -> (Self, SnackBarReceiver) {
        let (snackbar, receiver) = SnackBar::channel();
        let related = timer.get_snapshot().await.state.related_subject;
        let (state, _) = watch::channel(SessionState {
            subject_id: related.as_ref().map(|subject| subject.id),
            related_to_subject: related.map(|subject| subject.name),
            ..SessionState::default()
        });

        (
            Self {
                db,
                timer,
                state,
                snackbar,
            },
            receiver,
        )
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Elapsed-time updates from the shared timer.
    pub fn timer(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer.subscribe()
    }

    pub async fn refresh(&self) -> Result<()> {
        let subjects = self.db.get_all_subjects().await?;
        let sessions = self.db.get_all_sessions().await?;
        self.state.send_modify(|state| {
            state.subjects = subjects;
            state.sessions = sessions;
        });
        Ok(())
    }

    pub fn observe(self: &Arc<Self>) -> JoinHandle<()> {
        let vm = Arc::clone(self);
        spawn_observer(&self.db, "session", move || {
            let vm = Arc::clone(&vm);
            async move { vm.refresh().await }
        })
    }

    pub async fn on_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::RelatedSubjectSelected(subject) => {
                self.timer
                    .set_related_subject(subject.id, subject.name.clone())
                    .await;
                self.state.send_modify(|state| {
                    state.subject_id = Some(subject.id);
                    state.related_to_subject = Some(subject.name);
                });
            }
            SessionEvent::Timer(action) => {
                self.timer.handle_action(action).await;
            }
            SessionEvent::FinishSession => self.finish_session().await,
            SessionEvent::DeleteSessionClicked(session) => {
                self.state.send_modify(|state| state.session = Some(session));
            }
            SessionEvent::DeleteSession => {
                if delete_pending_session(&self.db, &self.snackbar, self.state().session).await {
                    self.state.send_modify(|state| state.session = None);
                }
            }
        }
    }

    async fn finish_session(&self) {
        match self.timer.finish_session(&self.db).await {
            Ok(session) => {
                info!("Session {} saved from the session screen", session.id);
                self.snackbar.show("Saved study session");
            }
            Err(err) => {
                error!("Failed to save session: {err:#}");
                self.snackbar
                    .show_long(format!("Couldn't save session. {err}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        db::connection::test_support::temp_database,
        notification::test_support::RecordingNotifier,
        timer::TimerStatus,
        viewmodel::test_support::messages,
    };
    use pretty_assertions::assert_eq;
    use tokio::time;

    fn timer() -> TimerController {
        TimerController::new(Arc::new(RecordingNotifier::default()), false)
    }

    #[tokio::test(start_paused = true)]
    async fn tracks_and_saves_a_session() {
        let (_dir, db) = temp_database();
        let id = db
            .upsert_subject(&Subject::new("Latin", 6.0, vec![]))
            .await
            .unwrap();
        let subject = db.get_subject(id).await.unwrap().unwrap();
        let (vm, mut snackbar) = SessionViewModel::new(db.clone(), timer()).await;

        vm.on_event(SessionEvent::RelatedSubjectSelected(subject)).await;
        vm.on_event(SessionEvent::Timer(TimerAction::Start)).await;
        time::sleep(Duration::from_millis(4_500)).await;
        vm.on_event(SessionEvent::Timer(TimerAction::Stop)).await;
        assert_eq!(vm.timer().borrow().display, "00:00:04");

        vm.on_event(SessionEvent::FinishSession).await;
        assert_eq!(messages(&mut snackbar), vec!["Saved study session"]);

        vm.refresh().await.unwrap();
        let state = vm.state();
        assert_eq!(state.related_to_subject.as_deref(), Some("Latin"));
        assert_eq!(state.sessions.len(), 1);
        assert_eq!(state.sessions[0].duration, 4);
        assert_eq!(state.sessions[0].subject_id, id);
        assert_eq!(vm.timer().borrow().state.status, TimerStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn finish_without_subject_reports_error() {
        let (_dir, db) = temp_database();
        let (vm, mut snackbar) = SessionViewModel::new(db.clone(), timer()).await;

        vm.on_event(SessionEvent::Timer(TimerAction::Start)).await;
        time::sleep(Duration::from_millis(1_500)).await;
        vm.on_event(SessionEvent::FinishSession).await;

        let messages = messages(&mut snackbar);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Couldn't save session."));
        assert!(db.get_all_sessions().await.unwrap().is_empty());
        vm.on_event(SessionEvent::Timer(TimerAction::Cancel)).await;
    }

    #[tokio::test]
    async fn picks_up_subject_from_shared_timer() {
        let (_dir, db) = temp_database();
        let shared = timer();
        shared.set_related_subject(3, "Greek").await;

        let (vm, _snackbar) = SessionViewModel::new(db, shared).await;
        let state = vm.state();
        assert_eq!(state.subject_id, Some(3));
        assert_eq!(state.related_to_subject.as_deref(), Some("Greek"));
    }

    #[tokio::test]
    async fn deletes_the_picked_session() {
        let (_dir, db) = temp_database();
        let mut session = Session {
            id: 0,
            subject_id: 1,
            related_to_subject: "Latin".into(),
            date: 10,
            duration: 30,
        };
        session.id = db.insert_session(&session).await.unwrap();
        let (vm, mut snackbar) = SessionViewModel::new(db.clone(), timer()).await;

        vm.on_event(SessionEvent::DeleteSessionClicked(session)).await;
        vm.on_event(SessionEvent::DeleteSession).await;

        assert!(db.get_all_sessions().await.unwrap().is_empty());
        assert_eq!(messages(&mut snackbar), vec!["Session deleted successfully"]);
    }
}
