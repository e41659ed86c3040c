use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use log::{debug, info};
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use crate::{
    db::{Database, Session},
    notification::StatusNotifier,
};

use super::{state::RelatedSubject, TimerState, TimerStatus};

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub display: String,
}

impl From<&TimerState> for TimerSnapshot {
    fn from(state: &TimerState) -> Self {
        Self {
            display: state.display(),
            state: state.clone(),
        }
    }
}

/// Each tick adds one second to the duration, so the period is fixed.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Study-session stopwatch.
///
/// While running, a background task adds one second per tick and pushes the
/// new `HH:MM:SS` to the status notifier and to every [`TimerController::subscribe`]
/// receiver. Redundant start/stop/cancel calls are no-ops.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    log_every_tick: bool,
    notifier: Arc<dyn StatusNotifier>,
    snapshots: Arc<watch::Sender<TimerSnapshot>>,
}

impl TimerController {
    pub fn new(notifier: Arc<dyn StatusNotifier>, debug_mode: bool) -> Self {
        let state = TimerState::new();
        let (snapshots, _) = watch::channel(TimerSnapshot::from(&state));

        Self {
            state: Arc::new(Mutex::new(state)),
            ticker: Arc::new(Mutex::new(None)),
            log_every_tick: debug_mode,
            notifier,
            snapshots: Arc::new(snapshots),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from(&*self.state.lock().await)
    }

    pub async fn set_related_subject(&self, subject_id: i64, subject_name: impl Into<String>) {
        let snapshot = {
            let mut state = self.state.lock().await;
            state.related_subject = Some(RelatedSubject {
                id: subject_id,
                name: subject_name.into(),
            });
            TimerSnapshot::from(&*state)
        };
        self.snapshots.send_replace(snapshot);
    }

    pub async fn start(&self) -> TimerSnapshot {
        let snapshot = {
            let mut state = self.state.lock().await;
            if state.status == TimerStatus::Running {
                return TimerSnapshot::from(&*state);
            }
            state.begin();
            TimerSnapshot::from(&*state)
        };

        self.notifier.show(&snapshot.display);
        self.spawn_ticker().await;
        info!("Study timer started at {}", snapshot.display);

        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    pub async fn stop(&self) -> TimerSnapshot {
        self.cancel_ticker().await;

        let (snapshot, was_running) = {
            let mut state = self.state.lock().await;
            let was_running = state.status == TimerStatus::Running;
            state.stop();
            (TimerSnapshot::from(&*state), was_running)
        };

        if was_running {
            info!("Study timer stopped at {}", snapshot.display);
            self.snapshots.send_replace(snapshot.clone());
        }
        snapshot
    }

    pub async fn cancel(&self) -> TimerSnapshot {
        self.cancel_ticker().await;

        let snapshot = {
            let mut state = self.state.lock().await;
            state.cancel();
            TimerSnapshot::from(&*state)
        };

        self.notifier.dismiss();
        info!("Study timer cancelled");
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    /// Stops the timer, stores the elapsed time as a session for the related
    /// subject and resets the timer. On failure the stopped duration is kept
    /// so the user can retry.
    pub async fn finish_session(&self, db: &Database) -> Result<Session> {
        let snapshot = self.stop().await;

        let subject = snapshot
            .state
            .related_subject
            .clone()
            .ok_or_else(|| anyhow!("Please select a subject related to the session"))?;
        if snapshot.state.duration_secs == 0 {
            bail!("Nothing to save yet; start the timer first");
        }

        let mut session = Session {
            id: 0,
            subject_id: subject.id,
            related_to_subject: subject.name,
            date: Utc::now().timestamp_millis(),
            duration: snapshot.state.duration_secs,
        };
        session.id = db.insert_session(&session).await?;
        info!(
            "Saved {}s study session {} for subject {}",
            session.duration, session.id, session.subject_id
        );

        self.cancel().await;
        Ok(session)
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.cancel_token.cancel();
            previous.handle.abort();
        }

        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();
        let state = self.state.clone();
        let notifier = self.notifier.clone();
        let snapshots = self.snapshots.clone();
        let log_every_tick = self.log_every_tick;

        let handle = tokio::spawn(async move {
            // First tick lands one full interval after start.
            let mut interval = time::interval_at(time::Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let snapshot = {
                    let mut guard = state.lock().await;
                    if guard.status != TimerStatus::Running {
                        break;
                    }
                    guard.tick();
                    TimerSnapshot::from(&*guard)
                };

                notifier.update(&snapshot.display);
                if log_every_tick {
                    debug!("Timer tick {}", snapshot.display);
                }
                snapshots.send_replace(snapshot);
            }
        });

        *ticker_guard = Some(Ticker {
            handle,
            cancel_token,
        });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel_token.cancel();
            if let Err(err) = ticker.handle.await {
                if !err.is_cancelled() {
                    log::error!("Timer ticker task failed: {err}");
                }
            }
        }
    }
}
