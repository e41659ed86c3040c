use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info};
use rusqlite::Connection;
use tokio::sync::{oneshot, watch};

use super::migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
    /// Bumped after every successful write so observers can re-query.
    revision: watch::Sender<u64>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

/// Handle to the local study store.
///
/// A single SQLite connection lives on a dedicated worker thread; every
/// operation is shipped to it as a closure and the result comes back over a
/// oneshot channel, so callers never block their executor and writes are
/// serialized by construction. Clones share the same worker.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("studysmart-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        let (revision, _) = watch::channel(0);

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
                revision,
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Receiver that changes whenever a write lands in any table.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    /// Like [`Database::execute`], but publishes a new revision once the
    /// closure succeeds.
    pub async fn execute_write<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let value = self.execute(task).await?;
        self.inner.revision.send_modify(|revision| {
            *revision = revision.wrapping_add(1);
        });
        debug!("Store revision bumped to {}", self.revision());
        Ok(value)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;

    /// Opens a fresh database inside a temporary directory. The directory guard
    /// must outlive the handle.
    pub fn temp_database() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("studysmart.sqlite3")).unwrap();
        (dir, db)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::temp_database;

    #[tokio::test]
    async fn execute_runs_on_worker_thread() {
        let (_dir, db) = temp_database();
        let name = db
            .execute(|_conn| Ok(std::thread::current().name().map(str::to_owned)))
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("studysmart-db"));
    }

    #[tokio::test]
    async fn writes_bump_revision_and_reads_do_not() {
        let (_dir, db) = temp_database();
        let mut changes = db.subscribe();
        assert_eq!(db.revision(), 0);

        db.execute(|conn| {
            conn.query_row("SELECT COUNT(*) FROM subjects", [], |row| row.get::<_, i64>(0))
                .map_err(Into::into)
        })
        .await
        .unwrap();
        assert_eq!(db.revision(), 0);

        db.execute_write(|conn| {
            conn.execute(
                "INSERT INTO subjects (name, goal_hours, colors) VALUES ('Math', 10.0, '')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), 1);
    }

    #[tokio::test]
    async fn failed_write_does_not_bump_revision() {
        let (_dir, db) = temp_database();
        let result = db
            .execute_write(|conn| {
                conn.execute("INSERT INTO missing_table VALUES (1)", [])?;
                Ok(())
            })
            .await;
        assert!(result.is_err());
        assert_eq!(db.revision(), 0);
    }
}
