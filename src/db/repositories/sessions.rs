use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{to_i64, to_u64},
    models::Session,
};

const SESSION_COLUMNS: &str = "id, subject_id, related_to_subject, date, duration";

/// Newest first; rows saved in the same millisecond keep insertion order reversed.
const NEWEST_FIRST: &str = "ORDER BY date DESC, id DESC";

fn row_to_session(row: &Row) -> Result<Session> {
    let duration: i64 = row.get("duration")?;

    Ok(Session {
        id: row.get("id")?,
        subject_id: row.get("subject_id")?,
        related_to_subject: row.get("related_to_subject")?,
        date: row.get("date")?,
        duration: to_u64(duration, "duration")?,
    })
}

fn query_sessions(
    conn: &rusqlite::Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut sessions = Vec::new();
    while let Some(row) = rows.next()? {
        sessions.push(row_to_session(row)?);
    }
    Ok(sessions)
}

impl Database {
    pub async fn insert_session(&self, session: &Session) -> Result<i64> {
        let record = session.clone();
        self.execute_write(move |conn| {
            conn.execute(
                "INSERT INTO sessions (subject_id, related_to_subject, date, duration)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.subject_id,
                    record.related_to_subject,
                    record.date,
                    to_i64(record.duration)?,
                ],
            )
            .context("failed to insert session")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    pub async fn delete_session(&self, session_id: i64) -> Result<()> {
        self.execute_write(move |conn| {
            conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])
                .context("failed to delete session")?;
            Ok(())
        })
        .await
    }

    pub async fn delete_sessions_for_subject(&self, subject_id: i64) -> Result<()> {
        self.execute_write(move |conn| {
            conn.execute(
                "DELETE FROM sessions WHERE subject_id = ?1",
                params![subject_id],
            )
            .context("failed to delete sessions for subject")?;
            Ok(())
        })
        .await
    }

    pub async fn get_all_sessions(&self) -> Result<Vec<Session>> {
        self.execute(|conn| {
            query_sessions(
                conn,
                &format!("SELECT {SESSION_COLUMNS} FROM sessions {NEWEST_FIRST}"),
                [],
            )
        })
        .await
    }

    pub async fn get_sessions_for_subject(&self, subject_id: i64) -> Result<Vec<Session>> {
        self.execute(move |conn| {
            query_sessions(
                conn,
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions WHERE subject_id = ?1 {NEWEST_FIRST}"
                ),
                params![subject_id],
            )
        })
        .await
    }

    pub async fn get_recent_five_sessions(&self) -> Result<Vec<Session>> {
        self.execute(|conn| {
            query_sessions(
                conn,
                &format!("SELECT {SESSION_COLUMNS} FROM sessions {NEWEST_FIRST} LIMIT 5"),
                [],
            )
        })
        .await
    }

    pub async fn get_recent_ten_sessions_for_subject(
        &self,
        subject_id: i64,
    ) -> Result<Vec<Session>> {
        self.execute(move |conn| {
            query_sessions(
                conn,
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions WHERE subject_id = ?1 {NEWEST_FIRST} LIMIT 10"
                ),
                params![subject_id],
            )
        })
        .await
    }

    /// Sum of all session durations, in seconds.
    pub async fn get_total_sessions_duration(&self) -> Result<u64> {
        self.execute(|conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(duration), 0) FROM sessions",
                [],
                |row| row.get(0),
            )?;
            to_u64(total, "total duration")
        })
        .await
    }

    pub async fn get_total_sessions_duration_for_subject(&self, subject_id: i64) -> Result<u64> {
        self.execute(move |conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(duration), 0) FROM sessions WHERE subject_id = ?1",
                params![subject_id],
                |row| row.get(0),
            )?;
            to_u64(total, "total duration")
        })
        .await
    }
}
