use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{decode_colors, encode_colors},
    models::Subject,
};

fn row_to_subject(row: &Row) -> Result<Subject> {
    let colors: String = row.get("colors")?;
    let goal_hours: f64 = row.get("goal_hours")?;

    Ok(Subject {
        id: row.get("id")?,
        name: row.get("name")?,
        goal_hours: goal_hours as f32,
        colors: decode_colors(&colors)?,
    })
}

impl Database {
    /// Inserts the subject, or replaces the row with the same id. Returns the
    /// id of the stored row.
    pub async fn upsert_subject(&self, subject: &Subject) -> Result<i64> {
        let record = subject.clone();
        self.execute_write(move |conn| {
            let colors = encode_colors(&record.colors);
            if record.id == 0 {
                conn.execute(
                    "INSERT INTO subjects (name, goal_hours, colors) VALUES (?1, ?2, ?3)",
                    params![record.name, record.goal_hours as f64, colors],
                )
                .context("failed to insert subject")?;
                Ok(conn.last_insert_rowid())
            } else {
                conn.execute(
                    "INSERT INTO subjects (id, name, goal_hours, colors)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(id) DO UPDATE SET
                         name = excluded.name,
                         goal_hours = excluded.goal_hours,
                         colors = excluded.colors",
                    params![record.id, record.name, record.goal_hours as f64, colors],
                )
                .context("failed to update subject")?;
                Ok(record.id)
            }
        })
        .await
    }

    pub async fn get_subject(&self, subject_id: i64) -> Result<Option<Subject>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, goal_hours, colors FROM subjects WHERE id = ?1 LIMIT 1",
            )?;

            let subject = stmt
                .query_row(params![subject_id], |row| Ok(row_to_subject(row)))
                .optional()?
                .transpose()?;
            Ok(subject)
        })
        .await
    }

    /// Removes the subject row only. Tasks and sessions that point at it are
    /// left for the caller to clean up.
    pub async fn delete_subject(&self, subject_id: i64) -> Result<()> {
        self.execute_write(move |conn| {
            conn.execute("DELETE FROM subjects WHERE id = ?1", params![subject_id])
                .context("failed to delete subject")?;
            Ok(())
        })
        .await
    }

    pub async fn get_all_subjects(&self) -> Result<Vec<Subject>> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, goal_hours, colors FROM subjects ORDER BY id ASC")?;

            let mut rows = stmt.query([])?;
            let mut subjects = Vec::new();
            while let Some(row) = rows.next()? {
                subjects.push(row_to_subject(row)?);
            }

            Ok(subjects)
        })
        .await
    }

    pub async fn get_total_subject_count(&self) -> Result<i64> {
        self.execute(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM subjects", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
    }

    pub async fn get_total_goal_hours(&self) -> Result<f32> {
        self.execute(|conn| {
            let total: f64 = conn.query_row(
                "SELECT COALESCE(SUM(goal_hours), 0.0) FROM subjects",
                [],
                |row| row.get(0),
            )?;
            Ok(total as f32)
        })
        .await
    }
}
