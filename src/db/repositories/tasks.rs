use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::{
    db::{
        connection::Database,
        models::{Priority, Task},
    },
    stats,
};

const TASK_COLUMNS: &str =
    "id, subject_id, title, description, due_date, priority, related_to_subject, is_complete";

fn row_to_task(row: &Row) -> Result<Task> {
    let priority: i32 = row.get("priority")?;

    Ok(Task {
        id: row.get("id")?,
        subject_id: row.get("subject_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        priority: Priority::from_int(priority),
        related_to_subject: row.get("related_to_subject")?,
        is_complete: row.get("is_complete")?,
    })
}

impl Database {
    pub async fn upsert_task(&self, task: &Task) -> Result<i64> {
        let record = task.clone();
        self.execute_write(move |conn| {
            if record.id == 0 {
                conn.execute(
                    "INSERT INTO tasks (subject_id, title, description, due_date, priority, related_to_subject, is_complete)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        record.subject_id,
                        record.title,
                        record.description,
                        record.due_date,
                        record.priority.value(),
                        record.related_to_subject,
                        record.is_complete,
                    ],
                )
                .context("failed to insert task")?;
                Ok(conn.last_insert_rowid())
            } else {
                conn.execute(
                    "INSERT INTO tasks (id, subject_id, title, description, due_date, priority, related_to_subject, is_complete)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(id) DO UPDATE SET
                         subject_id = excluded.subject_id,
                         title = excluded.title,
                         description = excluded.description,
                         due_date = excluded.due_date,
                         priority = excluded.priority,
                         related_to_subject = excluded.related_to_subject,
                         is_complete = excluded.is_complete",
                    params![
                        record.id,
                        record.subject_id,
                        record.title,
                        record.description,
                        record.due_date,
                        record.priority.value(),
                        record.related_to_subject,
                        record.is_complete,
                    ],
                )
                .context("failed to update task")?;
                Ok(record.id)
            }
        })
        .await
    }

    pub async fn delete_task(&self, task_id: i64) -> Result<()> {
        self.execute_write(move |conn| {
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])
                .context("failed to delete task")?;
            Ok(())
        })
        .await
    }

    pub async fn delete_tasks_for_subject(&self, subject_id: i64) -> Result<()> {
        self.execute_write(move |conn| {
            conn.execute("DELETE FROM tasks WHERE subject_id = ?1", params![subject_id])
                .context("failed to delete tasks for subject")?;
            Ok(())
        })
        .await
    }

    pub async fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 LIMIT 1"
            ))?;

            let task = stmt
                .query_row(params![task_id], |row| Ok(row_to_task(row)))
                .optional()?
                .transpose()?;
            Ok(task)
        })
        .await
    }

    pub async fn get_tasks_for_subject(&self, subject_id: i64) -> Result<Vec<Task>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE subject_id = ?1 ORDER BY id ASC"
            ))?;

            let mut rows = stmt.query(params![subject_id])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(row_to_task(row)?);
            }

            Ok(tasks)
        })
        .await
    }

    pub async fn get_all_tasks(&self) -> Result<Vec<Task>> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"))?;

            let mut rows = stmt.query([])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(row_to_task(row)?);
            }

            Ok(tasks)
        })
        .await
    }

    pub async fn get_all_upcoming_tasks(&self) -> Result<Vec<Task>> {
        Ok(stats::upcoming_tasks(self.get_all_tasks().await?))
    }

    pub async fn get_upcoming_tasks_for_subject(&self, subject_id: i64) -> Result<Vec<Task>> {
        Ok(stats::upcoming_tasks(
            self.get_tasks_for_subject(subject_id).await?,
        ))
    }

    pub async fn get_completed_tasks_for_subject(&self, subject_id: i64) -> Result<Vec<Task>> {
        Ok(stats::completed_tasks(
            self.get_tasks_for_subject(subject_id).await?,
        ))
    }
}
