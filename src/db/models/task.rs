use serde::{Deserialize, Serialize};

use super::Priority;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub subject_id: i64,
    pub title: String,
    pub description: String,
    /// Epoch milliseconds.
    pub due_date: i64,
    pub priority: Priority,
    /// Name of the owning subject at the time the task was saved.
    pub related_to_subject: String,
    pub is_complete: bool,
}
