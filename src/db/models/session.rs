use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub subject_id: i64,
    pub related_to_subject: String,
    /// Epoch milliseconds at which the session was saved.
    pub date: i64,
    /// Accumulated study time in seconds.
    pub duration: u64,
}
