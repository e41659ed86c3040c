use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedSubject {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub duration_secs: u64,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub related_subject: Option<RelatedSubject>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            status: TimerStatus::Idle,
            duration_secs: 0,
            hours: pad(0),
            minutes: pad(0),
            seconds: pad(0),
            related_subject: None,
        }
    }
}

pub(crate) fn pad(value: u64) -> String {
    format!("{value:02}")
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `HH:MM:SS`; hours keep growing past 99.
    pub fn display(&self) -> String {
        format!("{}:{}:{}", self.hours, self.minutes, self.seconds)
    }

    pub fn begin(&mut self) {
        self.status = TimerStatus::Running;
    }

    /// One elapsed second.
    pub fn tick(&mut self) {
        self.duration_secs = self.duration_secs.saturating_add(1);
        self.update_time_units();
    }

    pub fn stop(&mut self) {
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Stopped;
        }
    }

    /// Back to zero. The related subject survives so the next session can
    /// start without picking it again.
    pub fn cancel(&mut self) {
        self.duration_secs = 0;
        self.update_time_units();
        self.status = TimerStatus::Idle;
    }

    fn update_time_units(&mut self) {
        let total = self.duration_secs;
        self.hours = pad(total / 3600);
        self.minutes = pad((total % 3600) / 60);
        self.seconds = pad(total % 60);
    }
}
