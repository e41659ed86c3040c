//! The three control intents a session timer understands.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{TimerController, TimerSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerAction {
    Start,
    Stop,
    Cancel,
}

impl TimerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerAction::Start => "start",
            TimerAction::Stop => "stop",
            TimerAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for TimerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timer action '{0}' (expected start, stop or cancel)")]
pub struct TimerActionError(pub String);

impl FromStr for TimerAction {
    type Err = TimerActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(TimerAction::Start),
            "stop" => Ok(TimerAction::Stop),
            "cancel" => Ok(TimerAction::Cancel),
            other => Err(TimerActionError(other.to_string())),
        }
    }
}

impl TimerController {
    pub async fn handle_action(&self, action: TimerAction) -> TimerSnapshot {
        log::debug!("Timer action: {action}");
        match action {
            TimerAction::Start => self.start().await,
            TimerAction::Stop => self.stop().await,
            TimerAction::Cancel => self.cancel().await,
        }
    }
}
