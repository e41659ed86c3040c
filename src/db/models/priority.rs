use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

const GREEN: i32 = 0xFF4C_AF50u32 as i32;
const ORANGE: i32 = 0xFFFF_9800u32 as i32;
const RED: i32 = 0xFFF4_4336u32 as i32;

/// Task priority. Stored as its integer value; unknown values decode to
/// [`Priority::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn title(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// ARGB display color.
    pub fn color(self) -> i32 {
        match self {
            Priority::Low => GREEN,
            Priority::Medium => ORANGE,
            Priority::High => RED,
        }
    }

    pub fn value(self) -> i32 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }

    pub fn from_int(value: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|priority| priority.value() == value)
            .unwrap_or(Priority::Medium)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|priority| {
                priority.title().eq_ignore_ascii_case(value)
                    || priority.value().to_string() == value
            })
            .ok_or_else(|| anyhow!("unknown priority '{value}' (expected low, medium or high)"))
    }
}
