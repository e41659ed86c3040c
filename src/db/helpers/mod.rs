use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

/// Colors are stored as a comma-separated list of ARGB integers in one column.
pub fn encode_colors(colors: &[i32]) -> String {
    colors
        .iter()
        .map(|color| color.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn decode_colors(value: &str) -> Result<Vec<i32>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }

    value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .with_context(|| format!("failed to parse color '{part}'"))
        })
        .collect()
}
