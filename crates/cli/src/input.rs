//! Reading a materialized record batch from a file or stdin.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::AsyncReadExt;

/// Read the raw batch text from `source` (`-` is stdin).
pub async fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("failed to read batch from stdin")?;
        return Ok(raw);
    }
    tokio::fs::read_to_string(Path::new(source))
        .await
        .with_context(|| format!("failed to read batch file '{source}'"))
}

/// Parse a JSON array, or one JSON object per non-blank line.
pub fn parse_values(raw: &str) -> Result<Vec<Value>> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("batch is not a valid JSON array");
    }
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}: invalid JSON", i + 1))
        })
        .collect()
}
