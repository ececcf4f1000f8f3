use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::ScanKind;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_kind(value: &str) -> Result<ScanKind> {
    match value {
        "URL" => Ok(ScanKind::Url),
        "WIFI" => Ok(ScanKind::Wifi),
        "TEXT" => Ok(ScanKind::Text),
        other => Err(anyhow!("unknown scan kind {other}")),
    }
}
