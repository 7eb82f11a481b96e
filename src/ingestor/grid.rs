//! Dated grid responses: `{ "YYYY-MM-DD": [entry, ...] }`
//!
//! Only the dates in the requested window are read; anything filed under
//! another key is ignored.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{GridFields, RawProgramFields};
use crate::models::LooseValue;
use crate::utils::time::grid_date_key;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridEntry {
    #[serde(default)]
    start_time: Option<LooseValue>,
    #[serde(default)]
    end_time: Option<LooseValue>,
    #[serde(default)]
    program: Option<GridProgram>,
    #[serde(default)]
    rating: Option<LooseValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProgram {
    #[serde(default)]
    title: Option<LooseValue>,
    #[serde(default)]
    episode_title: Option<LooseValue>,
    #[serde(default)]
    short_desc: Option<LooseValue>,
    #[serde(default)]
    season: Option<LooseValue>,
    #[serde(default)]
    episode: Option<LooseValue>,
}

pub fn extract(document: &serde_json::Value, window: &[NaiveDate]) -> Vec<RawProgramFields> {
    let Some(by_date) = document.as_object() else {
        warn!("Grid response is not a JSON object, ignoring it");
        return Vec::new();
    };

    let mut programs = Vec::new();
    for date in window {
        let key = grid_date_key(*date);
        let Some(day) = by_date.get(&key) else {
            continue;
        };
        let Some(entries) = day.as_array() else {
            warn!("Grid entry for {} is not an array, skipping the day", key);
            continue;
        };

        let before = programs.len();
        for (idx, entry) in entries.iter().enumerate() {
            match entry_fields(entry) {
                Ok(fields) => programs.push(RawProgramFields::Grid(fields)),
                Err(reason) => warn!("Skipping grid item {} on {}: {}", idx, key, reason),
            }
        }
        debug!("Found {} grid items for {}", programs.len() - before, key);
    }

    programs
}

fn entry_fields(entry: &serde_json::Value) -> Result<GridFields, String> {
    let entry = GridEntry::deserialize(entry).map_err(|e| e.to_string())?;

    let start = epoch_seconds(entry.start_time.as_ref(), "startTime")?;
    let stop = epoch_seconds(entry.end_time.as_ref(), "endTime")?;
    let program = entry.program.unwrap_or_default();

    Ok(GridFields {
        start,
        stop,
        title: program.title.as_ref().and_then(LooseValue::as_text),
        episode_title: program.episode_title.as_ref().and_then(LooseValue::as_text),
        description: program.short_desc.as_ref().and_then(LooseValue::as_text),
        season: program.season,
        episode: program.episode,
        rating: entry.rating.as_ref().and_then(LooseValue::as_text),
    })
}

/// Absent is fine, present but not a whole number is not
fn epoch_seconds(value: Option<&LooseValue>, field: &str) -> Result<Option<i64>, String> {
    match value {
        None => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("{field} is not an epoch timestamp: {v:?}")),
    }
}
