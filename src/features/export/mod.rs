//! # Data Export Feature
//!
//! Last-30-days activity report as CSV: health check-ins, medicines marked
//! taken and daily hydration totals, oldest first.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.2.0
//! - **Toggleable**: false

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use log::info;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::features::store::CareState;

pub const CSV_HEADER: &str = "Date,Time,Type,Details,Notes";
pub const EXPORT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    HealthCheckIn,
    MedicationTaken,
    Hydration,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActivityKind::HealthCheckIn => "Health Check-in",
            ActivityKind::MedicationTaken => "Medication Taken",
            ActivityKind::Hydration => "Hydration",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub date: NaiveDate,
    /// None for whole-day rows
    pub time: Option<NaiveTime>,
    /// Time as shown in the file (`HH:MM:SS` for check-ins, `HH:MM` for medicines)
    pub time_label: String,
    pub kind: ActivityKind,
    pub details: String,
    pub notes: String,
}

impl ActivityRow {
    fn sort_key(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }

    fn cells(&self) -> [String; 5] {
        [
            self.date.format("%Y-%m-%d").to_string(),
            self.time_label.clone(),
            self.kind.to_string(),
            self.details.clone(),
            self.notes.clone(),
        ]
    }
}

/// Gather report rows from the last 30 days relative to `now`, in `now`'s time zone
pub fn collect_rows<Tz: TimeZone>(state: &CareState, now: &DateTime<Tz>) -> Vec<ActivityRow> {
    let zone = now.timezone();
    let cutoff = now.naive_local() - Duration::days(EXPORT_WINDOW_DAYS);
    let in_window = |date: NaiveDate| date.and_time(NaiveTime::MIN) >= cutoff;
    let mut rows = Vec::new();

    for entry in &state.health_log {
        let local = entry.timestamp.with_timezone(&zone).naive_local();
        if local < cutoff {
            continue;
        }
        rows.push(ActivityRow {
            date: local.date(),
            time: Some(local.time()),
            time_label: local.format("%H:%M:%S").to_string(),
            kind: ActivityKind::HealthCheckIn,
            details: entry.feeling.to_string(),
            notes: entry.note.clone().unwrap_or_default(),
        });
    }

    for (medicine_id, date) in &state.taken {
        if !in_window(*date) {
            continue;
        }
        // Medicines deleted since are skipped
        let Some(medicine) = state.medicines.iter().find(|m| &m.id == medicine_id) else {
            continue;
        };
        rows.push(ActivityRow {
            date: *date,
            time: Some(medicine.time.as_naive()),
            time_label: medicine.time.to_string(),
            kind: ActivityKind::MedicationTaken,
            details: medicine.name.clone(),
            notes: format!("Dosage: {}", medicine.dosage),
        });
    }

    for (date, count) in &state.hydration {
        if !in_window(*date) {
            continue;
        }
        rows.push(ActivityRow {
            date: *date,
            time: None,
            time_label: String::new(),
            kind: ActivityKind::Hydration,
            details: format!("{count} glasses"),
            notes: "Daily Total".to_string(),
        });
    }

    rows.sort_by_key(ActivityRow::sort_key);
    rows
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Render rows as CSV text. Every data cell is quoted.
pub fn render_csv(rows: &[ActivityRow]) -> String {
    let mut out = String::from(CSV_HEADER);
    for row in rows {
        out.push('\n');
        let cells: Vec<String> = row.cells().iter().map(|c| quote(c)).collect();
        out.push_str(&cells.join(","));
    }
    out
}

pub fn build_report<Tz: TimeZone>(state: &CareState, now: &DateTime<Tz>) -> String {
    render_csv(&collect_rows(state, now))
}

pub fn export_filename(today: NaiveDate) -> String {
    format!("MediMate_Export_{}.csv", today.format("%Y-%m-%d"))
}

/// Write the report into `dir` and return the file path
pub async fn write_report<Tz: TimeZone>(
    dir: &Path,
    state: &CareState,
    now: &DateTime<Tz>,
) -> Result<PathBuf> {
    let rows = collect_rows(state, now);
    let path = dir.join(export_filename(now.naive_local().date()));
    fs::write(&path, render_csv(&rows)).await?;
    info!("Exported {} row(s) to {}", rows.len(), path.display());
    Ok(path)
}
