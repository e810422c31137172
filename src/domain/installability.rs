// ==========================================
// Roofline Engine - Installability & Schedule Entities
// ==========================================
// Per-day feasibility windows and the greedy schedule plan built on
// top of them. Serialized field names are the stable wire shapes
// consumed by downstream systems.
// ==========================================

use crate::domain::types::{BlockerTag, FlagCode};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One contiguous feasible span within a day, half-open: each hourly
/// sample represents a full hour of coverage, so a window closing on
/// the last sample of a run ends one hour after it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeasibleWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub minutes: i64,
}

/// Per-day feasibility record; replaced wholesale per job on rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayInstallability {
    pub date: NaiveDate,
    /// Kept windows, non-overlapping and sorted by start time.
    pub windows: Vec<FeasibleWindow>,
    pub feasible: bool,
    /// Deduplicated non-gap blockers seen on the day's failing hours.
    pub limiting_factors: Vec<BlockerTag>,
}

impl DayInstallability {
    /// Sum of kept window durations for the day.
    pub fn total_window_minutes(&self) -> i64 {
        self.windows.iter().map(|w| w.minutes).sum()
    }

    /// Usable install hours for the day, rounded to 2 decimals.
    pub fn usable_hours(&self) -> f64 {
        (self.total_window_minutes() as f64 / 60.0 * 100.0).round() / 100.0
    }
}

/// Multi-day installability outcome for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallabilityResult {
    /// Days in ascending date order.
    pub windows: Vec<DayInstallability>,
    pub total_feasible_days: usize,
    /// Job-level advisory codes derived from the full range.
    pub flagged: Vec<FlagCode>,
}

impl InstallabilityResult {
    pub fn is_flagged(&self, code: FlagCode) -> bool {
        self.flagged.contains(&code)
    }
}

/// Suggested schedule for a job; at most one plan per job, upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePlan {
    pub job_id: String,
    pub suggested_start: NaiveDate,
    pub suggested_end: NaiveDate,
    /// 0..=1 blend of capacity fit, slack and forecast quality.
    pub confidence: f64,
    pub usable_hours_per_day: BTreeMap<NaiveDate, f64>,
    pub revenue_projection: BTreeMap<NaiveDate, f64>,
}
