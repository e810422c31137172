// ==========================================
// Roofline Engine - Forecast & Constraint Entities
// ==========================================
// Hourly weather samples, per-material install constraints and the
// strictest-wins aggregate policy derived from them.
// ==========================================

use crate::domain::types::BlockerTag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// HourlyForecastPoint - one weather sample
// ==========================================
// Produced by the weather collaborator. The engine re-sorts
// defensively, so producers may deliver points in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastPoint {
    /// Sample timestamp (UTC). Each sample represents a full hour of
    /// coverage starting at this instant.
    pub ts: DateTime<Utc>,
    /// Ambient temperature in degrees Fahrenheit.
    pub temp_f: f64,
    /// Sustained wind speed in miles per hour.
    pub wind_mph: f64,
    /// Precipitation probability, 0.0..=1.0.
    pub precip_prob: f64,
}

// ==========================================
// MaterialConstraint - per-material limits
// ==========================================
// One row per material, owned by the catalog. Nullable fields mean
// "no limit".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConstraint {
    pub material_id: String,
    /// Minimum install temperature (°F); None = no floor.
    pub min_temp_f: Option<f64>,
    /// Install only while ambient temperature is trending upward.
    pub requires_rising_temp: bool,
    /// Minimum contiguous install window in minutes; 0 = unspecified.
    pub min_window_minutes: i64,
    /// Maximum wind speed (mph); None = no ceiling.
    pub max_wind_mph: Option<f64>,
    /// Maximum precipitation probability (0..1); None = no ceiling.
    pub max_precip_prob: Option<f64>,
    pub notes: Option<String>,
}

// ==========================================
// NormalizedConstraints - strictest-wins policy
// ==========================================
// Ephemeral aggregate of all constraints relevant to one job.
// Recomputed per installability run, never persisted standalone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedConstraints {
    pub min_temp_f: Option<f64>,
    pub requires_rising_temp: bool,
    pub min_window_minutes: i64,
    pub max_wind_mph: Option<f64>,
    pub max_precip_prob: Option<f64>,
}

impl NormalizedConstraints {
    /// Fully permissive policy; the minimum-window default still
    /// applies because window merging needs a non-zero threshold.
    pub fn permissive(default_min_window_minutes: i64) -> Self {
        Self {
            min_temp_f: None,
            requires_rising_temp: false,
            min_window_minutes: default_min_window_minutes,
            max_wind_mph: None,
            max_precip_prob: None,
        }
    }
}

// ==========================================
// HourEvaluation - annotated forecast hour
// ==========================================
// One record per input hour; no hours are ever dropped during
// evaluation. `blockers` holds only disqualifying tags; the gap
// marker lives on its own field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourEvaluation {
    pub point: HourlyForecastPoint,
    /// Disqualifying constraint violations for this hour.
    pub blockers: Vec<BlockerTag>,
    /// Gap to the previous sample exceeded the gap threshold.
    pub forecast_gap: bool,
}

impl HourEvaluation {
    /// An hour is installable iff it carries no disqualifying blocker.
    pub fn meets_all(&self) -> bool {
        self.blockers.is_empty()
    }
}
