// ==========================================
// Roofline Engine - Domain Type Definitions
// ==========================================
// Shared enums for estimate lifecycle, advisory flags and
// per-hour weather blockers.
// Serialization: stable wire identifiers other systems key off of.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Estimate Status
// ==========================================
// Lifecycle of an estimate; rebuilds never change the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    Draft,
    InReview,
    Finalized,
    Submitted,
    Awarded,
    Lost,
}

impl fmt::Display for EstimateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl EstimateStatus {
    /// Parse a status from its database string.
    pub fn from_db_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "in_review" => EstimateStatus::InReview,
            "finalized" => EstimateStatus::Finalized,
            "submitted" => EstimateStatus::Submitted,
            "awarded" => EstimateStatus::Awarded,
            "lost" => EstimateStatus::Lost,
            _ => EstimateStatus::Draft,
        }
    }

    /// Database string representation.
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EstimateStatus::Draft => "draft",
            EstimateStatus::InReview => "in_review",
            EstimateStatus::Finalized => "finalized",
            EstimateStatus::Submitted => "submitted",
            EstimateStatus::Awarded => "awarded",
            EstimateStatus::Lost => "lost",
        }
    }
}

// ==========================================
// Flag Severity
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagSeverity {
    Info,
    Warn,
    Critical,
}

impl fmt::Display for FlagSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FlagSeverity {
    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "WARN" => FlagSeverity::Warn,
            "CRITICAL" => FlagSeverity::Critical,
            _ => FlagSeverity::Info,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            FlagSeverity::Info => "INFO",
            FlagSeverity::Warn => "WARN",
            FlagSeverity::Critical => "CRITICAL",
        }
    }
}

// ==========================================
// Flag Codes
// ==========================================
// Stable identifiers consumed by downstream systems; the set is
// append-only. MISSING_SPEC_SECTION is reserved and never emitted
// by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagCode {
    WeatherInfeasible,
    RisingWindowTooShort,
    LeadTimeRisk,
    MissingSpecSection,
    UnmappedLayers,
    ForecastDataGap,
    General,
}

impl fmt::Display for FlagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FlagCode {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "WEATHER_INFEASIBLE" => Some(FlagCode::WeatherInfeasible),
            "RISING_WINDOW_TOO_SHORT" => Some(FlagCode::RisingWindowTooShort),
            "LEAD_TIME_RISK" => Some(FlagCode::LeadTimeRisk),
            "MISSING_SPEC_SECTION" => Some(FlagCode::MissingSpecSection),
            "UNMAPPED_LAYERS" => Some(FlagCode::UnmappedLayers),
            "FORECAST_DATA_GAP" => Some(FlagCode::ForecastDataGap),
            "GENERAL" => Some(FlagCode::General),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            FlagCode::WeatherInfeasible => "WEATHER_INFEASIBLE",
            FlagCode::RisingWindowTooShort => "RISING_WINDOW_TOO_SHORT",
            FlagCode::LeadTimeRisk => "LEAD_TIME_RISK",
            FlagCode::MissingSpecSection => "MISSING_SPEC_SECTION",
            FlagCode::UnmappedLayers => "UNMAPPED_LAYERS",
            FlagCode::ForecastDataGap => "FORECAST_DATA_GAP",
            FlagCode::General => "GENERAL",
        }
    }
}

// ==========================================
// Blocker Tags
// ==========================================
// Constraint violations recorded per forecast hour. forecast_gap is
// a data-quality marker carried separately on the evaluation record:
// it never disqualifies an hour and never enters per-day limiting
// factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockerTag {
    Temperature,
    TemperatureRising,
    Wind,
    Precipitation,
    ForecastGap,
}

impl fmt::Display for BlockerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockerTag::Temperature => write!(f, "temperature"),
            BlockerTag::TemperatureRising => write!(f, "temperature_rising"),
            BlockerTag::Wind => write!(f, "wind"),
            BlockerTag::Precipitation => write!(f, "precipitation"),
            BlockerTag::ForecastGap => write!(f, "forecast_gap"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_status_round_trip() {
        for s in [
            EstimateStatus::Draft,
            EstimateStatus::InReview,
            EstimateStatus::Finalized,
            EstimateStatus::Submitted,
            EstimateStatus::Awarded,
            EstimateStatus::Lost,
        ] {
            assert_eq!(EstimateStatus::from_db_str(s.to_db_str()), s);
        }
    }

    #[test]
    fn test_flag_code_wire_identifiers() {
        assert_eq!(FlagCode::WeatherInfeasible.to_db_str(), "WEATHER_INFEASIBLE");
        assert_eq!(FlagCode::RisingWindowTooShort.to_db_str(), "RISING_WINDOW_TOO_SHORT");
        assert_eq!(FlagCode::UnmappedLayers.to_db_str(), "UNMAPPED_LAYERS");
        assert_eq!(FlagCode::ForecastDataGap.to_db_str(), "FORECAST_DATA_GAP");
        assert_eq!(FlagCode::from_db_str("LEAD_TIME_RISK"), Some(FlagCode::LeadTimeRisk));
        assert_eq!(FlagCode::from_db_str("nope"), None);
    }

    #[test]
    fn test_blocker_tag_serde_names() {
        let json = serde_json::to_string(&BlockerTag::TemperatureRising).unwrap();
        assert_eq!(json, "\"temperature_rising\"");
        let json = serde_json::to_string(&BlockerTag::ForecastGap).unwrap();
        assert_eq!(json, "\"forecast_gap\"");
    }
}
