// ==========================================
// Roofline Engine - Estimate Entities
// ==========================================
// Priced estimate, its line items and advisory flags. Exactly one
// current estimate exists per job; rebuilding replaces items and
// flags wholesale instead of creating duplicates.
// ==========================================

use crate::domain::types::{EstimateStatus, FlagCode, FlagSeverity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Priced estimate header for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub id: String,
    pub tenant_id: String,
    pub job_id: String,
    pub status: EstimateStatus,
    /// Direct cost plus profit, rounded to cents.
    pub subtotal: f64,
    pub overhead: f64,
    pub fee: f64,
    /// subtotal + overhead + fee, rounded to cents.
    pub total: f64,
    pub total_labor_hours: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line item per resolved assembly; fully replaced on rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateItem {
    pub id: String,
    pub estimate_id: String,
    pub assembly_id: String,
    pub assembly_name: String,
    /// Quantity in squares (100 sqft).
    pub quantity_squares: f64,
    pub material_cost: f64,
    pub labor_cost: f64,
    pub equipment_cost: f64,
    /// material + labor + equipment, rounded to cents.
    pub extended_cost: f64,
}

/// Advisory flag attached to an estimate; replaced wholesale on rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateFlag {
    pub id: String,
    pub estimate_id: String,
    pub severity: FlagSeverity,
    pub code: FlagCode,
    pub message: String,
}
