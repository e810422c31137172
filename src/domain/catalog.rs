// ==========================================
// Roofline Engine - Catalog Entities
// ==========================================
// Materials, buildable assemblies and the many-to-many bill of
// materials joining them. Mutated only by catalog administration,
// read-only to this engine.
// ==========================================

use serde::{Deserialize, Serialize};

/// Catalog material with unit cost and procurement lead time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    /// Purchasing unit (bundle, roll, each, ...).
    pub unit: String,
    pub unit_cost: f64,
    /// Days between ordering and delivery; drives LEAD_TIME_RISK.
    pub lead_time_days: i64,
}

/// A buildable system (e.g. "30-year architectural shingle roof").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub id: String,
    pub name: String,
    /// Base crew productivity in sqft per labor hour; None or
    /// non-positive falls back to the configured default.
    pub productivity_sqft_per_hr: Option<f64>,
    /// Default labor rate in $/hr; None falls back to the default.
    pub labor_rate_per_hr: Option<f64>,
    /// Equipment cost per square (100 sqft).
    pub equipment_cost_per_square: f64,
    /// Default overhead percentage for jobs built from this assembly.
    pub default_overhead_pct: Option<f64>,
    /// Default fee percentage for jobs built from this assembly.
    pub default_fee_pct: Option<f64>,
}

/// Bill-of-materials row: usage of one material within one assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyMaterial {
    pub assembly_id: String,
    pub material_id: String,
    /// Material units consumed per square (100 sqft) installed.
    pub usage_per_square: f64,
    /// Waste allowance percentage applied on top of nominal usage.
    pub waste_factor_pct: f64,
}
