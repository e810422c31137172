// ==========================================
// Roofline Engine - Take-off Entities
// ==========================================
// Measured quantities extracted from drawings/imagery by take-off
// processing (out of scope). Read-only input to the estimate builder.
// ==========================================

use serde::{Deserialize, Serialize};

/// One measured feature for a job, optionally mapped to an assembly.
///
/// Exactly one of `area_sqft`, `length_lf`, `count` is normally set;
/// the estimate builder resolves an effective square footage in that
/// order of preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeoffQuantity {
    pub id: String,
    pub job_id: String,
    /// Originating drawing layer, used in advisory messages.
    pub source_layer: Option<String>,
    /// Mapped assembly; None means the layer was not recognized.
    pub assembly_id: Option<String>,
    pub area_sqft: Option<f64>,
    pub length_lf: Option<f64>,
    pub count: Option<i64>,
}
