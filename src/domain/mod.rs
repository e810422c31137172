// ==========================================
// Roofline Engine - Domain Model Layer
// ==========================================
// Entities and shared types only: no data access, no engine rules.
// ==========================================

pub mod catalog;
pub mod estimate;
pub mod forecast;
pub mod installability;
pub mod money;
pub mod takeoff;
pub mod types;

pub use catalog::{Assembly, AssemblyMaterial, Material};
pub use estimate::{Estimate, EstimateFlag, EstimateItem};
pub use forecast::{HourEvaluation, HourlyForecastPoint, MaterialConstraint, NormalizedConstraints};
pub use installability::{DayInstallability, FeasibleWindow, InstallabilityResult, SchedulePlan};
pub use money::round2;
pub use takeoff::TakeoffQuantity;
pub use types::{BlockerTag, EstimateStatus, FlagCode, FlagSeverity};
