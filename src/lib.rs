// ==========================================
// Roofline Engine - Core Library
// ==========================================
// Weather-constrained estimation and scheduling engine for exterior
// installation work: priced estimates from take-off quantities,
// hour-by-hour installability windows from material constraints and
// hourly forecasts, and a greedy schedule plan with a confidence
// score. Decision support: the plan is a suggestion, people commit.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and shared types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Configuration layer - tunable defaults and overrides
pub mod config;

// Database infrastructure (connection init / unified PRAGMAs)
pub mod db;

// Logging
pub mod logging;

// Weather adapter - external forecast providers
pub mod weather;

// ==========================================
// Core type re-exports
// ==========================================

// Domain types
pub use domain::types::{BlockerTag, EstimateStatus, FlagCode, FlagSeverity};

// Domain entities
pub use domain::{
    Assembly, AssemblyMaterial, DayInstallability, Estimate, EstimateFlag, EstimateItem,
    FeasibleWindow, HourlyForecastPoint, InstallabilityResult, Material, MaterialConstraint,
    NormalizedConstraints, SchedulePlan, TakeoffQuantity,
};

// Engines
pub use engine::{
    ConstraintNormalizer, EngineError, EngineResult, EstimateBuilder, FlagGenerator,
    HourEvaluator, JobPlanResult, PlanOrchestrator, PlanStores, SchedulePlanner, WindowBuilder,
};

// Weather contract
pub use weather::{ForecastRange, HttpWeatherProvider, SiteLocation, WeatherError, WeatherProvider};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "roofline-engine";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
