// ==========================================
// Roofline Engine - Engine Layer
// ==========================================
// Business rules only: the engines never assemble SQL, all reads and
// writes go through the collaborator seams. Every rule that rejects
// an hour or discards a window records why.
// ==========================================

pub mod collaborators;
pub mod constraint_normalizer;
pub mod error;
pub mod estimate_builder;
pub mod flag_generator;
pub mod hour_evaluator;
pub mod orchestrator;
pub mod schedule_planner;
pub mod window_builder;

pub use collaborators::{
    CatalogReader, EstimateStore, InstallabilityStore, PlanStores, TakeoffReader,
};
pub use constraint_normalizer::ConstraintNormalizer;
pub use error::{EngineError, EngineResult};
pub use estimate_builder::{EstimateBuildResult, EstimateBuilder};
pub use flag_generator::FlagGenerator;
pub use hour_evaluator::HourEvaluator;
pub use orchestrator::{JobPlanResult, PlanOrchestrator};
pub use schedule_planner::SchedulePlanner;
pub use window_builder::WindowBuilder;
