// ==========================================
// Roofline Engine - Repository Layer
// ==========================================
// Data access only: no business rules, no cost math, no interval
// algebra. All queries are tenant-scoped.
// ==========================================

pub mod catalog_repo;
pub mod error;
pub mod estimate_repo;
pub mod installability_repo;
pub mod takeoff_repo;

pub use catalog_repo::CatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use estimate_repo::EstimateRepository;
pub use installability_repo::InstallabilityRepository;
pub use takeoff_repo::TakeoffRepository;
