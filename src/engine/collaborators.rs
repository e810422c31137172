// ==========================================
// Roofline Engine - Collaborator Seams
// ==========================================
// The engine never touches SQL: all reads and writes go through
// these async traits, implemented by the rusqlite repositories and
// mocked in tests. Injection is explicit at construction time.
// ==========================================

use crate::domain::catalog::{Assembly, AssemblyMaterial, Material};
use crate::domain::estimate::{Estimate, EstimateFlag, EstimateItem};
use crate::domain::forecast::MaterialConstraint;
use crate::domain::installability::{DayInstallability, SchedulePlan};
use crate::domain::takeoff::TakeoffQuantity;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Read access to take-off measurements.
#[async_trait]
pub trait TakeoffReader: Send + Sync {
    async fn list_takeoffs(
        &self,
        tenant_id: &str,
        job_id: &str,
    ) -> RepositoryResult<Vec<TakeoffQuantity>>;
}

/// Batch read access to the assembly/material catalog.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn assemblies_by_ids(
        &self,
        tenant_id: &str,
        ids: &[String],
    ) -> RepositoryResult<Vec<Assembly>>;

    async fn assembly_materials_by_assembly_ids(
        &self,
        assembly_ids: &[String],
    ) -> RepositoryResult<Vec<AssemblyMaterial>>;

    async fn materials_by_ids(
        &self,
        tenant_id: &str,
        ids: &[String],
    ) -> RepositoryResult<Vec<Material>>;

    async fn constraints_by_material_ids(
        &self,
        material_ids: &[String],
    ) -> RepositoryResult<Vec<MaterialConstraint>>;
}

/// Estimate persistence. `replace_estimate` must be one logical
/// unit: header upsert plus wholesale item/flag replacement, atomic.
#[async_trait]
pub trait EstimateStore: Send + Sync {
    async fn find_by_job(&self, tenant_id: &str, job_id: &str)
        -> RepositoryResult<Option<Estimate>>;

    async fn replace_estimate(
        &self,
        estimate: &Estimate,
        items: &[EstimateItem],
        flags: &[EstimateFlag],
    ) -> RepositoryResult<()>;
}

/// Installability window + schedule plan persistence.
#[async_trait]
pub trait InstallabilityStore: Send + Sync {
    async fn replace_windows(
        &self,
        tenant_id: &str,
        job_id: &str,
        days: &[DayInstallability],
    ) -> RepositoryResult<()>;

    async fn upsert_schedule_plan(
        &self,
        tenant_id: &str,
        plan: &SchedulePlan,
    ) -> RepositoryResult<()>;
}

/// Everything the orchestrator needs to read and write, gathered
/// into one injectable struct.
#[derive(Clone)]
pub struct PlanStores {
    pub takeoffs: Arc<dyn TakeoffReader>,
    pub catalog: Arc<dyn CatalogReader>,
    pub estimates: Arc<dyn EstimateStore>,
    pub installability: Arc<dyn InstallabilityStore>,
}

impl PlanStores {
    pub fn new(
        takeoffs: Arc<dyn TakeoffReader>,
        catalog: Arc<dyn CatalogReader>,
        estimates: Arc<dyn EstimateStore>,
        installability: Arc<dyn InstallabilityStore>,
    ) -> Self {
        Self {
            takeoffs,
            catalog,
            estimates,
            installability,
        }
    }
}
