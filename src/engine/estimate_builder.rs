// ==========================================
// Roofline Engine - Estimate Builder
// ==========================================
// Resolves a job's take-off quantities against the assembly catalog
// and produces the priced estimate: per-assembly line items, labor
// hours, overhead/fee/profit totals and advisory flags. Catalog and
// take-off reads fan out concurrently and join before any cost
// aggregation starts; persistence is one wholesale replace.
// ==========================================

use crate::config::EngineConfig;
use crate::domain::catalog::{Assembly, AssemblyMaterial, Material};
use crate::domain::estimate::{Estimate, EstimateFlag, EstimateItem};
use crate::domain::money::round2;
use crate::domain::takeoff::TakeoffQuantity;
use crate::domain::types::{EstimateStatus, FlagCode, FlagSeverity};
use crate::engine::collaborators::{CatalogReader, EstimateStore, TakeoffReader};
use crate::engine::error::{EngineError, EngineResult};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of one estimate rebuild, already persisted.
#[derive(Debug, Clone)]
pub struct EstimateBuildResult {
    pub estimate: Estimate,
    pub items: Vec<EstimateItem>,
    pub flags: Vec<EstimateFlag>,
    /// Take-off quantities that resolved to no catalog assembly.
    pub unmapped_count: usize,
    /// Longest material lead time seen on the job, in days.
    pub max_lead_time_days: i64,
    /// Distinct materials on the job's bills of materials, for
    /// downstream constraint resolution. Sorted.
    pub material_ids: Vec<String>,
}

// ==========================================
// Per-assembly accumulator
// ==========================================
// Explicit fold target keyed by assembly id; avoids incidental
// mutation through ad-hoc maps.
struct AssemblyRollup {
    total_sqft: f64,
}

// ==========================================
// EstimateBuilder
// ==========================================
pub struct EstimateBuilder {
    config: EngineConfig,
    takeoffs: Arc<dyn TakeoffReader>,
    catalog: Arc<dyn CatalogReader>,
    estimates: Arc<dyn EstimateStore>,
}

impl EstimateBuilder {
    pub fn new(
        config: EngineConfig,
        takeoffs: Arc<dyn TakeoffReader>,
        catalog: Arc<dyn CatalogReader>,
        estimates: Arc<dyn EstimateStore>,
    ) -> Self {
        Self {
            config,
            takeoffs,
            catalog,
            estimates,
        }
    }

    /// Rebuild the job's estimate from its current take-off
    /// quantities and persist it (header upsert, items and flags
    /// replaced wholesale).
    ///
    /// # Rules
    /// 1. no take-off rows at all is a hard error
    /// 2. quantities without a resolvable assembly are excluded from
    ///    costing but counted; zero resolvable assemblies is a hard
    ///    error
    /// 3. effective sqft per quantity: area, else linear feet, else
    ///    count x configured proxy, else zero
    /// 4. every currency value is rounded to cents where computed,
    ///    not only at final output
    pub async fn build(&self, tenant_id: &str, job_id: &str) -> EngineResult<EstimateBuildResult> {
        let quantities = self.takeoffs.list_takeoffs(tenant_id, job_id).await?;
        if quantities.is_empty() {
            return Err(EngineError::NoTakeoffData {
                job_id: job_id.to_string(),
            });
        }

        let (rollups, mut unmapped_count) = self.roll_up_quantities(&quantities);
        let assembly_ids: Vec<String> = rollups.keys().cloned().collect();

        // Assemblies and their bills of materials are independent
        // reads; fetch both before aggregation begins.
        let (assemblies, bom_rows) = tokio::try_join!(
            self.catalog.assemblies_by_ids(tenant_id, &assembly_ids),
            self.catalog.assembly_materials_by_assembly_ids(&assembly_ids),
        )?;

        let assembly_index: HashMap<&str, &Assembly> =
            assemblies.iter().map(|a| (a.id.as_str(), a)).collect();

        // A take-off can reference an assembly id the catalog no
        // longer has; treat those quantities as unmapped too.
        let mut resolved: Vec<(&Assembly, f64)> = Vec::new();
        for (assembly_id, rollup) in &rollups {
            match assembly_index.get(assembly_id.as_str()) {
                Some(assembly) => resolved.push((assembly, rollup.total_sqft)),
                None => {
                    debug!(assembly_id, "take-off references unknown assembly");
                    unmapped_count += quantities
                        .iter()
                        .filter(|q| q.assembly_id.as_deref() == Some(assembly_id.as_str()))
                        .count();
                }
            }
        }
        if resolved.is_empty() {
            return Err(EngineError::NoMappedAssemblies {
                job_id: job_id.to_string(),
            });
        }

        let mut material_ids: Vec<String> = bom_rows.iter().map(|b| b.material_id.clone()).collect();
        material_ids.sort();
        material_ids.dedup();
        let materials = self.catalog.materials_by_ids(tenant_id, &material_ids).await?;
        let material_index: HashMap<&str, &Material> =
            materials.iter().map(|m| (m.id.as_str(), m)).collect();

        let mut boms_by_assembly: HashMap<&str, Vec<&AssemblyMaterial>> = HashMap::new();
        for row in &bom_rows {
            boms_by_assembly
                .entry(row.assembly_id.as_str())
                .or_default()
                .push(row);
        }

        // ---------- cost aggregation ----------
        let mut items = Vec::with_capacity(resolved.len());
        let mut total_material = 0.0;
        let mut total_labor = 0.0;
        let mut total_equipment = 0.0;
        let mut total_labor_hours = 0.0;
        let mut max_lead_time_days = 0i64;

        let existing = self.estimates.find_by_job(tenant_id, job_id).await?;
        let estimate_id = existing
            .as_ref()
            .map(|e| e.id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        for (assembly, sqft) in &resolved {
            let squares = round2(sqft / 100.0);

            let mut material_cost = 0.0;
            for bom in boms_by_assembly.get(assembly.id.as_str()).into_iter().flatten() {
                let Some(material) = material_index.get(bom.material_id.as_str()) else {
                    debug!(
                        material_id = bom.material_id.as_str(),
                        "bill of materials references unknown material"
                    );
                    continue;
                };
                let quantity =
                    bom.usage_per_square * squares * (1.0 + bom.waste_factor_pct / 100.0);
                material_cost = round2(material_cost + round2(quantity * material.unit_cost));
                max_lead_time_days = max_lead_time_days.max(material.lead_time_days);
            }

            let productivity = assembly
                .productivity_sqft_per_hr
                .filter(|p| *p > 0.0)
                .unwrap_or(self.config.default_productivity_sqft_per_hr);
            let labor_rate = assembly
                .labor_rate_per_hr
                .filter(|r| *r > 0.0)
                .unwrap_or(self.config.default_labor_rate_per_hr);
            let labor_hours = round2(sqft / productivity);
            let labor_cost = round2(labor_hours * labor_rate);
            let equipment_cost = round2(assembly.equipment_cost_per_square * squares);
            let extended_cost = round2(material_cost + labor_cost + equipment_cost);

            total_material = round2(total_material + material_cost);
            total_labor = round2(total_labor + labor_cost);
            total_equipment = round2(total_equipment + equipment_cost);
            total_labor_hours = round2(total_labor_hours + labor_hours);

            items.push(EstimateItem {
                id: Uuid::new_v4().to_string(),
                estimate_id: estimate_id.clone(),
                assembly_id: assembly.id.clone(),
                assembly_name: assembly.name.clone(),
                quantity_squares: squares,
                material_cost,
                labor_cost,
                equipment_cost,
                extended_cost,
            });
        }

        // ---------- totals ----------
        let direct_cost = round2(total_material + total_labor + total_equipment);
        let profit = round2(direct_cost * self.config.default_profit_margin_pct / 100.0);
        let overhead_pct = Self::markup_pct(
            resolved.iter().map(|(a, _)| a.default_overhead_pct),
            self.config.default_overhead_pct,
        );
        let fee_pct = Self::markup_pct(
            resolved.iter().map(|(a, _)| a.default_fee_pct),
            self.config.default_fee_pct,
        );
        let overhead = round2(direct_cost * overhead_pct / 100.0);
        let fee = round2(direct_cost * fee_pct / 100.0);
        let subtotal = round2(direct_cost + profit);
        let total = round2(subtotal + overhead + fee);

        let now = Utc::now();
        let estimate = Estimate {
            id: estimate_id.clone(),
            tenant_id: tenant_id.to_string(),
            job_id: job_id.to_string(),
            status: existing
                .as_ref()
                .map(|e| e.status)
                .unwrap_or(EstimateStatus::Draft),
            subtotal,
            overhead,
            fee,
            total,
            total_labor_hours,
            created_at: existing.as_ref().map(|e| e.created_at).unwrap_or(now),
            updated_at: now,
        };

        let flags = self.build_flags(&estimate_id, unmapped_count, max_lead_time_days);

        self.estimates
            .replace_estimate(&estimate, &items, &flags)
            .await?;

        info!(
            tenant_id,
            job_id,
            items = items.len(),
            total = estimate.total,
            labor_hours = estimate.total_labor_hours,
            unmapped_count,
            "estimate rebuilt"
        );

        Ok(EstimateBuildResult {
            estimate,
            items,
            flags,
            unmapped_count,
            max_lead_time_days,
            material_ids,
        })
    }

    /// Fold take-off quantities into per-assembly square footage.
    /// Returns the rollups and the count of quantities carrying no
    /// assembly mapping at all.
    fn roll_up_quantities(
        &self,
        quantities: &[TakeoffQuantity],
    ) -> (BTreeMap<String, AssemblyRollup>, usize) {
        let mut rollups: BTreeMap<String, AssemblyRollup> = BTreeMap::new();
        let mut unmapped = 0usize;

        for quantity in quantities {
            let Some(assembly_id) = &quantity.assembly_id else {
                unmapped += 1;
                continue;
            };
            let sqft = self.effective_sqft(quantity);
            rollups
                .entry(assembly_id.clone())
                .and_modify(|r| r.total_sqft += sqft)
                .or_insert(AssemblyRollup { total_sqft: sqft });
        }

        (rollups, unmapped)
    }

    /// Area is authoritative; linear feet stand in for it when area
    /// was never measured; counted features fall back to a coarse
    /// per-feature proxy.
    fn effective_sqft(&self, quantity: &TakeoffQuantity) -> f64 {
        if let Some(area) = quantity.area_sqft {
            area
        } else if let Some(length) = quantity.length_lf {
            length
        } else if let Some(count) = quantity.count {
            count as f64 * self.config.count_sqft_proxy
        } else {
            0.0
        }
    }

    /// Strictest (largest) assembly-declared markup wins; the
    /// configured default applies when no assembly declares one.
    fn markup_pct(declared: impl Iterator<Item = Option<f64>>, default_pct: f64) -> f64 {
        declared
            .flatten()
            .fold(None::<f64>, |acc, pct| {
                Some(acc.map_or(pct, |current| current.max(pct)))
            })
            .unwrap_or(default_pct)
    }

    fn build_flags(
        &self,
        estimate_id: &str,
        unmapped_count: usize,
        max_lead_time_days: i64,
    ) -> Vec<EstimateFlag> {
        let mut flags = Vec::new();

        if unmapped_count > 0 {
            flags.push(EstimateFlag {
                id: Uuid::new_v4().to_string(),
                estimate_id: estimate_id.to_string(),
                severity: FlagSeverity::Warn,
                code: FlagCode::UnmappedLayers,
                message: format!(
                    "{unmapped_count} take-off quantities are not mapped to a catalog assembly"
                ),
            });
        }

        if max_lead_time_days > self.config.lead_time_risk_days {
            flags.push(EstimateFlag {
                id: Uuid::new_v4().to_string(),
                estimate_id: estimate_id.to_string(),
                severity: FlagSeverity::Warn,
                code: FlagCode::LeadTimeRisk,
                message: format!(
                    "longest material lead time is {max_lead_time_days} days (threshold {})",
                    self.config.lead_time_risk_days
                ),
            });
        }

        if flags.is_empty() {
            flags.push(EstimateFlag {
                id: Uuid::new_v4().to_string(),
                estimate_id: estimate_id.to_string(),
                severity: FlagSeverity::Info,
                code: FlagCode::General,
                message: "estimate computed with no data-quality advisories".to_string(),
            });
        }

        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::error::RepositoryResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ==========================================
    // In-memory collaborators
    // ==========================================

    struct FixedTakeoffs(Vec<TakeoffQuantity>);

    #[async_trait]
    impl TakeoffReader for FixedTakeoffs {
        async fn list_takeoffs(
            &self,
            _tenant_id: &str,
            _job_id: &str,
        ) -> RepositoryResult<Vec<TakeoffQuantity>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct FixedCatalog {
        assemblies: Vec<Assembly>,
        bom_rows: Vec<AssemblyMaterial>,
        materials: Vec<Material>,
    }

    #[async_trait]
    impl CatalogReader for FixedCatalog {
        async fn assemblies_by_ids(
            &self,
            _tenant_id: &str,
            ids: &[String],
        ) -> RepositoryResult<Vec<Assembly>> {
            Ok(self
                .assemblies
                .iter()
                .filter(|a| ids.contains(&a.id))
                .cloned()
                .collect())
        }

        async fn assembly_materials_by_assembly_ids(
            &self,
            assembly_ids: &[String],
        ) -> RepositoryResult<Vec<AssemblyMaterial>> {
            Ok(self
                .bom_rows
                .iter()
                .filter(|b| assembly_ids.contains(&b.assembly_id))
                .cloned()
                .collect())
        }

        async fn materials_by_ids(
            &self,
            _tenant_id: &str,
            ids: &[String],
        ) -> RepositoryResult<Vec<Material>> {
            Ok(self
                .materials
                .iter()
                .filter(|m| ids.contains(&m.id))
                .cloned()
                .collect())
        }

        async fn constraints_by_material_ids(
            &self,
            _material_ids: &[String],
        ) -> RepositoryResult<Vec<crate::domain::forecast::MaterialConstraint>> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct RecordingEstimateStore {
        existing: Mutex<Option<Estimate>>,
        replaced: Mutex<Option<(Estimate, Vec<EstimateItem>, Vec<EstimateFlag>)>>,
    }

    #[async_trait]
    impl EstimateStore for RecordingEstimateStore {
        async fn find_by_job(
            &self,
            _tenant_id: &str,
            _job_id: &str,
        ) -> RepositoryResult<Option<Estimate>> {
            Ok(self.existing.lock().unwrap().clone())
        }

        async fn replace_estimate(
            &self,
            estimate: &Estimate,
            items: &[EstimateItem],
            flags: &[EstimateFlag],
        ) -> RepositoryResult<()> {
            *self.replaced.lock().unwrap() =
                Some((estimate.clone(), items.to_vec(), flags.to_vec()));
            Ok(())
        }
    }

    // ==========================================
    // Fixtures
    // ==========================================

    fn takeoff(assembly_id: Option<&str>, area_sqft: Option<f64>) -> TakeoffQuantity {
        TakeoffQuantity {
            id: Uuid::new_v4().to_string(),
            job_id: "job-1".to_string(),
            source_layer: Some("ROOF_PLAN".to_string()),
            assembly_id: assembly_id.map(str::to_string),
            area_sqft,
            length_lf: None,
            count: None,
        }
    }

    fn assembly(id: &str, productivity: Option<f64>, labor_rate: Option<f64>) -> Assembly {
        Assembly {
            id: id.to_string(),
            name: format!("Assembly {id}"),
            productivity_sqft_per_hr: productivity,
            labor_rate_per_hr: labor_rate,
            equipment_cost_per_square: 0.0,
            default_overhead_pct: None,
            default_fee_pct: None,
        }
    }

    fn material(id: &str, unit_cost: f64, lead_time_days: i64) -> Material {
        Material {
            id: id.to_string(),
            name: format!("Material {id}"),
            unit: "bundle".to_string(),
            unit_cost,
            lead_time_days,
        }
    }

    fn builder(
        takeoffs: Vec<TakeoffQuantity>,
        catalog: FixedCatalog,
    ) -> (EstimateBuilder, Arc<RecordingEstimateStore>) {
        let store = Arc::new(RecordingEstimateStore::default());
        let builder = EstimateBuilder::new(
            EngineConfig::default(),
            Arc::new(FixedTakeoffs(takeoffs)),
            Arc::new(catalog),
            store.clone(),
        );
        (builder, store)
    }

    // ==========================================
    // Costing (Scenario D)
    // ==========================================

    #[tokio::test]
    async fn test_single_assembly_costing() {
        // 1000 sqft at 50 sqft/hr and $60/hr; one material at 3
        // units/square, $10/unit, 10% waste.
        let catalog = FixedCatalog {
            assemblies: vec![assembly("a1", Some(50.0), Some(60.0))],
            bom_rows: vec![AssemblyMaterial {
                assembly_id: "a1".to_string(),
                material_id: "m1".to_string(),
                usage_per_square: 3.0,
                waste_factor_pct: 10.0,
            }],
            materials: vec![material("m1", 10.0, 7)],
        };
        let (builder, store) = builder(vec![takeoff(Some("a1"), Some(1000.0))], catalog);

        let result = builder.build("t1", "job-1").await.unwrap();

        assert_eq!(result.items.len(), 1);
        let item = &result.items[0];
        assert_eq!(item.quantity_squares, 10.0);
        assert_eq!(item.material_cost, 330.0);
        assert_eq!(item.labor_cost, 1200.0);
        assert_eq!(result.estimate.total_labor_hours, 20.0);

        // direct 1530, profit 10% = 153, overhead 10% = 153, fee 5% = 76.5
        assert_eq!(result.estimate.subtotal, 1683.0);
        assert_eq!(result.estimate.overhead, 153.0);
        assert_eq!(result.estimate.fee, 76.5);
        assert_eq!(result.estimate.total, 1912.5);

        // Persisted exactly what was returned.
        let (stored, items, flags) = store.replaced.lock().unwrap().clone().unwrap();
        assert_eq!(stored, result.estimate);
        assert_eq!(items, result.items);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].code, FlagCode::General);
    }

    #[tokio::test]
    async fn test_defaults_apply_when_assembly_omits_rates() {
        let catalog = FixedCatalog {
            assemblies: vec![assembly("a1", None, None)],
            ..Default::default()
        };
        let (builder, _) = builder(vec![takeoff(Some("a1"), Some(900.0))], catalog);

        let result = builder.build("t1", "job-1").await.unwrap();
        let item = &result.items[0];
        // 900 / 45 = 20 hours at $65/hr.
        assert_eq!(result.estimate.total_labor_hours, 20.0);
        assert_eq!(item.labor_cost, 1300.0);
    }

    // ==========================================
    // Unmapped handling and hard errors
    // ==========================================

    #[tokio::test]
    async fn test_unmapped_quantities_counted_and_flagged() {
        let catalog = FixedCatalog {
            assemblies: vec![assembly("a1", Some(50.0), Some(60.0))],
            ..Default::default()
        };
        let (builder, _) = builder(
            vec![
                takeoff(Some("a1"), Some(500.0)),
                takeoff(None, Some(200.0)),
                takeoff(Some("ghost"), Some(300.0)),
            ],
            catalog,
        );

        let result = builder.build("t1", "job-1").await.unwrap();
        assert_eq!(result.unmapped_count, 2);
        assert_eq!(result.items.len(), 1);
        assert!(result
            .flags
            .iter()
            .any(|f| f.code == FlagCode::UnmappedLayers && f.severity == FlagSeverity::Warn));
    }

    #[tokio::test]
    async fn test_no_takeoff_data_is_a_hard_error() {
        let (builder, _) = builder(vec![], FixedCatalog::default());
        let err = builder.build("t1", "job-1").await.unwrap_err();
        assert!(matches!(err, EngineError::NoTakeoffData { .. }));
    }

    #[tokio::test]
    async fn test_no_mapped_assemblies_is_a_hard_error() {
        let (builder, _) = builder(
            vec![takeoff(None, Some(500.0)), takeoff(Some("ghost"), Some(100.0))],
            FixedCatalog::default(),
        );
        let err = builder.build("t1", "job-1").await.unwrap_err();
        assert!(matches!(err, EngineError::NoMappedAssemblies { .. }));
    }

    // ==========================================
    // Lead time and identity preservation
    // ==========================================

    #[tokio::test]
    async fn test_long_lead_time_raises_risk_flag() {
        let catalog = FixedCatalog {
            assemblies: vec![assembly("a1", Some(50.0), Some(60.0))],
            bom_rows: vec![AssemblyMaterial {
                assembly_id: "a1".to_string(),
                material_id: "m1".to_string(),
                usage_per_square: 1.0,
                waste_factor_pct: 0.0,
            }],
            materials: vec![material("m1", 25.0, 30)],
        };
        let (builder, _) = builder(vec![takeoff(Some("a1"), Some(1000.0))], catalog);

        let result = builder.build("t1", "job-1").await.unwrap();
        assert_eq!(result.max_lead_time_days, 30);
        assert!(result.flags.iter().any(|f| f.code == FlagCode::LeadTimeRisk));
    }

    #[tokio::test]
    async fn test_rebuild_preserves_estimate_identity() {
        let catalog = FixedCatalog {
            assemblies: vec![assembly("a1", Some(50.0), Some(60.0))],
            ..Default::default()
        };
        let (builder, store) = builder(vec![takeoff(Some("a1"), Some(1000.0))], catalog);

        let first = builder.build("t1", "job-1").await.unwrap();
        *store.existing.lock().unwrap() = Some(first.estimate.clone());

        let second = builder.build("t1", "job-1").await.unwrap();
        assert_eq!(second.estimate.id, first.estimate.id);
        assert_eq!(second.estimate.created_at, first.estimate.created_at);
        assert_eq!(second.estimate.status, first.estimate.status);
        assert_eq!(second.estimate.total, first.estimate.total);
    }

    // ==========================================
    // Quantity fallbacks
    // ==========================================

    #[tokio::test]
    async fn test_length_and_count_fallbacks() {
        let catalog = FixedCatalog {
            assemblies: vec![assembly("a1", Some(50.0), Some(60.0))],
            ..Default::default()
        };
        let mut length_only = takeoff(Some("a1"), None);
        length_only.length_lf = Some(120.0);
        let mut count_only = takeoff(Some("a1"), None);
        count_only.count = Some(8);

        let (builder, _) = builder(vec![length_only, count_only], catalog);
        let result = builder.build("t1", "job-1").await.unwrap();

        // 120 lf + 8 x 10 sqft proxy = 200 sqft = 2 squares.
        assert_eq!(result.items[0].quantity_squares, 2.0);
    }
}
