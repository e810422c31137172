// ==========================================
// Roofline Engine - Catalog Repository
// ==========================================
// Batch id-list lookups for assemblies, bills of materials,
// materials and install constraints. No business logic.
// ==========================================

use crate::domain::catalog::{Assembly, AssemblyMaterial, Material};
use crate::domain::forecast::MaterialConstraint;
use crate::engine::collaborators::CatalogReader;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params_from_iter, Connection};
use std::sync::{Arc, Mutex};

/// Catalog repository.
pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

/// Comma-joined positional placeholders for an IN clause.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

impl CatalogRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Batch fetch assemblies by id, tenant-scoped.
    pub fn find_assemblies_by_ids(
        &self,
        tenant_id: &str,
        ids: &[String],
    ) -> RepositoryResult<Vec<Assembly>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn()?;

        let sql = format!(
            r#"
            SELECT id, name, productivity_sqft_per_hr, labor_rate_per_hr,
                   equipment_cost_per_square, default_overhead_pct, default_fee_pct
            FROM assembly
            WHERE tenant_id = ? AND id IN ({})
            ORDER BY id
            "#,
            placeholders(ids.len())
        );

        let mut stmt = conn.prepare(&sql)?;
        let values: Vec<String> = std::iter::once(tenant_id.to_string())
            .chain(ids.iter().cloned())
            .collect();
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(Assembly {
                id: row.get(0)?,
                name: row.get(1)?,
                productivity_sqft_per_hr: row.get(2)?,
                labor_rate_per_hr: row.get(3)?,
                equipment_cost_per_square: row.get(4)?,
                default_overhead_pct: row.get(5)?,
                default_fee_pct: row.get(6)?,
            })
        })?;

        rows.map(|r| r.map_err(RepositoryError::from)).collect()
    }

    /// Batch fetch bill-of-materials rows for a set of assemblies.
    pub fn find_assembly_materials(
        &self,
        assembly_ids: &[String],
    ) -> RepositoryResult<Vec<AssemblyMaterial>> {
        if assembly_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn()?;

        let sql = format!(
            r#"
            SELECT assembly_id, material_id, usage_per_square, waste_factor_pct
            FROM assembly_material
            WHERE assembly_id IN ({})
            ORDER BY assembly_id, material_id
            "#,
            placeholders(assembly_ids.len())
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(assembly_ids.iter()), |row| {
            Ok(AssemblyMaterial {
                assembly_id: row.get(0)?,
                material_id: row.get(1)?,
                usage_per_square: row.get(2)?,
                waste_factor_pct: row.get(3)?,
            })
        })?;

        rows.map(|r| r.map_err(RepositoryError::from)).collect()
    }

    /// Batch fetch materials by id, tenant-scoped.
    pub fn find_materials_by_ids(
        &self,
        tenant_id: &str,
        ids: &[String],
    ) -> RepositoryResult<Vec<Material>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn()?;

        let sql = format!(
            r#"
            SELECT id, name, unit, unit_cost, lead_time_days
            FROM material
            WHERE tenant_id = ? AND id IN ({})
            ORDER BY id
            "#,
            placeholders(ids.len())
        );

        let mut stmt = conn.prepare(&sql)?;
        let values: Vec<String> = std::iter::once(tenant_id.to_string())
            .chain(ids.iter().cloned())
            .collect();
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(Material {
                id: row.get(0)?,
                name: row.get(1)?,
                unit: row.get(2)?,
                unit_cost: row.get(3)?,
                lead_time_days: row.get(4)?,
            })
        })?;

        rows.map(|r| r.map_err(RepositoryError::from)).collect()
    }

    /// Batch fetch install constraints for a set of materials.
    /// Materials with no constraint row simply produce no entry.
    pub fn find_constraints_by_material_ids(
        &self,
        material_ids: &[String],
    ) -> RepositoryResult<Vec<MaterialConstraint>> {
        if material_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn()?;

        let sql = format!(
            r#"
            SELECT material_id, min_temp_f, requires_rising_temp, min_window_minutes,
                   max_wind_mph, max_precip_prob, notes
            FROM material_constraint
            WHERE material_id IN ({})
            ORDER BY material_id
            "#,
            placeholders(material_ids.len())
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(material_ids.iter()), |row| {
            Ok(MaterialConstraint {
                material_id: row.get(0)?,
                min_temp_f: row.get(1)?,
                requires_rising_temp: row.get::<_, i64>(2)? != 0,
                min_window_minutes: row.get(3)?,
                max_wind_mph: row.get(4)?,
                max_precip_prob: row.get(5)?,
                notes: row.get(6)?,
            })
        })?;

        rows.map(|r| r.map_err(RepositoryError::from)).collect()
    }
}

#[async_trait]
impl CatalogReader for CatalogRepository {
    async fn assemblies_by_ids(
        &self,
        tenant_id: &str,
        ids: &[String],
    ) -> RepositoryResult<Vec<Assembly>> {
        self.find_assemblies_by_ids(tenant_id, ids)
    }

    async fn assembly_materials_by_assembly_ids(
        &self,
        assembly_ids: &[String],
    ) -> RepositoryResult<Vec<AssemblyMaterial>> {
        self.find_assembly_materials(assembly_ids)
    }

    async fn materials_by_ids(
        &self,
        tenant_id: &str,
        ids: &[String],
    ) -> RepositoryResult<Vec<Material>> {
        self.find_materials_by_ids(tenant_id, ids)
    }

    async fn constraints_by_material_ids(
        &self,
        material_ids: &[String],
    ) -> RepositoryResult<Vec<MaterialConstraint>> {
        self.find_constraints_by_material_ids(material_ids)
    }
}
