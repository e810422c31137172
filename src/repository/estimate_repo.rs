// ==========================================
// Roofline Engine - Estimate Repository
// ==========================================
// Header upsert plus wholesale replacement of line items and flags,
// all inside one transaction. Partial replacement (flags written but
// items not) would be a correctness bug, so nothing here commits
// piecemeal.
// ==========================================

use crate::domain::estimate::{Estimate, EstimateFlag, EstimateItem};
use crate::domain::types::{EstimateStatus, FlagCode, FlagSeverity};
use crate::engine::collaborators::EstimateStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// Estimate repository.
pub struct EstimateRepository {
    conn: Arc<Mutex<Connection>>,
}

fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| DateTime::<Utc>::UNIX_EPOCH)
}

impl EstimateRepository {
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

    /// The current estimate for a job, if one exists.
    pub fn find_by_job(&self, tenant_id: &str, job_id: &str) -> RepositoryResult<Option<Estimate>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, tenant_id, job_id, status, subtotal, overhead, fee, total,
                   total_labor_hours, created_at, updated_at
            FROM estimate
            WHERE tenant_id = ?1 AND job_id = ?2
            "#,
        )?;

        let estimate = stmt
            .query_row(params![tenant_id, job_id], |row| {
                Ok(Estimate {
                    id: row.get(0)?,
                    tenant_id: row.get(1)?,
                    job_id: row.get(2)?,
                    status: EstimateStatus::from_db_str(&row.get::<_, String>(3)?),
                    subtotal: row.get(4)?,
                    overhead: row.get(5)?,
                    fee: row.get(6)?,
                    total: row.get(7)?,
                    total_labor_hours: row.get(8)?,
                    created_at: parse_ts(&row.get::<_, String>(9)?),
                    updated_at: parse_ts(&row.get::<_, String>(10)?),
                })
            })
            .optional()?;

        Ok(estimate)
    }

    /// Upsert the estimate header and replace its items and flags in
    /// one transaction. Callers rebuilding an estimate must reuse the
    /// existing row id so item foreign keys stay coherent.
    pub fn replace(
        &self,
        estimate: &Estimate,
        items: &[EstimateItem],
        flags: &[EstimateFlag],
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO estimate (
                id, tenant_id, job_id, status, subtotal, overhead, fee, total,
                total_labor_hours, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT (tenant_id, job_id) DO UPDATE SET
                status = excluded.status,
                subtotal = excluded.subtotal,
                overhead = excluded.overhead,
                fee = excluded.fee,
                total = excluded.total,
                total_labor_hours = excluded.total_labor_hours,
                updated_at = excluded.updated_at
            "#,
            params![
                estimate.id,
                estimate.tenant_id,
                estimate.job_id,
                estimate.status.to_db_str(),
                estimate.subtotal,
                estimate.overhead,
                estimate.fee,
                estimate.total,
                estimate.total_labor_hours,
                estimate.created_at.to_rfc3339(),
                estimate.updated_at.to_rfc3339(),
            ],
        )?;

        tx.execute(
            "DELETE FROM estimate_item WHERE estimate_id = ?1",
            params![estimate.id],
        )?;
        for item in items {
            tx.execute(
                r#"
                INSERT INTO estimate_item (
                    id, estimate_id, assembly_id, assembly_name, quantity_squares,
                    material_cost, labor_cost, equipment_cost, extended_cost
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    item.id,
                    item.estimate_id,
                    item.assembly_id,
                    item.assembly_name,
                    item.quantity_squares,
                    item.material_cost,
                    item.labor_cost,
                    item.equipment_cost,
                    item.extended_cost,
                ],
            )?;
        }

        tx.execute(
            "DELETE FROM estimate_flag WHERE estimate_id = ?1",
            params![estimate.id],
        )?;
        for flag in flags {
            tx.execute(
                r#"
                INSERT INTO estimate_flag (id, estimate_id, severity, code, message)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    flag.id,
                    flag.estimate_id,
                    flag.severity.to_db_str(),
                    flag.code.to_db_str(),
                    flag.message,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// Line items of an estimate, ordered by assembly id.
    pub fn list_items(&self, estimate_id: &str) -> RepositoryResult<Vec<EstimateItem>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, estimate_id, assembly_id, assembly_name, quantity_squares,
                   material_cost, labor_cost, equipment_cost, extended_cost
            FROM estimate_item
            WHERE estimate_id = ?1
            ORDER BY assembly_id
            "#,
        )?;

        let rows = stmt.query_map(params![estimate_id], |row| {
            Ok(EstimateItem {
                id: row.get(0)?,
                estimate_id: row.get(1)?,
                assembly_id: row.get(2)?,
                assembly_name: row.get(3)?,
                quantity_squares: row.get(4)?,
                material_cost: row.get(5)?,
                labor_cost: row.get(6)?,
                equipment_cost: row.get(7)?,
                extended_cost: row.get(8)?,
            })
        })?;

        rows.map(|r| r.map_err(RepositoryError::from)).collect()
    }

    /// Flags of an estimate, ordered by code.
    pub fn list_flags(&self, estimate_id: &str) -> RepositoryResult<Vec<EstimateFlag>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, estimate_id, severity, code, message
            FROM estimate_flag
            WHERE estimate_id = ?1
            ORDER BY code
            "#,
        )?;

        let rows = stmt.query_map(params![estimate_id], |row| {
            let severity: String = row.get(2)?;
            let code: String = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                severity,
                code,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut flags = Vec::new();
        for row in rows {
            let (id, estimate_id, severity, code, message) = row?;
            let code = FlagCode::from_db_str(&code).ok_or_else(|| {
                RepositoryError::ValidationError(format!("unknown flag code: {}", code))
            })?;
            flags.push(EstimateFlag {
                id,
                estimate_id,
                severity: FlagSeverity::from_db_str(&severity),
                code,
                message,
            });
        }
        Ok(flags)
    }
}

#[async_trait]
impl EstimateStore for EstimateRepository {
    async fn find_by_job(&self, tenant_id: &str, job_id: &str) -> RepositoryResult<Option<Estimate>> {
        EstimateRepository::find_by_job(self, tenant_id, job_id)
    }

    async fn replace_estimate(
        &self,
        estimate: &Estimate,
        items: &[EstimateItem],
        flags: &[EstimateFlag],
    ) -> RepositoryResult<()> {
        self.replace(estimate, items, flags)
    }
}
