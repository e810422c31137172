// ==========================================
// Roofline Engine - Take-off Quantity Repository
// ==========================================
// Read-only access to take-off measurements. No business logic.
// ==========================================

use crate::domain::takeoff::TakeoffQuantity;
use crate::engine::collaborators::TakeoffReader;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// Take-off quantity repository.
pub struct TakeoffRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TakeoffRepository {
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

    /// All take-off quantities recorded for a job, in insertion order.
    pub fn list_by_job(
        &self,
        tenant_id: &str,
        job_id: &str,
    ) -> RepositoryResult<Vec<TakeoffQuantity>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, job_id, source_layer, assembly_id, area_sqft, length_lf, count
            FROM takeoff_quantity
            WHERE tenant_id = ?1 AND job_id = ?2
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map(params![tenant_id, job_id], |row| {
            Ok(TakeoffQuantity {
                id: row.get(0)?,
                job_id: row.get(1)?,
                source_layer: row.get(2)?,
                assembly_id: row.get(3)?,
                area_sqft: row.get(4)?,
                length_lf: row.get(5)?,
                count: row.get(6)?,
            })
        })?;

        let mut quantities = Vec::new();
        for row in rows {
            quantities.push(row?);
        }
        Ok(quantities)
    }
}

#[async_trait]
impl TakeoffReader for TakeoffRepository {
    async fn list_takeoffs(
        &self,
        tenant_id: &str,
        job_id: &str,
    ) -> RepositoryResult<Vec<TakeoffQuantity>> {
        self.list_by_job(tenant_id, job_id)
    }
}
