// ==========================================
// Roofline Engine - Installability Repository
// ==========================================
// Wholesale replacement of per-day windows and upsert of the single
// schedule plan per job. Window lists and plan maps are stored as
// JSON columns.
// ==========================================

use crate::domain::installability::{DayInstallability, FeasibleWindow, SchedulePlan};
use crate::domain::types::BlockerTag;
use crate::engine::collaborators::InstallabilityStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Installability window + schedule plan repository.
pub struct InstallabilityRepository {
    conn: Arc<Mutex<Connection>>,
}

const DATE_FMT: &str = "%Y-%m-%d";

fn parse_date(raw: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FMT)
        .map_err(|e| RepositoryError::ValidationError(format!("bad date '{}': {}", raw, e)))
}

impl InstallabilityRepository {
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

    /// Delete-then-insert all per-day windows for a job, one
    /// transaction.
    pub fn replace_windows(
        &self,
        tenant_id: &str,
        job_id: &str,
        days: &[DayInstallability],
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            "DELETE FROM installability_window WHERE tenant_id = ?1 AND job_id = ?2",
            params![tenant_id, job_id],
        )?;

        for day in days {
            let windows_json = serde_json::to_string(&day.windows)?;
            let factors_json = serde_json::to_string(&day.limiting_factors)?;
            tx.execute(
                r#"
                INSERT INTO installability_window (
                    tenant_id, job_id, date, windows_json, feasible, limiting_factors_json
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    tenant_id,
                    job_id,
                    day.date.format(DATE_FMT).to_string(),
                    windows_json,
                    day.feasible as i64,
                    factors_json,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// Per-day windows for a job, ascending by date.
    pub fn find_windows_by_job(
        &self,
        tenant_id: &str,
        job_id: &str,
    ) -> RepositoryResult<Vec<DayInstallability>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT date, windows_json, feasible, limiting_factors_json
            FROM installability_window
            WHERE tenant_id = ?1 AND job_id = ?2
            ORDER BY date
            "#,
        )?;

        let rows = stmt.query_map(params![tenant_id, job_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut days = Vec::new();
        for row in rows {
            let (date, windows_json, feasible, factors_json) = row?;
            let windows: Vec<FeasibleWindow> = serde_json::from_str(&windows_json)?;
            let limiting_factors: Vec<BlockerTag> = serde_json::from_str(&factors_json)?;
            days.push(DayInstallability {
                date: parse_date(&date)?,
                windows,
                feasible: feasible != 0,
                limiting_factors,
            });
        }
        Ok(days)
    }

    /// Insert or update the single schedule plan for a job.
    pub fn upsert_schedule_plan(&self, tenant_id: &str, plan: &SchedulePlan) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let usable_json = serde_json::to_string(&plan.usable_hours_per_day)?;
        let revenue_json = serde_json::to_string(&plan.revenue_projection)?;

        conn.execute(
            r#"
            INSERT INTO schedule_plan (
                tenant_id, job_id, suggested_start, suggested_end, confidence,
                usable_hours_json, revenue_json, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (tenant_id, job_id) DO UPDATE SET
                suggested_start = excluded.suggested_start,
                suggested_end = excluded.suggested_end,
                confidence = excluded.confidence,
                usable_hours_json = excluded.usable_hours_json,
                revenue_json = excluded.revenue_json,
                updated_at = excluded.updated_at
            "#,
            params![
                tenant_id,
                plan.job_id,
                plan.suggested_start.format(DATE_FMT).to_string(),
                plan.suggested_end.format(DATE_FMT).to_string(),
                plan.confidence,
                usable_json,
                revenue_json,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The schedule plan for a job, if one exists.
    pub fn find_schedule_plan(
        &self,
        tenant_id: &str,
        job_id: &str,
    ) -> RepositoryResult<Option<SchedulePlan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT job_id, suggested_start, suggested_end, confidence,
                   usable_hours_json, revenue_json
            FROM schedule_plan
            WHERE tenant_id = ?1 AND job_id = ?2
            "#,
        )?;

        let raw = stmt
            .query_row(params![tenant_id, job_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .optional()?;

        let Some((job_id, start, end, confidence, usable_json, revenue_json)) = raw else {
            return Ok(None);
        };

        let usable_hours_per_day: BTreeMap<NaiveDate, f64> = serde_json::from_str(&usable_json)?;
        let revenue_projection: BTreeMap<NaiveDate, f64> = serde_json::from_str(&revenue_json)?;

        Ok(Some(SchedulePlan {
            job_id,
            suggested_start: parse_date(&start)?,
            suggested_end: parse_date(&end)?,
            confidence,
            usable_hours_per_day,
            revenue_projection,
        }))
    }
}

#[async_trait]
impl InstallabilityStore for InstallabilityRepository {
    async fn replace_windows(
        &self,
        tenant_id: &str,
        job_id: &str,
        days: &[DayInstallability],
    ) -> RepositoryResult<()> {
        InstallabilityRepository::replace_windows(self, tenant_id, job_id, days)
    }

    async fn upsert_schedule_plan(
        &self,
        tenant_id: &str,
        plan: &SchedulePlan,
    ) -> RepositoryResult<()> {
        InstallabilityRepository::upsert_schedule_plan(self, tenant_id, plan)
    }
}
