// ==========================================
// Roofline Engine - Engine Configuration
// ==========================================
// Every tuning constant the engines use is a named, overridable
// field here. Overrides live in the config_kv table, scope 'global'
// first, then 'tenant/<id>' on top.
// ==========================================

use crate::db::configure_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// Configuration keys (config_kv)
// ==========================================
pub mod config_keys {
    pub const RISING_EPSILON_F: &str = "weather/rising_epsilon_f";
    pub const FORECAST_GAP_MINUTES: &str = "weather/forecast_gap_minutes";
    pub const FORECAST_LOOKBACK_HOURS: &str = "weather/forecast_lookback_hours";
    pub const DEFAULT_MIN_WINDOW_MINUTES: &str = "weather/default_min_window_minutes";
    pub const REQUIRED_DAILY_HOURS: &str = "schedule/required_daily_hours";
    pub const DEFAULT_HOURLY_REVENUE: &str = "schedule/default_hourly_revenue";
    pub const FORECAST_GAP_PENALTY: &str = "schedule/forecast_gap_penalty";
    pub const DEFAULT_PRODUCTIVITY_SQFT_PER_HR: &str = "estimate/default_productivity_sqft_per_hr";
    pub const DEFAULT_LABOR_RATE_PER_HR: &str = "estimate/default_labor_rate_per_hr";
    pub const COUNT_SQFT_PROXY: &str = "estimate/count_sqft_proxy";
    pub const LEAD_TIME_RISK_DAYS: &str = "estimate/lead_time_risk_days";
    pub const DEFAULT_PROFIT_MARGIN_PCT: &str = "estimate/default_profit_margin_pct";
    pub const DEFAULT_OVERHEAD_PCT: &str = "estimate/default_overhead_pct";
    pub const DEFAULT_FEE_PCT: &str = "estimate/default_fee_pct";
}

// ==========================================
// EngineConfig - typed defaults
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// A temperature must exceed the previous hour by more than this
    /// many °F to count as genuinely rising (noise floor).
    pub rising_epsilon_f: f64,
    /// Gap between consecutive samples that flags forecast data loss.
    pub forecast_gap_minutes: i64,
    /// Extra hours fetched before the requested range so the first
    /// in-range hour has rising-trend context.
    pub forecast_lookback_hours: i64,
    /// Minimum continuous window applied when no material specifies one.
    pub default_min_window_minutes: i64,
    /// Hours of work a day must support to count as feasible, on top
    /// of the minimum-window test. 0 = minimum-window test only.
    pub required_daily_hours: f64,
    /// Revenue projection rate when the caller does not supply one.
    pub default_hourly_revenue: f64,
    /// Confidence multiplier applied when the forecast had data gaps.
    pub forecast_gap_penalty: f64,
    /// Crew productivity fallback (sqft/hr) for assemblies without one.
    pub default_productivity_sqft_per_hr: f64,
    /// Labor rate fallback ($/hr) for assemblies without one.
    pub default_labor_rate_per_hr: f64,
    /// Effective sqft attributed to one counted feature when neither
    /// area nor length is measured. Coarse heuristic kept pending
    /// product-owner confirmation.
    pub count_sqft_proxy: f64,
    /// Material lead time above this many days raises LEAD_TIME_RISK.
    pub lead_time_risk_days: i64,
    pub default_profit_margin_pct: f64,
    pub default_overhead_pct: f64,
    pub default_fee_pct: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rising_epsilon_f: 0.2,
            forecast_gap_minutes: 60,
            forecast_lookback_hours: 3,
            default_min_window_minutes: 120,
            required_daily_hours: 0.0,
            default_hourly_revenue: 350.0,
            forecast_gap_penalty: 0.7,
            default_productivity_sqft_per_hr: 45.0,
            default_labor_rate_per_hr: 65.0,
            count_sqft_proxy: 10.0,
            lead_time_risk_days: 21,
            default_profit_margin_pct: 10.0,
            default_overhead_pct: 10.0,
            default_fee_pct: 5.0,
        }
    }
}

impl EngineConfig {
    /// Apply a single config_kv override. Unknown keys and unparsable
    /// values are ignored with a warning; defaults must never be lost
    /// to a bad row.
    fn apply_override(&mut self, key: &str, value: &str) {
        use config_keys::*;

        macro_rules! set_f64 {
            ($field:expr) => {
                match value.parse::<f64>() {
                    Ok(v) => $field = v,
                    Err(_) => warn!(key, value, "ignoring unparsable config override"),
                }
            };
        }
        macro_rules! set_i64 {
            ($field:expr) => {
                match value.parse::<i64>() {
                    Ok(v) => $field = v,
                    Err(_) => warn!(key, value, "ignoring unparsable config override"),
                }
            };
        }

        match key {
            RISING_EPSILON_F => set_f64!(self.rising_epsilon_f),
            FORECAST_GAP_MINUTES => set_i64!(self.forecast_gap_minutes),
            FORECAST_LOOKBACK_HOURS => set_i64!(self.forecast_lookback_hours),
            DEFAULT_MIN_WINDOW_MINUTES => set_i64!(self.default_min_window_minutes),
            REQUIRED_DAILY_HOURS => set_f64!(self.required_daily_hours),
            DEFAULT_HOURLY_REVENUE => set_f64!(self.default_hourly_revenue),
            FORECAST_GAP_PENALTY => set_f64!(self.forecast_gap_penalty),
            DEFAULT_PRODUCTIVITY_SQFT_PER_HR => set_f64!(self.default_productivity_sqft_per_hr),
            DEFAULT_LABOR_RATE_PER_HR => set_f64!(self.default_labor_rate_per_hr),
            COUNT_SQFT_PROXY => set_f64!(self.count_sqft_proxy),
            LEAD_TIME_RISK_DAYS => set_i64!(self.lead_time_risk_days),
            DEFAULT_PROFIT_MARGIN_PCT => set_f64!(self.default_profit_margin_pct),
            DEFAULT_OVERHEAD_PCT => set_f64!(self.default_overhead_pct),
            DEFAULT_FEE_PCT => set_f64!(self.default_fee_pct),
            _ => warn!(key, "ignoring unknown config key"),
        }
    }
}

// ==========================================
// ConfigManager - config_kv access
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Reuse an existing connection; re-applies the unified PRAGMAs
    /// (idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)
                .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        }
        Ok(Self { conn })
    }

    /// Load the effective configuration for a tenant: defaults, then
    /// global overrides, then tenant overrides.
    pub fn load(&self, tenant_id: Option<&str>) -> RepositoryResult<EngineConfig> {
        let mut config = EngineConfig::default();

        self.apply_scope(&mut config, "global")?;
        if let Some(tenant) = tenant_id {
            self.apply_scope(&mut config, &format!("tenant/{}", tenant))?;
        }

        Ok(config)
    }

    fn apply_scope(&self, config: &mut EngineConfig, scope_id: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![scope_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config.apply_override(&key, &value);
        }
        Ok(())
    }

    /// Write one override value into a scope.
    pub fn set(&self, scope_id: &str, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT (scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![scope_id, key, value],
        )?;
        Ok(())
    }
}
