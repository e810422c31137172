// ==========================================
// Roofline Engine - SQLite Connection Setup
// ==========================================
// Goals:
// - one place for Connection::open PRAGMA behavior, so every module
//   runs with foreign keys enabled
// - one busy_timeout, to reduce spurious busy errors on concurrent
//   writes
// - schema bootstrap for embedding applications and tests
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Apply the unified PRAGMA set to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings and must
/// be applied to every connection the process opens.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create all engine tables if they do not exist.
///
/// Idempotent; safe to call on every startup and in tests against
/// temporary databases.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id   TEXT NOT NULL,
            key        TEXT NOT NULL,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS material (
            id             TEXT PRIMARY KEY,
            tenant_id      TEXT NOT NULL,
            name           TEXT NOT NULL,
            unit           TEXT NOT NULL DEFAULT 'each',
            unit_cost      REAL NOT NULL DEFAULT 0,
            lead_time_days INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS material_constraint (
            material_id          TEXT PRIMARY KEY REFERENCES material(id) ON DELETE CASCADE,
            min_temp_f           REAL,
            requires_rising_temp INTEGER NOT NULL DEFAULT 0,
            min_window_minutes   INTEGER NOT NULL DEFAULT 0,
            max_wind_mph         REAL,
            max_precip_prob      REAL,
            notes                TEXT
        );

        CREATE TABLE IF NOT EXISTS assembly (
            id                       TEXT PRIMARY KEY,
            tenant_id                TEXT NOT NULL,
            name                     TEXT NOT NULL,
            productivity_sqft_per_hr REAL,
            labor_rate_per_hr        REAL,
            equipment_cost_per_square REAL NOT NULL DEFAULT 0,
            default_overhead_pct     REAL,
            default_fee_pct          REAL
        );

        CREATE TABLE IF NOT EXISTS assembly_material (
            assembly_id      TEXT NOT NULL REFERENCES assembly(id) ON DELETE CASCADE,
            material_id      TEXT NOT NULL REFERENCES material(id) ON DELETE CASCADE,
            usage_per_square REAL NOT NULL DEFAULT 0,
            waste_factor_pct REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (assembly_id, material_id)
        );

        CREATE TABLE IF NOT EXISTS takeoff_quantity (
            id           TEXT PRIMARY KEY,
            tenant_id    TEXT NOT NULL,
            job_id       TEXT NOT NULL,
            source_layer TEXT,
            assembly_id  TEXT,
            area_sqft    REAL,
            length_lf    REAL,
            count        INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_takeoff_job ON takeoff_quantity (tenant_id, job_id);

        CREATE TABLE IF NOT EXISTS estimate (
            id               TEXT PRIMARY KEY,
            tenant_id        TEXT NOT NULL,
            job_id           TEXT NOT NULL,
            status           TEXT NOT NULL DEFAULT 'draft',
            subtotal         REAL NOT NULL DEFAULT 0,
            overhead         REAL NOT NULL DEFAULT 0,
            fee              REAL NOT NULL DEFAULT 0,
            total            REAL NOT NULL DEFAULT 0,
            total_labor_hours REAL NOT NULL DEFAULT 0,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL,
            UNIQUE (tenant_id, job_id)
        );

        CREATE TABLE IF NOT EXISTS estimate_item (
            id               TEXT PRIMARY KEY,
            estimate_id      TEXT NOT NULL REFERENCES estimate(id) ON DELETE CASCADE,
            assembly_id      TEXT NOT NULL,
            assembly_name    TEXT NOT NULL,
            quantity_squares REAL NOT NULL,
            material_cost    REAL NOT NULL,
            labor_cost       REAL NOT NULL,
            equipment_cost   REAL NOT NULL,
            extended_cost    REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS estimate_flag (
            id          TEXT PRIMARY KEY,
            estimate_id TEXT NOT NULL REFERENCES estimate(id) ON DELETE CASCADE,
            severity    TEXT NOT NULL,
            code        TEXT NOT NULL,
            message     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS installability_window (
            tenant_id            TEXT NOT NULL,
            job_id               TEXT NOT NULL,
            date                 TEXT NOT NULL,
            windows_json         TEXT NOT NULL,
            feasible             INTEGER NOT NULL,
            limiting_factors_json TEXT NOT NULL,
            PRIMARY KEY (tenant_id, job_id, date)
        );

        CREATE TABLE IF NOT EXISTS schedule_plan (
            tenant_id        TEXT NOT NULL,
            job_id           TEXT NOT NULL,
            suggested_start  TEXT NOT NULL,
            suggested_end    TEXT NOT NULL,
            confidence       REAL NOT NULL,
            usable_hours_json TEXT NOT NULL,
            revenue_json     TEXT NOT NULL,
            updated_at       TEXT NOT NULL,
            PRIMARY KEY (tenant_id, job_id)
        );
        "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='estimate'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
