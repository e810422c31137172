// ==========================================
// Integration Test Helpers
// ==========================================
// Temporary SQLite databases with the full schema plus catalog and
// take-off seed functions shared by the integration tests.
// ==========================================

#![allow(dead_code)]

use roofline_engine::db;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const TENANT: &str = "tenant-1";
pub const JOB: &str = "job-1";

/// A schema-initialized database in a temporary directory. Keep the
/// TempDir alive for the duration of the test.
pub fn create_test_db() -> (TempDir, Arc<Mutex<Connection>>) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("roofline_test.db");
    let conn = db::open_sqlite_connection(path.to_str().expect("utf-8 path"))
        .expect("open test database");
    db::init_schema(&conn).expect("init schema");
    (dir, Arc::new(Mutex::new(conn)))
}

pub fn insert_material(
    conn: &Arc<Mutex<Connection>>,
    id: &str,
    unit_cost: f64,
    lead_time_days: i64,
) {
    let conn = conn.lock().unwrap();
    conn.execute(
        r#"
        INSERT INTO material (id, tenant_id, name, unit, unit_cost, lead_time_days)
        VALUES (?1, ?2, ?3, 'bundle', ?4, ?5)
        "#,
        params![id, TENANT, format!("Material {id}"), unit_cost, lead_time_days],
    )
    .unwrap();
}

pub fn insert_constraint(
    conn: &Arc<Mutex<Connection>>,
    material_id: &str,
    min_temp_f: Option<f64>,
    requires_rising_temp: bool,
    min_window_minutes: i64,
    max_wind_mph: Option<f64>,
    max_precip_prob: Option<f64>,
) {
    let conn = conn.lock().unwrap();
    conn.execute(
        r#"
        INSERT INTO material_constraint (
            material_id, min_temp_f, requires_rising_temp, min_window_minutes,
            max_wind_mph, max_precip_prob, notes
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL)
        "#,
        params![
            material_id,
            min_temp_f,
            requires_rising_temp as i64,
            min_window_minutes,
            max_wind_mph,
            max_precip_prob,
        ],
    )
    .unwrap();
}

pub fn insert_assembly(
    conn: &Arc<Mutex<Connection>>,
    id: &str,
    productivity_sqft_per_hr: Option<f64>,
    labor_rate_per_hr: Option<f64>,
) {
    let conn = conn.lock().unwrap();
    conn.execute(
        r#"
        INSERT INTO assembly (
            id, tenant_id, name, productivity_sqft_per_hr, labor_rate_per_hr,
            equipment_cost_per_square, default_overhead_pct, default_fee_pct
        ) VALUES (?1, ?2, ?3, ?4, ?5, 0, NULL, NULL)
        "#,
        params![
            id,
            TENANT,
            format!("Assembly {id}"),
            productivity_sqft_per_hr,
            labor_rate_per_hr,
        ],
    )
    .unwrap();
}

pub fn insert_assembly_material(
    conn: &Arc<Mutex<Connection>>,
    assembly_id: &str,
    material_id: &str,
    usage_per_square: f64,
    waste_factor_pct: f64,
) {
    let conn = conn.lock().unwrap();
    conn.execute(
        r#"
        INSERT INTO assembly_material (assembly_id, material_id, usage_per_square, waste_factor_pct)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![assembly_id, material_id, usage_per_square, waste_factor_pct],
    )
    .unwrap();
}

pub fn insert_takeoff(
    conn: &Arc<Mutex<Connection>>,
    id: &str,
    assembly_id: Option<&str>,
    area_sqft: Option<f64>,
) {
    let conn = conn.lock().unwrap();
    conn.execute(
        r#"
        INSERT INTO takeoff_quantity (
            id, tenant_id, job_id, source_layer, assembly_id, area_sqft, length_lf, count
        ) VALUES (?1, ?2, ?3, 'ROOF_PLAN', ?4, ?5, NULL, NULL)
        "#,
        params![id, TENANT, JOB, assembly_id, area_sqft],
    )
    .unwrap();
}

/// One shingle assembly mapped to one material with an installation
/// constraint, plus a 1000 sqft take-off. The catalog and quantities
/// behind most end-to-end runs.
pub fn seed_standard_job(conn: &Arc<Mutex<Connection>>) {
    insert_material(conn, "m-shingle", 10.0, 7);
    insert_constraint(conn, "m-shingle", Some(40.0), false, 120, Some(25.0), Some(0.5));
    insert_assembly(conn, "a-shingle", Some(50.0), Some(60.0));
    insert_assembly_material(conn, "a-shingle", "m-shingle", 3.0, 10.0);
    insert_takeoff(conn, "t-1", Some("a-shingle"), Some(1000.0));
}
