// src/schema/ddl.rs

use anyhow::{Context, Result};
use rusqlite::Connection;

/// The fixed target schema. This is an external contract the pipeline has
/// to satisfy, not something it designs: table names, column order, key and
/// foreign-key constraints all match the TableSpec catalog.
pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS sdwa_ref_code_values (
    value_type          TEXT NOT NULL,
    value_code          TEXT NOT NULL,
    value_description   TEXT,
    PRIMARY KEY (value_type, value_code)
);

CREATE TABLE IF NOT EXISTS sdwa_pub_water_systems (
    submissionyearquarter       TEXT,
    pwsid                       TEXT NOT NULL PRIMARY KEY,
    pws_name                    TEXT,
    pws_type_code               TEXT,
    pws_activity_code           TEXT,
    gw_sw_code                  TEXT,
    primary_source_code         TEXT,
    owner_type_code             TEXT,
    population_served_count     INTEGER,
    service_connections_count   INTEGER,
    org_name                    TEXT,
    admin_name                  TEXT,
    email_addr                  TEXT,
    phone_number                TEXT,
    address_line1               TEXT,
    address_line2               TEXT,
    city_name                   TEXT,
    state_code                  TEXT,
    zip_code                    TEXT,
    first_reported_date         TEXT,
    last_reported_date          TEXT
);

CREATE TABLE IF NOT EXISTS sdwa_facilities (
    submissionyearquarter   TEXT,
    pwsid                   TEXT NOT NULL,
    facility_id             TEXT NOT NULL,
    facility_name           TEXT,
    facility_type_code      TEXT,
    facility_activity_code  TEXT,
    water_type_code         TEXT,
    availability_code       TEXT,
    is_source_ind           TEXT,
    first_reported_date     TEXT,
    last_reported_date      TEXT,
    PRIMARY KEY (pwsid, facility_id),
    FOREIGN KEY (pwsid) REFERENCES sdwa_pub_water_systems (pwsid)
);

CREATE TABLE IF NOT EXISTS sdwa_geographic_areas (
    submissionyearquarter   TEXT,
    pwsid                   TEXT NOT NULL,
    geo_id                  TEXT,
    area_type_code          TEXT,
    city_served             TEXT,
    county_served           TEXT,
    state_served            TEXT,
    zip_code_served         TEXT,
    FOREIGN KEY (pwsid) REFERENCES sdwa_pub_water_systems (pwsid)
);

CREATE TABLE IF NOT EXISTS sdwa_violations_enforcement (
    submissionyearquarter   TEXT,
    pwsid                   TEXT NOT NULL,
    violation_id            TEXT,
    facility_id             TEXT,
    violation_code          TEXT,
    violation_category_code TEXT,
    contaminant_code        TEXT,
    is_health_based_ind     TEXT,
    viol_measure            REAL,
    unit_of_measure         TEXT,
    federal_mcl             TEXT,
    state_mcl               TEXT,
    violation_status        TEXT,
    rule_code               TEXT,
    rule_family_code        TEXT,
    non_compl_per_begin_date TEXT,
    non_compl_per_end_date  TEXT,
    FOREIGN KEY (pwsid) REFERENCES sdwa_pub_water_systems (pwsid),
    FOREIGN KEY (pwsid, facility_id) REFERENCES sdwa_facilities (pwsid, facility_id)
);

CREATE TABLE IF NOT EXISTS sdwa_site_visits (
    submissionyearquarter       TEXT,
    pwsid                       TEXT NOT NULL,
    visit_id                    TEXT,
    visit_date                  TEXT,
    agency_type_code            TEXT,
    visit_reason_code           TEXT,
    management_ops_eval_code    TEXT,
    compliance_eval_code        TEXT,
    FOREIGN KEY (pwsid) REFERENCES sdwa_pub_water_systems (pwsid)
);

CREATE TABLE IF NOT EXISTS sdwa_lcr_samples (
    submissionyearquarter   TEXT,
    pwsid                   TEXT NOT NULL,
    sample_id               TEXT,
    sampling_start_date     TEXT,
    sampling_end_date       TEXT,
    contaminant_code        TEXT,
    sample_measure          REAL,
    unit_of_measure         TEXT,
    result_sign_code        TEXT,
    FOREIGN KEY (pwsid) REFERENCES sdwa_pub_water_systems (pwsid)
);
"#;

/// Apply the schema contract. Idempotent, so a re-run against an existing
/// database is safe.
pub fn apply(conn: &Connection) -> Result<()> {
    conn.execute_batch(DDL).context("applying schema DDL")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TABLE_SPECS;

    #[test]
    fn ddl_applies_and_matches_catalog() {
        let conn = Connection::open_in_memory().unwrap();
        apply(&conn).unwrap();
        apply(&conn).unwrap(); // idempotent

        for spec in TABLE_SPECS {
            let cols: Vec<String> = conn
                .prepare(&format!("PRAGMA table_info({})", spec.table))
                .unwrap()
                .query_map([], |row| row.get::<_, String>(1))
                .unwrap()
                .collect::<Result<_, _>>()
                .unwrap();
            assert_eq!(cols, spec.columns, "column order for {}", spec.table);
        }
    }
}
