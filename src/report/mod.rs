// src/report/mod.rs

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::schema::TABLE_SPECS;

/// Aggregate statistics computed from the loaded, now-trusted tables.
/// Purely read-only; a query failure here is fatal since a successful load
/// is assumed to guarantee a queryable state.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Rows per target table, in catalog order.
    pub table_counts: Vec<(String, i64)>,
    /// pws_type_code distribution over the root entity table.
    pub system_types: Vec<(String, i64)>,
    /// violation_status distribution over the violation records.
    pub violation_statuses: Vec<(String, i64)>,
    pub health_based_violations: i64,
    pub non_health_based_violations: i64,
    pub active_systems: i64,
    pub total_population_served: i64,
    pub avg_violations_per_system: f64,
}

impl LoadReport {
    pub fn compute(conn: &Connection) -> Result<Self> {
        let mut report = LoadReport::default();

        for spec in TABLE_SPECS {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", spec.table), [], |r| {
                    r.get(0)
                })
                .with_context(|| format!("counting rows in {}", spec.table))?;
            report.table_counts.push((spec.table.to_string(), count));
        }

        report.system_types = distribution(
            conn,
            "SELECT IFNULL(pws_type_code, '(none)'), COUNT(*)
             FROM sdwa_pub_water_systems GROUP BY 1 ORDER BY 2 DESC",
        )
        .context("system type distribution")?;

        report.violation_statuses = distribution(
            conn,
            "SELECT IFNULL(violation_status, '(none)'), COUNT(*)
             FROM sdwa_violations_enforcement GROUP BY 1 ORDER BY 2 DESC",
        )
        .context("violation status distribution")?;

        let (health, non_health): (i64, i64) = conn
            .query_row(
                "SELECT
                     SUM(CASE WHEN is_health_based_ind = 'Y' THEN 1 ELSE 0 END),
                     SUM(CASE WHEN is_health_based_ind IS NULL OR is_health_based_ind <> 'Y'
                         THEN 1 ELSE 0 END)
                 FROM sdwa_violations_enforcement",
                [],
                |r| {
                    Ok((
                        r.get::<_, Option<i64>>(0)?.unwrap_or(0),
                        r.get::<_, Option<i64>>(1)?.unwrap_or(0),
                    ))
                },
            )
            .context("health-based split")?;
        report.health_based_violations = health;
        report.non_health_based_violations = non_health;

        report.active_systems = conn
            .query_row(
                "SELECT COUNT(*) FROM sdwa_pub_water_systems WHERE pws_activity_code = 'A'",
                [],
                |r| r.get(0),
            )
            .context("active system count")?;

        report.total_population_served = conn
            .query_row(
                "SELECT IFNULL(SUM(population_served_count), 0) FROM sdwa_pub_water_systems",
                [],
                |r| r.get(0),
            )
            .context("population served total")?;

        let systems = report
            .table_counts
            .iter()
            .find(|(t, _)| t == "sdwa_pub_water_systems")
            .map(|(_, c)| *c)
            .unwrap_or(0);
        let violations = report
            .table_counts
            .iter()
            .find(|(t, _)| t == "sdwa_violations_enforcement")
            .map(|(_, c)| *c)
            .unwrap_or(0);
        report.avg_violations_per_system = if systems > 0 {
            violations as f64 / systems as f64
        } else {
            0.0
        };

        Ok(report)
    }

    /// Emit the run summary through the normal log stream.
    pub fn log_summary(&self) {
        for (table, count) in &self.table_counts {
            info!(table = %table, rows = count, "loaded");
        }
        for (code, count) in &self.system_types {
            info!(pws_type_code = %code, systems = count, "system type");
        }
        for (status, count) in &self.violation_statuses {
            info!(status = %status, violations = count, "violation status");
        }
        info!(
            health_based = self.health_based_violations,
            non_health_based = self.non_health_based_violations,
            "health-based split"
        );
        info!(
            active_systems = self.active_systems,
            total_population_served = self.total_population_served,
            avg_violations_per_system = self.avg_violations_per_system,
            "summary"
        );
    }
}

fn distribution(conn: &Connection, sql: &str) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{load::db, schema::ddl};

    fn seeded_conn() -> Connection {
        let conn = db::open_in_memory().unwrap();
        ddl::apply(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO sdwa_pub_water_systems (pwsid, pws_name, pws_type_code,
                 pws_activity_code, population_served_count)
             VALUES ('GA0010000', 'ATLANTA', 'CWS', 'A', 50000),
                    ('GA0020000', 'MACON CAMP', 'TNCWS', 'I', 200);
             INSERT INTO sdwa_violations_enforcement (pwsid, violation_id,
                 is_health_based_ind, violation_status)
             VALUES ('GA0010000', 'V1', 'Y', 'Unaddressed'),
                    ('GA0010000', 'V2', 'N', 'Resolved'),
                    ('GA0020000', 'V3', NULL, 'Resolved');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn computes_expected_aggregates() {
        let conn = seeded_conn();
        let report = LoadReport::compute(&conn).unwrap();

        let systems = report
            .table_counts
            .iter()
            .find(|(t, _)| t == "sdwa_pub_water_systems")
            .unwrap()
            .1;
        assert_eq!(systems, 2);

        assert!(report.system_types.contains(&("CWS".to_string(), 1)));
        assert!(report
            .violation_statuses
            .contains(&("Resolved".to_string(), 2)));
        assert_eq!(report.health_based_violations, 1);
        assert_eq!(report.non_health_based_violations, 2);
        assert_eq!(report.active_systems, 1);
        assert_eq!(report.total_population_served, 50200);
        assert!((report.avg_violations_per_system - 1.5).abs() < 1e-9);
    }

    #[test]
    fn empty_database_reports_zeroes() {
        let conn = db::open_in_memory().unwrap();
        ddl::apply(&conn).unwrap();
        let report = LoadReport::compute(&conn).unwrap();
        assert_eq!(report.active_systems, 0);
        assert_eq!(report.avg_violations_per_system, 0.0);
    }
}
