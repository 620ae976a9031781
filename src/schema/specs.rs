// src/schema/specs.rs

use std::collections::HashMap;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;

/// Static description of one target table: what the file claims to contain
/// and what the schema contract demands of it. Shared read-only by the
/// normalizer and the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub table: &'static str,
    /// Name of the quarterly extract file carrying this table's rows.
    pub source_file: &'static str,
    /// Target columns, in insert order. Row fields map positionally onto
    /// this list, not onto whatever the source header happens to say.
    pub columns: &'static [&'static str],
    /// Index of the business key a row cannot be loaded without.
    pub key_index: usize,
    /// Tables this one foreign-keys into; all must load first.
    pub depends_on: &'static [&'static str],
}

impl TableSpec {
    pub fn key_column(&self) -> &'static str {
        self.columns[self.key_index]
    }
}

/// The fixed SDWIS target catalog. The schema itself is an external
/// contract (see `ddl`); this is the pipeline's read-only view of it.
pub static TABLE_SPECS: &[TableSpec] = &[
    TableSpec {
        table: "sdwa_ref_code_values",
        source_file: "SDWA_REF_CODE_VALUES.csv",
        columns: &["value_type", "value_code", "value_description"],
        key_index: 1,
        depends_on: &[],
    },
    TableSpec {
        table: "sdwa_pub_water_systems",
        source_file: "SDWA_PUB_WATER_SYSTEMS.csv",
        columns: &[
            "submissionyearquarter",
            "pwsid",
            "pws_name",
            "pws_type_code",
            "pws_activity_code",
            "gw_sw_code",
            "primary_source_code",
            "owner_type_code",
            "population_served_count",
            "service_connections_count",
            "org_name",
            "admin_name",
            "email_addr",
            "phone_number",
            "address_line1",
            "address_line2",
            "city_name",
            "state_code",
            "zip_code",
            "first_reported_date",
            "last_reported_date",
        ],
        key_index: 1,
        depends_on: &[],
    },
    TableSpec {
        table: "sdwa_facilities",
        source_file: "SDWA_FACILITIES.csv",
        columns: &[
            "submissionyearquarter",
            "pwsid",
            "facility_id",
            "facility_name",
            "facility_type_code",
            "facility_activity_code",
            "water_type_code",
            "availability_code",
            "is_source_ind",
            "first_reported_date",
            "last_reported_date",
        ],
        key_index: 1,
        depends_on: &["sdwa_pub_water_systems"],
    },
    TableSpec {
        table: "sdwa_geographic_areas",
        source_file: "SDWA_GEOGRAPHIC_AREAS.csv",
        columns: &[
            "submissionyearquarter",
            "pwsid",
            "geo_id",
            "area_type_code",
            "city_served",
            "county_served",
            "state_served",
            "zip_code_served",
        ],
        key_index: 1,
        depends_on: &["sdwa_pub_water_systems"],
    },
    TableSpec {
        table: "sdwa_violations_enforcement",
        source_file: "SDWA_VIOLATIONS_ENFORCEMENT.csv",
        columns: &[
            "submissionyearquarter",
            "pwsid",
            "violation_id",
            "facility_id",
            "violation_code",
            "violation_category_code",
            "contaminant_code",
            "is_health_based_ind",
            "viol_measure",
            "unit_of_measure",
            "federal_mcl",
            "state_mcl",
            "violation_status",
            "rule_code",
            "rule_family_code",
            "non_compl_per_begin_date",
            "non_compl_per_end_date",
        ],
        key_index: 1,
        depends_on: &["sdwa_pub_water_systems", "sdwa_facilities"],
    },
    TableSpec {
        table: "sdwa_site_visits",
        source_file: "SDWA_SITE_VISITS.csv",
        columns: &[
            "submissionyearquarter",
            "pwsid",
            "visit_id",
            "visit_date",
            "agency_type_code",
            "visit_reason_code",
            "management_ops_eval_code",
            "compliance_eval_code",
        ],
        key_index: 1,
        depends_on: &["sdwa_pub_water_systems"],
    },
    TableSpec {
        table: "sdwa_lcr_samples",
        source_file: "SDWA_LCR_SAMPLES.csv",
        columns: &[
            "submissionyearquarter",
            "pwsid",
            "sample_id",
            "sampling_start_date",
            "sampling_end_date",
            "contaminant_code",
            "sample_measure",
            "unit_of_measure",
            "result_sign_code",
        ],
        key_index: 1,
        depends_on: &["sdwa_pub_water_systems"],
    },
];

static SPEC_INDEX: Lazy<HashMap<&'static str, &'static TableSpec>> =
    Lazy::new(|| TABLE_SPECS.iter().map(|s| (s.table, s)).collect());

pub fn spec_for(table: &str) -> Option<&'static TableSpec> {
    SPEC_INDEX.get(table).copied()
}

/// Configuration-error check, run once at startup before any row is
/// processed: every key index must name a real column and every dependency
/// must name a table in the catalog.
pub fn validate_specs(specs: &[TableSpec]) -> Result<()> {
    for spec in specs {
        if spec.key_index >= spec.columns.len() {
            bail!(
                "table {}: required-key index {} out of range for {} columns",
                spec.table,
                spec.key_index,
                spec.columns.len()
            );
        }
        for dep in spec.depends_on {
            if !specs.iter().any(|s| s.table == *dep) {
                bail!("table {}: unknown dependency {}", spec.table, dep);
            }
        }
    }
    Ok(())
}
