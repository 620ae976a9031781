use anyhow::Result;
use sdwisload::{
    config::Config,
    extract,
    load::{db, BulkLoader},
    report::LoadReport,
    schema::{self, ddl, graph},
};
use std::{fs, path::Path};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) load config & prepare dirs ───────────────────────────────
    let cfg = Config::load(Path::new("sdwisload.yaml"))?;
    for d in [&cfg.data_dir, &cfg.staging_dir, &cfg.skiplog_dir] {
        fs::create_dir_all(d)?;
    }

    // ─── 3) optional: unpack the quarterly distribution ZIP ──────────
    if let Some(zip) = &cfg.quarter_zip {
        let n = extract::unpack_quarter_zip(zip, &cfg.data_dir)?;
        info!(files = n, "extract intake complete");
    }

    // ─── 4) validate the catalog & fix the load order ────────────────
    schema::validate_specs(schema::TABLE_SPECS)?;
    let order = graph::load_order(schema::TABLE_SPECS)?;
    info!(
        order = %order.iter().map(|s| s.table).collect::<Vec<_>>().join(" -> "),
        "dependency order fixed"
    );

    // ─── 5) open destination, apply the schema contract ──────────────
    let conn = db::open(&cfg.db_path)?;
    ddl::apply(&conn)?;
    db::health_check(&conn)?;

    // ─── 6) remediate & bulk-load every table ────────────────────────
    let mut loader = BulkLoader::new(conn, &cfg.data_dir, &cfg.staging_dir, &cfg.skiplog_dir);
    let outcomes = loader.run_all(&order)?;
    for o in &outcomes {
        info!(
            table = %o.table,
            attempted = o.rows_attempted,
            accepted = o.rows_accepted,
            skipped = o.rows_skipped,
            "outcome"
        );
    }

    // ─── 7) report over the now-trusted data ─────────────────────────
    let report = LoadReport::compute(loader.conn())?;
    report.log_summary();

    info!("all done");
    Ok(())
}
