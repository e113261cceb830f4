//! Database initialisation command — `written-hug init-db`.

use anyhow::{Context, Result};
use std::path::PathBuf;

use written_hug::config::HugToml;
use written_hug::hug::db::HugDb;

pub fn cmd_init_db(settings: &HugToml, db_path: Option<PathBuf>) -> Result<()> {
    let db_path = db_path.unwrap_or_else(|| settings.server.db_path.clone());
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let db = HugDb::new(&db_path)?;
    let orders = db.count_orders()?;
    println!(
        "Database initialized at {} ({} orders)",
        db_path.display(),
        orders
    );
    Ok(())
}
