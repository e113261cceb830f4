//! Local order listing — `written-hug orders`.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;

use written_hug::config::HugToml;
use written_hug::hug::db::HugDb;
use written_hug::hug::listing::{ListingParams, filter_orders};

pub fn cmd_orders(
    settings: &HugToml,
    db_path: Option<PathBuf>,
    params: ListingParams,
    json: bool,
) -> Result<()> {
    let db_path = db_path.unwrap_or_else(|| settings.server.db_path.clone());
    if !db_path.exists() {
        anyhow::bail!(
            "No database at {}. Run 'written-hug init-db' first.",
            db_path.display()
        );
    }

    let query = params.into_query()?;
    let offset = settings.dashboard.offset()?;
    let db = HugDb::new(&db_path)?;
    let orders = filter_orders(&db.list_orders()?, &query, &Utc::now().with_timezone(&offset));

    if json {
        let out = serde_json::to_string_pretty(&orders).context("Failed to render orders")?;
        println!("{}", out);
        return Ok(());
    }

    if orders.is_empty() {
        println!("No orders found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<16}  {:<20}  {:<14}  {:<24}  {}",
        "ID", "CREATED", "NAME", "STATUS", "SERVICE", "RECIPIENT"
    );
    for order in &orders {
        println!(
            "{:<36}  {:<16}  {:<20}  {:<14}  {:<24}  {}",
            order.id,
            order
                .created_at
                .with_timezone(&offset)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            truncate(&order.name, 20),
            order.status.as_str(),
            order.service_type.as_str(),
            order.recipient_name
        );
    }
    println!();
    println!("{} order(s)", orders.len());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
