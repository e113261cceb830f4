//! HTTP service command — `written-hug serve`.

use anyhow::Result;
use std::path::PathBuf;

use written_hug::config::HugToml;
use written_hug::hug::server::{ServerConfig, start_server};

pub async fn cmd_serve(
    mut settings: HugToml,
    port: Option<u16>,
    db_path: Option<PathBuf>,
    dev: bool,
) -> Result<()> {
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(path) = db_path {
        settings.server.db_path = path;
    }

    for warning in settings.validate() {
        tracing::warn!("{}", warning);
    }

    start_server(
        ServerConfig {
            port: settings.server.port,
            db_path: settings.server.db_path.clone(),
            dev_mode: dev,
        },
        &settings,
    )
    .await
}
