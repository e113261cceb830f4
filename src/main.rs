use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use written_hug::config::{DEFAULT_CONFIG_FILE, HugToml};
use written_hug::logging::{LogFormat, init_logging};

mod cmd;

#[derive(Parser)]
#[command(name = "written-hug")]
#[command(version, about = "Order intake, admin dashboard and reply threads for The Written Hug")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Path to the configuration file. A missing file means defaults.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP service
    Serve {
        /// Port to serve on (overrides config and HUG_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Database path (overrides config and HUG_DB_PATH)
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Dev mode: permissive CORS and bind on all interfaces
        #[arg(long)]
        dev: bool,
    },
    /// Create the database and run migrations
    InitDb {
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Show the effective configuration (secrets redacted)
    Config {
        /// Print configuration warnings instead
        #[arg(long)]
        validate: bool,

        /// Write a default configuration file if none exists
        #[arg(long, conflicts_with = "validate")]
        init: bool,
    },
    /// Print the filtered order listing from the local database
    Orders {
        /// Case-insensitive match on name, email, service type or recipient
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        service_type: Option<String>,

        /// all, today, week or month
        #[arg(long)]
        time: Option<String>,

        /// date, name or status
        #[arg(long)]
        sort: Option<String>,

        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();
    init_logging(cli.verbose, cli.log_format);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    let mut settings = HugToml::load_or_default(&cli.config)?;
    settings.apply_env()?;

    match cli.command {
        Commands::Serve { port, db_path, dev } => {
            cmd::cmd_serve(settings, port, db_path, dev).await?;
        }
        Commands::InitDb { db_path } => cmd::cmd_init_db(&settings, db_path)?,
        Commands::Config { validate, init } => {
            cmd::cmd_config(&cli.config, &settings, validate, init)?
        }
        Commands::Orders {
            search,
            status,
            service_type,
            time,
            sort,
            db_path,
            json,
        } => {
            let params = written_hug::hug::listing::ListingParams {
                search,
                status,
                service_type,
                time,
                sort,
            };
            cmd::cmd_orders(&settings, db_path, params, json)?;
        }
    }

    Ok(())
}
