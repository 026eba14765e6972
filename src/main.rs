use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vellum::config::DataConfig;
use vellum::migrate::{self, Context, backup, versioning};
use vellum::store::SqliteStore;

#[derive(Parser)]
#[command(name = "vellum")]
#[command(about = "CMS data-layer bootstrap and migration", long_about = None)]
struct Cli {
    /// Data directory for the database and exported backups
    #[arg(long, global = true, default_value = "./data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize or upgrade the database to the current version
    Init,

    /// Show the stored database version and the version this build targets
    Version,

    /// Write a JSON snapshot of all domain data
    Export,

    /// Delete every table (destructive; requires --force)
    Reset {
        #[arg(long)]
        force: bool,
    },
}

fn open_context(data_dir: &str) -> anyhow::Result<Context> {
    let data_path: PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let config = DataConfig::new(data_path);
    let store = SqliteStore::new(config.db_path())?;
    Ok(Context::new(Arc::new(store), config))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let ctx = open_context(&cli.data_dir)?;

    match cli.command {
        Commands::Init => {
            if let Err(e) = migrate::init(&ctx) {
                tracing::error!("Migration failed: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Version => {
            let target = versioning::default_version();
            match versioning::database_version(ctx.store.as_ref()) {
                Ok(database) => println!("database: {database}\ntarget:   {target}"),
                Err(vellum::error::Error::NotInitialized) => {
                    println!("database: (not initialized)\ntarget:   {target}");
                }
                Err(e) => return Err(e.into()),
            }
            Ok(())
        }
        Commands::Export => {
            let path = backup::backup_database(ctx.store.as_ref(), &ctx.config)?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Reset { force } => {
            if !force {
                bail!("refusing to delete all tables without --force");
            }
            migrate::reset(&ctx)?;
            info!("Database reset");
            Ok(())
        }
    }
}
