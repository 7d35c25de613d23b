//! Command-line entry point for the people service.
//!
//! # Responsibility
//! - Load settings from the environment and start logging.
//! - `serve` (default): run the HTTP server until Ctrl+C or SIGTERM.
//! - `check`: open the store, apply migrations and print a summary.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use people_core::db::migrations::{current_version, latest_version};
use people_core::db::open_target;
use people_core::{init_logging, LogTarget, PersonService, SqlitePersonRepository};
use people_server::{Server, Settings};

#[derive(Parser)]
#[command(name = "people")]
#[command(version)]
#[command(about = "Minimal person registry over HTTP", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); overrides LOG_LEVEL
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Write rotating log files to this absolute directory instead of stdout
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Default)]
enum Commands {
    /// Start the HTTP server
    #[default]
    Serve,

    /// Validate configuration and storage, then exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::from_env().context("failed to load settings")?;

    let level = cli.log_level.as_deref().unwrap_or(settings.log_level);
    let target = match cli.log_dir {
        Some(dir) => LogTarget::Directory(dir),
        None => LogTarget::Stdout,
    };
    init_logging(level, &target).map_err(|err| anyhow!(err))?;

    match cli.command.unwrap_or_default() {
        Commands::Serve => serve(settings).await,
        Commands::Check => check(&settings),
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let server = Server::from_settings(settings).context("failed to prepare server")?;
    server.run().await.context("server stopped with an error")
}

fn check(settings: &Settings) -> Result<()> {
    let conn = open_target(&settings.database).context("failed to open database")?;
    let schema_version = current_version(&conn).context("failed to read schema version")?;
    let people = PersonService::new(SqlitePersonRepository::new(&conn))
        .count_people()
        .context("failed to count people")?;

    info!(
        "event=check module=cli status=ok schema_version={} people={}",
        schema_version, people
    );

    println!("database: {}", settings.database);
    println!("schema_version: {schema_version}/{}", latest_version());
    println!("people: {people}");
    println!("debug: {}", settings.debug);
    println!("allowed_hosts: {}", settings.allowed_hosts.join(","));
    println!(
        "frontend_origin: {}",
        settings.frontend_origin.to_str().unwrap_or("<non-ascii>")
    );
    println!("route_layout: {}", settings.route_layout);
    println!("list_path: {}", settings.list_path());
    println!("create_path: {}", settings.create_path());
    println!("bind_addr: {}", settings.bind_addr);
    Ok(())
}
