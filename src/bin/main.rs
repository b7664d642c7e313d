//! schemascope CLI - Inspect database schemas through the worker
//!
//! Usage:
//!   schemascope [--connection <name>] [--dialect <dialect>] tables
//!   schemascope views
//!   schemascope columns <name> [--schema <schema>]
//!   schemascope primary-key <name> [--schema <schema>]
//!   schemascope snapshot
//!
//! Examples:
//!   schemascope --connection warehouse tables
//!   schemascope primary-key ORDERS --schema SALES
//!   RUST_LOG=schemascope=debug schemascope snapshot > schema.json

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use schemascope::config::Settings;
use schemascope::worker::{WorkerClient, WorkerConnection, WorkerResult};
use schemascope::{Dialect, ObjectName, SchemaReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemascope")]
#[command(about = "schemascope - Multi-dialect database schema introspection")]
#[command(version)]
struct Cli {
    /// Path to a schemascope.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Named connection from the config file (default connection if omitted)
    #[arg(short, long, global = true)]
    connection: Option<String>,

    /// Override the connection's introspection dialect
    #[arg(short, long, global = true)]
    dialect: Option<DialectArg>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List base tables as schema.name
    Tables,

    /// List views as schema.name
    Views,

    /// Print column types of a table or view as JSON
    Columns {
        /// Table or view name
        name: String,

        /// Schema (connection default, else current schema)
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// Print primary-key columns in key order
    PrimaryKey {
        /// Table name
        name: String,

        /// Schema (connection default, else current schema)
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// Print a full JSON snapshot of tables, views, columns and keys
    Snapshot,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Snowflake,
    Postgres,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Postgres => Dialect::Postgres,
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "schemascope=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };

    let (name, conn_settings) = settings.select_connection(cli.connection.as_deref())?;
    let dialect = match cli.dialect {
        Some(arg) => arg.into(),
        None => conn_settings.dialect(name)?,
    };
    let default_schema = conn_settings.default_schema.clone().unwrap_or_default();
    debug!(connection = name, %dialect, "using connection");

    let client = Arc::new(WorkerClient::spawn_with_settings(&settings.worker).await?);
    let conn = WorkerConnection::open(
        client,
        conn_settings.driver.clone(),
        conn_settings.resolved_connection_string()?,
    )
    .await?;

    let mut reader = SchemaReader::new(dialect, conn);
    let result = run_command(&mut reader, cli.command, &default_schema).await;
    let closed = reader.into_inner().close().await;
    settle(result, closed)
}

/// A command error wins over a failure to close the session.
fn settle(result: CliResult<()>, closed: WorkerResult<()>) -> CliResult<()> {
    match (result, closed) {
        (Err(e), Err(close_err)) => {
            warn!(error = %close_err, "failed to close worker session");
            Err(e)
        }
        (Ok(()), Err(close_err)) => Err(close_err.into()),
        (result, Ok(())) => result,
    }
}

async fn run_command(
    reader: &mut SchemaReader<WorkerConnection>,
    command: Commands,
    default_schema: &str,
) -> CliResult<()> {
    match command {
        Commands::Tables => print_names(&reader.tables().await?),
        Commands::Views => print_names(&reader.views().await?),
        Commands::Columns { name, schema } => {
            let schema = schema.as_deref().unwrap_or(default_schema);
            let columns = reader.column_types(schema, &name).await?;
            println!("{}", serde_json::to_string_pretty(&columns)?);
        }
        Commands::PrimaryKey { name, schema } => {
            let schema = schema.as_deref().unwrap_or(default_schema);
            for column in reader.primary_key(schema, &name).await? {
                println!("{}", column);
            }
        }
        Commands::Snapshot => {
            let snapshot = reader.snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }
    Ok(())
}

fn print_names(names: &[ObjectName]) {
    for name in names {
        println!("{}", name);
    }
}
