//! Order Service - command-line entry point.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::{AppError, AppResult};
use domain::parse_entity_id;
use order_service_lib::{commands, OrderServiceConfig, Session};

#[derive(Parser)]
#[command(name = "order-service")]
#[command(about = "Typed repositories and order aggregation over a document database")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use a process-local store instead of MongoDB
    #[arg(long, global = true)]
    memory: bool,

    /// Connection string
    #[arg(long, global = true, env = "MONGODB_URI")]
    uri: Option<String>,

    /// Database name
    #[arg(long, global = true, env = "MONGODB_DATABASE")]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert and read back a message, then aggregate order totals
    Demo,
    /// Print per-customer totals of status "A" orders
    Aggregate,
    /// Print orders matching the flagged-order filter
    Flagged,
    /// Fetch a message by identifier
    Get {
        /// 24 character hex identifier
        id: String,
    },
    /// Insert sample orders
    Seed,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() {
    // Load .env before parsing so env-backed flags see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!(code = e.code(), "Command failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = OrderServiceConfig::from_env()?;
    if let Some(uri) = cli.uri {
        config.database.uri = uri;
    }
    if let Some(database) = cli.database {
        config.database.database = database;
    }
    tracing::debug!(?config, memory = cli.memory, "Configuration loaded");

    let session = if cli.memory {
        Session::in_memory(config.collections.clone())
    } else {
        Session::connect(&config).await?
    };

    let result = execute(&session, cli.command).await;
    session.close().await;
    result
}

async fn execute(session: &Session, command: Commands) -> AppResult<()> {
    match command {
        Commands::Demo => {
            let report = commands::run_demo(session).await?;
            println!("{}", report.message.string_data);
            print_json(&report.totals)
        }
        Commands::Aggregate => print_json(&commands::customer_totals(session).await?),
        Commands::Flagged => print_json(&commands::flagged_orders(session).await?),
        Commands::Get { id } => {
            let id = parse_entity_id(&id)?;
            match commands::get_message(session, id).await? {
                Some(message) => print_json(&message),
                None => {
                    println!("not found");
                    Ok(())
                }
            }
        }
        Commands::Seed => {
            for id in commands::seed_orders(session).await? {
                println!("{}", id);
            }
            Ok(())
        }
        Commands::Ping => {
            session.ping().await?;
            println!("ok");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::internal(format!("failed to render output: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_connection_flags_read_environment() {
        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(OsStr::to_os_string)
        };

        assert_eq!(env_of("uri").as_deref(), Some(OsStr::new("MONGODB_URI")));
        assert_eq!(env_of("database").as_deref(), Some(OsStr::new("MONGODB_DATABASE")));
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "order-service",
            "--memory",
            "--uri",
            "mongodb://db:27017",
            "get",
            "65f0c0ffee0000000000beef",
        ])
        .unwrap();

        assert!(cli.memory);
        assert_eq!(cli.uri.as_deref(), Some("mongodb://db:27017"));
        assert!(matches!(cli.command, Commands::Get { ref id } if id == "65f0c0ffee0000000000beef"));
    }
}
