//! Tally limits CLI - inspect service levels and limits derived from payments
//!
//! Reads a JSON payment ledger and answers what each organization is entitled
//! to, now or at any instant.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use tally_limits_cli::{
    commands, open_facade, parse_output_format, LedgerFacade, LimitsCliConfig, OutputFormat,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tally-limits",
    version,
    about = "Service levels and limits derived from organization payments",
    author = "Tally Team"
)]
struct Cli {
    /// Payment ledger JSON file
    #[arg(long)]
    ledger: Option<std::path::PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the service limits of an organization
    Limits {
        /// Organization identifier
        #[arg(long)]
        org: String,

        /// Instant to evaluate, with any UTC offset (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// List payments of an organization, newest coverage first
    Payments {
        /// Organization identifier
        #[arg(long)]
        org: String,
    },

    /// Show current limits of every organization in the ledger
    Workspaces,

    /// Report malformed payment records
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = LimitsCliConfig::new();

    // Use configuration with CLI overrides
    let ledger_path = cli.ledger.as_ref().unwrap_or(&config.ledger_path);
    let default_output_format = parse_output_format(&config.default_output_format)?;
    let output_format = cli.output.unwrap_or(default_output_format);

    let result = open_facade(ledger_path)
        .await
        .and_then(|facade| execute_command(&cli, &facade, output_format, &config));

    match result {
        Ok(output) => println!("{output}"),
        Err(e) => {
            match output_format {
                OutputFormat::Human => eprintln!("Error: {e}"),
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "success": false,
                        "error": e.to_string()
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

fn execute_command(
    cli: &Cli,
    facade: &LedgerFacade,
    output_format: OutputFormat,
    config: &LimitsCliConfig,
) -> Result<String> {
    match &cli.command {
        Commands::Limits { org, at } => {
            commands::execute_limits(facade, org, at.as_deref(), output_format, config)
        }
        Commands::Payments { org } => commands::execute_payments(facade, org, output_format, config),
        Commands::Workspaces => commands::execute_workspaces(facade, output_format, config),
        Commands::Check => commands::execute_check(facade, output_format, config),
    }
}
