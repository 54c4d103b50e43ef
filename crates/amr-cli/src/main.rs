use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "amr-collect")]
#[command(about = "Reconcile AMR meter radio messages from stdin into InfluxDB", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Preload history, then ingest newline-delimited JSON from stdin (default)
    Run {
        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Print config hash, canonical JSON and the resolved (redacted) settings
    Config {
        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Compute the serial checksum for an endpoint id, or verify a given one
    Checksum {
        /// Endpoint (ERT serial) id
        #[arg(long)]
        id: u32,

        /// Checksum to verify (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = commands::checksum::parse_u16)]
        crc: Option<u16>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Best-effort dev convenience; absent file is fine.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd.unwrap_or(Commands::Run {
        config_paths: Vec::new(),
    }) {
        Commands::Run { config_paths } => commands::run::run_collect(config_paths).await,
        Commands::Config { config_paths } => commands::config::print_config(config_paths),
        Commands::Checksum { id, crc } => commands::checksum::checksum(id, crc),
    }
}

/// Logs go to stderr; stdout is reserved for command output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
