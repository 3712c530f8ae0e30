// crates/lockstake-cli/src/main.rs
//
// CLI entrypoint for the Lockstake operator tools.
//
// Provides subcommands for quoting multipliers, dumping the multiplier
// matrix, and replaying staking scenarios against an in-memory engine.

mod commands;
mod config;
mod output;

use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use commands::matrix::MatrixCmd;
use commands::quote::QuoteCmd;
use commands::simulate::SimulateCmd;
use config::LockstakeConfig;
use lockstake_economics::StrategyKind;
use output::OutputFormat;

/// Lockstake CLI: multiplier quotes and staking lifecycle simulation.
#[derive(Parser, Debug)]
#[command(
    name = "lockstake",
    version = "0.1.0",
    about = "Lockstake operator CLI for the collateral-staking ledger"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "lockstake.toml")]
    config: String,

    /// Override the configured multiplier strategy.
    #[arg(long, global = true, value_enum)]
    strategy: Option<StrategyArg>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute the multiplier for one amount and lockup.
    Quote(QuoteCmd),

    /// Sweep the multiplier over amount and lockup grids (CSV).
    Matrix(MatrixCmd),

    /// Replay a scenario file and report positions and notifications.
    Simulate(SimulateCmd),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Tiered,
    Logarithmic,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Tiered => StrategyKind::Tiered,
            StrategyArg::Logarithmic => StrategyKind::Logarithmic,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // does not exist. A file that exists but fails to parse is an error.
    let from_file = Path::new(&cli.config).exists();
    let mut config = if from_file {
        LockstakeConfig::load(&cli.config)?
    } else {
        LockstakeConfig::default()
    };

    // Initialize tracing subscriber for structured logging. Logs go to stderr
    // so table, CSV, and JSON output stay clean on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if from_file {
        tracing::debug!("Loaded configuration from {}", cli.config);
    } else {
        tracing::debug!("No config at {}. Using defaults.", cli.config);
    }

    // --strategy overrides the config file value.
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy.into();
    }
    let strategy = config.strategy.build();
    let format = OutputFormat::from_flag(cli.json);

    match &cli.command {
        Commands::Quote(cmd) => commands::quote::run(cmd, strategy.as_ref(), format)?,
        Commands::Matrix(cmd) => commands::matrix::run(cmd, strategy.as_ref(), format)?,
        Commands::Simulate(cmd) => commands::simulate::run(cmd, &config, format)?,
    }

    Ok(())
}
