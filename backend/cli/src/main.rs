mod config;
mod config_cmd;
mod play_cmd;
mod sample_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use bargain_config::Variant;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use config::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "bargain")]
#[command(about = "Bargainer: round-based split-the-pot negotiation")]
#[command(version)]
struct Cli {
    /// Path to config.yaml (defaults to $BARGAIN_CONFIG or ~/.bargain/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or RUST_LOG-style directive
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct SessionArgs {
    /// Offer variant: fixed (B-favored, accept/reject) or alternating (counter-offers)
    #[arg(short, long)]
    variant: Option<Variant>,

    /// Seed for reproducible offers
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of rounds before the session ends without agreement
    #[arg(long)]
    max_rounds: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive session
    Play {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Draw many offers per round and print their distribution
    Sample {
        #[command(flatten)]
        session: SessionArgs,
        /// Rounds to sample (defaults to maxRounds)
        #[arg(short, long)]
        rounds: Option<u32>,
        /// Draws per round
        #[arg(short, long, default_value_t = 10_000)]
        draws: usize,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config path if it does not exist
        #[arg(long)]
        init: bool,
    },
}

fn overrides(session: SessionArgs, log_level: Option<String>) -> Overrides {
    Overrides {
        variant: session.variant,
        seed: session.seed,
        max_rounds: session.max_rounds,
        log_level,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { session } => {
            let settings = Settings::load(cli.config, overrides(session, cli.log_level)).await?;
            bargain_logging::init_logger(settings.config.log_dir(), settings.config.log_level())?;
            info!(config = %settings.config_path.display(), "Starting interactive session");
            play_cmd::run(settings).await?;
        }
        Commands::Sample { session, rounds, draws } => {
            let settings = Settings::load(cli.config, overrides(session, cli.log_level)).await?;
            bargain_logging::init_console_logger(settings.config.log_level());
            sample_cmd::run(settings, rounds, draws).await?;
        }
        Commands::Config { init } => {
            let settings = Settings::load(cli.config, overrides(SessionArgs::default(), cli.log_level)).await?;
            bargain_logging::init_console_logger(settings.config.log_level());
            config_cmd::run(settings, init).await?;
        }
    }

    Ok(())
}
