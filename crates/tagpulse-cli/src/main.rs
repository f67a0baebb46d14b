mod collect;
mod logging;
mod score;
mod signals;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tagpulse_collector::CancelToken;

#[derive(Debug, Parser)]
#[command(name = "tagpulse")]
#[command(about = "Hashtag feed collection and daily trading signal pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect posts from live hashtag search feeds
    Collect(collect::CollectArgs),
    /// Attach keyword scores and sentiment labels to a raw post table
    Score {
        /// Raw post table (.csv or .parquet); defaults to the newest raw parquet
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Aggregate scored posts into the daily signal table
    Signals {
        /// Scored post table; defaults to the features table
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output CSV; defaults to the signals directory table
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Collect, score, and aggregate in one pass
    Run(collect::CollectArgs),
}

impl Commands {
    fn stage(&self) -> &'static str {
        match self {
            Commands::Collect(_) => "collect",
            Commands::Score { .. } => "score",
            Commands::Signals { .. } => "signals",
            Commands::Run(_) => "run",
        }
    }
}

/// Cancels `token` on the first Ctrl-C so collection stops at the next boundary.
fn spawn_ctrl_c_handler(token: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("received ctrl-c, stopping collection at next boundary");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = tagpulse_core::load_app_config()?;
    logging::init(&config, cli.command.stage())?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Collect(args) => {
            let cancel = CancelToken::new();
            spawn_ctrl_c_handler(cancel.clone());
            collect::run_collect(&config, &args, cancel).await?;
        }
        Commands::Score { input } => {
            score::run_score(&config, input.as_deref())?;
        }
        Commands::Signals { input, output } => {
            signals::run_signals(&config, input.as_deref(), output.as_deref())?;
        }
        Commands::Run(args) => {
            let cancel = CancelToken::new();
            spawn_ctrl_c_handler(cancel.clone());
            let Some(raw) = collect::run_collect(&config, &args, cancel).await? else {
                return Ok(());
            };
            let scored = score::run_score(&config, Some(&raw.parquet))?;
            signals::run_signals(&config, Some(&scored.parquet), None)?;
        }
    }

    Ok(())
}
