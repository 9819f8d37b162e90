mod calculator;
mod cli;
mod error;
mod extractor;
mod fmt;
mod models;
mod pipeline;
mod settings;
mod sources;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands, ConfigCommands};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "warn,yieldgap=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Assess { ein, rate, json } => cli::assess::run(&ein, rate.as_deref(), json).await,
        Commands::Inspect {
            file,
            profile,
            rate,
            json,
        } => cli::inspect::run(&file, profile.as_deref(), rate.as_deref(), json),
        Commands::Search { query, limit } => cli::search::run(&query, limit).await,
        Commands::Benchmark => cli::benchmark::run().await,
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Set {
                fallback_rate,
                user_agent,
                timeout_secs,
            } => cli::config::set(fallback_rate.as_deref(), user_agent.as_deref(), timeout_secs),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
