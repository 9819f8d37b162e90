pub mod assess;
pub mod benchmark;
pub mod config;
pub mod inspect;
pub mod render;
pub mod search;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "yieldgap",
    version,
    about = "Estimate the investment income a nonprofit forgoes on idle cash."
)]
pub struct Cli {
    /// Log retrieval and extraction details to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch an organization's latest e-filed return and assess its cash yield.
    Assess {
        /// Employer Identification Number, e.g. 53-0196605
        ein: String,
        /// Benchmark rate as a fraction (e.g. 0.04); skips the Treasury lookup
        #[arg(long)]
        rate: Option<String>,
        /// Print machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Assess a filing XML already on disk, without any network access.
    Inspect {
        /// Path to the e-filed return XML
        file: String,
        /// Saved profile page; when given it must link a digital filing
        #[arg(long)]
        profile: Option<String>,
        /// Benchmark rate as a fraction (default: the configured fallback rate)
        #[arg(long)]
        rate: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Search organizations by name.
    Search {
        /// Name or keywords
        query: String,
        /// Maximum rows to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Show the current benchmark rate.
    Benchmark,
    /// View or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings and where they are stored.
    Show,
    /// Update one or more settings.
    Set {
        /// Benchmark rate used when the Treasury feed is unavailable
        #[arg(long = "fallback-rate")]
        fallback_rate: Option<String>,
        /// User-Agent header for outbound requests
        #[arg(long = "user-agent")]
        user_agent: Option<String>,
        /// Request timeout in seconds
        #[arg(long = "timeout-secs")]
        timeout_secs: Option<u64>,
    },
}
