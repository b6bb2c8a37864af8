use crate::github::DEFAULT_ENDPOINT;
use crate::logging::init_logging;
use crate::readme::{DEFAULT_END_MARKER, DEFAULT_START_MARKER};
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

#[derive(Parser)]
#[command(name = "contribmap")]
#[command(about = "Render a contribution heatmap and summary into a README between markers")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct CommonArgs {
    #[arg(long, help = "Document to patch", default_value = "README.md")]
    pub readme: PathBuf,

    #[arg(long, help = "Directory for the heatmap images", default_value = "assets")]
    pub assets_dir: PathBuf,

    #[arg(long, help = "Directory for the series snapshot and summary", default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(
        long,
        env = "CONTRIB_WINDOW_DAYS",
        help = "Number of trailing days to aggregate",
        default_value_t = 365,
        value_parser = clap::value_parser!(u32).range(1..=366)
    )]
    pub window_days: u32,

    #[arg(long, help = "Last day of the window (YYYY-MM-DD), defaults to today in UTC")]
    pub today: Option<String>,

    #[arg(long, help = "Line marking the start of the generated section", default_value = DEFAULT_START_MARKER)]
    pub start_marker: String,

    #[arg(long, help = "Line marking the end of the generated section", default_value = DEFAULT_END_MARKER)]
    pub end_marker: String,

    #[arg(long, help = "Show what would change without writing anything")]
    pub dry_run: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,

    #[arg(short, long, help = "Only log errors")]
    pub quiet: bool,
}

#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help = "Access token for the GraphQL API")]
    pub token: Option<String>,

    #[arg(long, help = "GraphQL endpoint", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, help = "Request timeout (e.g. 30s, 1m)", default_value = "30s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, aggregate, render and patch the document
    Run {
        #[clap(flatten)]
        source: SourceArgs,
    },
    /// Same as `run`, from a raw record saved as JSON
    Render {
        #[arg(long, help = "Raw activity record (JSON)")]
        input: PathBuf,
    },
    /// Print statistics and a terminal heatmap without writing anything
    Stats {
        #[arg(long, help = "Raw activity record (JSON); fetches live when omitted")]
        input: Option<PathBuf>,

        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[clap(flatten)]
        source: SourceArgs,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        init_logging(self.common.verbose, self.common.quiet);

        let outcome = match &self.command {
            Commands::Run { source } => crate::pipeline::exec_run(&self.common, source),
            Commands::Render { input } => crate::pipeline::exec_render(&self.common, input),
            Commands::Stats { input, json, source } => {
                crate::pipeline::exec_stats(&self.common, source, input.as_deref(), *json)
            }
        };

        outcome.map_err(|e| {
            error!(kind = e.kind(), "Run failed: {e}");
            anyhow::Error::new(e)
        })
    }
}
