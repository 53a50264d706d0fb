use clap::{Parser, Subcommand};
use std::path::PathBuf;
use td_lineage::{LineageError, Result};
use td_lineage::commands::{
    ConfigUpdate, config_command, index_command, lineage_command, search_command,
};
use td_lineage::config::Config;

#[derive(Parser)]
#[command(name = "td-lineage")]
#[command(about = "Column-level lineage for Teradata SQL code, backed by TF-IDF retrieval and an LLM")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml (default: ~/.td-lineage)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and index a repository, then print corpus statistics
    Index {
        /// Path to a local checkout of the SQL repository
        repo: PathBuf,
    },
    /// Search the indexed code with a free-text query
    Search {
        repo: PathBuf,
        query: String,
        /// Number of chunks to show
        #[arg(long, default_value_t = 5)]
        top_k: usize,
    },
    /// Trace how a column is derived
    Lineage {
        repo: PathBuf,
        /// Target table, e.g. SALES.DAILY_TOTALS
        #[arg(long)]
        table: String,
        /// Target column
        #[arg(long)]
        column: String,
        /// Maximum number of upstream levels to trace
        #[arg(long, default_value_t = 5)]
        max_depth: u32,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update LLM settings or write the defaults, then show the configuration
    Config {
        /// Only show the current configuration
        #[arg(long)]
        show: bool,
        /// Base URL of the LLM API
        #[arg(long)]
        base_url: Option<String>,
        /// Model identifier
        #[arg(long)]
        model: Option<String>,
        /// Maximum tokens per completion
        #[arg(long)]
        max_tokens: Option<u32>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match cli.config_dir {
        Some(dir) => Config::load(dir),
        None => Config::load_default(),
    }
    .map_err(|e| LineageError::Config(format!("{e:#}")))?;

    match cli.command {
        Commands::Index { repo } => {
            index_command(config, &repo)?;
        }
        Commands::Search { repo, query, top_k } => {
            search_command(config, &repo, &query, top_k)?;
        }
        Commands::Lineage {
            repo,
            table,
            column,
            max_depth,
            json,
        } => {
            lineage_command(config, &repo, &table, &column, max_depth, json)?;
        }
        Commands::Config {
            show,
            base_url,
            model,
            max_tokens,
        } => {
            let update = ConfigUpdate {
                base_url,
                model,
                max_tokens,
            };
            config_command(config, update, show)?;
        }
    }

    Ok(())
}
