// Configuration management module
// TOML settings for chunking, retrieval and the LLM provider

pub mod settings;


use anyhow::Result;
use console::style;

pub use settings::{Config, ConfigError, LlmConfig, LlmProvider, RetrievalConfig};

/// Print the effective configuration
#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", style("📋 Current Configuration").bold().cyan());
    println!();

    println!("{}", style("Chunking:").bold().yellow());
    println!(
        "  Metadata Prefix: {} characters",
        style(config.chunking.metadata_prefix_chars).cyan()
    );

    println!();
    println!("{}", style("Retrieval:").bold().yellow());
    println!(
        "  Index Strategy: {}",
        style(config.retrieval.index_strategy).cyan()
    );
    println!(
        "  Per-Query Top K: {}",
        style(config.retrieval.per_query_top_k).cyan()
    );
    println!(
        "  Context Chunk Limit: {}",
        style(config.retrieval.context_chunk_limit).cyan()
    );

    println!();
    println!("{}", style("LLM:").bold().yellow());
    println!("  Provider: {}", style(config.llm.provider).cyan());
    println!("  Model: {}", style(&config.llm.model).cyan());
    println!("  Max Tokens: {}", style(config.llm.max_tokens).cyan());
    println!(
        "  Timeout: {}s, {} attempts",
        style(config.llm.timeout_seconds).cyan(),
        style(config.llm.retry_attempts).cyan()
    );
    if config.llm.provider == LlmProvider::Bedrock {
        println!("  AWS Region: {}", style(&config.llm.aws_region).cyan());
    } else {
        match config.llm.endpoint() {
            Ok(url) => println!("  API URL: {}", style(url).cyan()),
            Err(e) => println!("  API URL: {} ({})", style("Invalid").red(), e),
        }
        let key_status = if config.llm.api_key().is_some() {
            style("set").green()
        } else {
            style("not set").red()
        };
        println!("  API Key (${}): {}", config.llm.api_key_env, key_status);
    }

    println!();
    println!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}
