use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use tracing::info;

use crate::config::{Config, show_config};
use crate::indexer::{CorpusStats, Indexer};
use crate::lineage::{LineageAnalyzer, LineageReport};
use crate::llm::client_from_config;
use crate::parser::TeradataParser;

/// Parse every Teradata source under `repo` and build an in-memory index over it
#[inline]
pub fn index_repository(config: Config, repo: &Path) -> Result<Indexer> {
    info!("Indexing repository: {}", repo.display());

    let parsed_files = TeradataParser::new(repo)
        .parse_all_files()
        .with_context(|| format!("Failed to parse repository {}", repo.display()))?;

    let indexer = Indexer::new(config);
    indexer
        .index(&parsed_files)
        .context("Failed to build the search index")?;

    Ok(indexer)
}

/// Index `repo` and report what was found
#[inline]
pub fn index_command(config: Config, repo: &Path) -> Result<()> {
    let indexer = index_repository(config, repo)?;
    print_stats(&indexer.stats());
    Ok(())
}

/// Index `repo` and print the chunks closest to `query`
#[inline]
pub fn search_command(config: Config, repo: &Path, query: &str, top_k: usize) -> Result<()> {
    let indexer = index_repository(config, repo)?;
    let chunks = indexer.retrieve(query, top_k);

    if chunks.is_empty() {
        println!("No matching code found for '{}'.", query);
        return Ok(());
    }

    println!(
        "{}",
        style(format!("🔎 {} results for '{}'", chunks.len(), query))
            .bold()
            .cyan()
    );
    for (rank, chunk) in chunks.iter().enumerate() {
        println!();
        println!("{}. {}", rank + 1, style(&chunk.id).bold());
        if !chunk.tables().is_empty() {
            println!("   Tables: {}", chunk.tables().join(", "));
        }
        for line in chunk.text.trim().lines().take(8) {
            println!("   {}", style(line).dim());
        }
    }

    Ok(())
}

/// Index `repo`, trace `table.column` and print the resulting lineage
#[inline]
pub fn lineage_command(
    config: Config,
    repo: &Path,
    table: &str,
    column: &str,
    max_depth: u32,
    json: bool,
) -> Result<()> {
    let llm = client_from_config(&config.llm).context("Failed to initialize LLM client")?;
    let indexer = index_repository(config, repo)?;
    info!("Using LLM: {}", llm.describe());

    let report = LineageAnalyzer::new(&indexer, llm.as_ref())
        .analyze_column_lineage(table, column, max_depth)
        .with_context(|| format!("Lineage analysis failed for {}.{}", table, column))?;

    let Some(report) = report else {
        println!("No relevant code found for {}.{}", table, column);
        return Ok(());
    };

    if json {
        let output =
            serde_json::to_string_pretty(&report).context("Failed to serialize lineage report")?;
        println!("{}", output);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// LLM settings given on the command line for `config`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

impl ConfigUpdate {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.base_url.is_none() && self.model.is_none() && self.max_tokens.is_none()
    }

    /// Validate and apply every requested value through the config setters
    #[inline]
    pub fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(base_url) = self.base_url {
            config
                .llm
                .set_base_url(base_url)
                .context("Invalid --base-url")?;
        }
        if let Some(model) = self.model {
            config.llm.set_model(model).context("Invalid --model")?;
        }
        if let Some(max_tokens) = self.max_tokens {
            config
                .llm
                .set_max_tokens(max_tokens)
                .context("Invalid --max-tokens")?;
        }
        Ok(())
    }
}

/// Apply `update` and save, or write the defaults when no file exists yet; then show the result.
///
/// With `show` and no update, nothing is written.
#[inline]
pub fn config_command(mut config: Config, update: ConfigUpdate, show: bool) -> Result<()> {
    if !update.is_empty() {
        update.apply(&mut config)?;
        config.save().context("Failed to save configuration")?;
        info!("Saved configuration to {}", config.config_file_path().display());
        println!(
            "{}",
            style(format!(
                "✓ Updated configuration at {}",
                config.config_file_path().display()
            ))
            .green()
        );
        println!();
    } else if !show && !config.config_file_path().exists() {
        config.save().context("Failed to write default configuration")?;
        println!(
            "{}",
            style(format!(
                "✓ Wrote default configuration to {}",
                config.config_file_path().display()
            ))
            .green()
        );
        println!();
    }

    show_config(&config)
}

fn print_stats(stats: &CorpusStats) {
    println!("{}", style("Indexing completed").bold().green());
    println!("  Total files: {}", stats.total_files);
    println!("  SQL files: {}", stats.sql_files);
    println!("  BTEQ files: {}", stats.bteq_files);
    println!("  Shell scripts: {}", stats.ksh_files);
    println!("  Code chunks: {}", stats.total_chunks);
}

fn print_report(report: &LineageReport) {
    println!(
        "{}",
        style(format!(
            "🧬 Lineage for {}.{}",
            report.target.table, report.target.column
        ))
        .bold()
        .cyan()
    );
    println!();
    println!("{}", style("Summary:").bold().yellow());
    println!("  {}", report.summary);

    if !report.validate() {
        println!();
        println!("{}", style("⚠️  No lineage chain could be identified").yellow());
    }

    println!();
    println!("{}", style("Lineage Chain:").bold().yellow());
    for step in &report.lineage_chain {
        println!(
            "  Level {}: {}.{} ({})",
            step.level, step.table, step.column, step.operation
        );
        if let Some(transformation) = &step.transformation {
            println!("    Transformation: {}", transformation);
        }
        if !step.source_file.is_empty() {
            match step.line_number {
                Some(line) => println!("    File: {}:{}", step.source_file, line),
                None => println!("    File: {}", step.source_file),
            }
        }
    }

    println!();
    println!("{}", style("Source Tables:").bold().yellow());
    if report.source_tables.is_empty() {
        println!("  None identified");
    }
    for source in &report.source_tables {
        println!("  {}", source.table_name);
        if !source.columns.is_empty() {
            println!("    Columns: {}", source.columns.join(", "));
        }
        if let Some(join_type) = &source.join_type {
            println!("    Join: {}", join_type);
        }
        if let Some(filter) = &source.filter_conditions {
            println!("    Filter: {}", filter);
        }
    }

    println!();
    println!("{}", style("Transformations:").bold().yellow());
    for line in report.transformations_summary().lines() {
        println!("  {}", line);
    }

    let upstream = report.upstream_tables();
    if !upstream.is_empty() {
        println!();
        println!("Upstream tables: {}", style(upstream.join(", ")).cyan());
    }

    if report.is_fallback() {
        println!();
        println!(
            "{}",
            style("The LLM response could not be parsed; showing raw text.").dim()
        );
    }
}
