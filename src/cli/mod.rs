//! Command-line interface for regsearch
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Building a [`SearchQuery`] from filter arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use serde_json::Value;

use crate::api::PAGE_SIZE;
use crate::config::Config;
use crate::error::{QueryError, Result};
use crate::query::SearchQuery;

/// Registry search and bulk export client
#[derive(Parser, Debug)]
#[command(
    name = "regsearch",
    version,
    about = "Search a record registry and export full result sets",
    long_about = "A command-line client for record registries with a paginated search API.
Searches print the first page of results; exports walk every page and write
the full result set as a JSON or CSV file."
)]
pub struct CliArgs {
    /// Registry API base URL (overrides the configured endpoint)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Session token for authenticated requests
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (no progress bar, minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the registry and print one page of results
    Search(SearchArgs),

    /// Walk every result page and export the full set to a file
    Export(ExportArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments shared by search and export
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Filter criterion as `name=value`; repeatable. Comma-separated
    /// values form a multi-select filter
    #[arg(short = 'f', long = "filter", value_name = "NAME=VALUE")]
    pub filters: Vec<String>,

    /// GeoJSON file restricting the search to a region
    #[arg(long, value_name = "FILE")]
    pub region: Option<PathBuf>,

    /// Result page to request (pages hold 20 records)
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub page: u64,
}

/// Export arguments
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Output format (json, csv)
    #[arg(long, value_name = "FORMAT", default_value = "csv")]
    pub format: String,

    /// File or directory the export is written to
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Config subcommand actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init,

    /// Print the default configuration file location
    Path,
}

/// CLI interface combining parsed arguments and loaded configuration
pub struct CliInterface {
    args: CliArgs,
    config: Config,
}

impl CliInterface {
    /// Parse command-line arguments and load configuration.
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build the interface from already-parsed arguments.
    ///
    /// Command-line overrides (endpoint, token) take precedence over the
    /// configuration file.
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let mut config = Config::load(args.config_file.as_deref())?;

        if let Some(endpoint) = &args.endpoint {
            config.api.endpoint = endpoint.clone();
        }
        if let Some(token) = &args.token {
            config.api.auth_token = Some(token.clone());
        }

        Ok(Self { args, config })
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a [`SearchQuery`] from search arguments.
    pub fn build_query(&self, search: &SearchArgs) -> Result<SearchQuery> {
        let mut query = SearchQuery::new();

        for filter in &search.filters {
            let (name, value) = parse_filter(filter)?;
            query.set_criterion(&name, value)?;
        }

        if let Some(path) = &search.region {
            let content = std::fs::read_to_string(path)
                .map_err(|e| QueryError::InvalidRegion(format!("{}: {e}", path.display())))?;
            let region: Value = serde_json::from_str(&content)
                .map_err(|e| QueryError::InvalidRegion(format!("{}: {e}", path.display())))?;
            query.set_region(Some(region));
        }

        if search.page > 1 {
            let offset = (search.page - 1) * PAGE_SIZE;
            query.set_pagination(Some(format!("limit={PAGE_SIZE}&offset={offset}")));
        }

        Ok(query)
    }
}

/// Parse one `name=value` filter argument.
///
/// A comma-separated value becomes a multi-select list.
fn parse_filter(filter: &str) -> Result<(String, Value)> {
    let (name, raw) = filter
        .split_once('=')
        .ok_or_else(|| QueryError::InvalidFilter(format!("expected name=value, got '{filter}'")))?;
    if name.is_empty() {
        return Err(QueryError::InvalidFilter(format!("empty criterion name in '{filter}'")).into());
    }

    let value = if raw.contains(',') {
        Value::Array(raw.split(',').map(|v| Value::String(v.trim().to_string())).collect())
    } else {
        Value::String(raw.to_string())
    };
    Ok((name.to_string(), value))
}
