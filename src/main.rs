//! regsearch - Registry Search and Export Client
//!
//! A command-line client for record registries with a paginated search API.
//! Searches print a page of results; exports walk every page of the result
//! set and write it as a JSON or CSV file.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::Level;

use regsearch::api::HttpSearchClient;
use regsearch::cli::{CliInterface, Commands, ConfigAction, ExportArgs, SearchArgs};
use regsearch::config::Config;
use regsearch::error::Result;
use regsearch::export::{ExportCoordinator, ExportFormat, ProgressTracker};
use regsearch::query::{QueryStateManager, RequestToken, SearchQuery};
use regsearch::state::{AppState, ExportJobState};

/// Application entry point
#[tokio::main]
async fn main() {
    // Initialize the application and handle any errors
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// This function orchestrates the application startup:
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Dispatch the subcommand
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    // Parse command-line arguments and load configuration
    let cli = CliInterface::new()?;

    // Initialize logging based on verbosity
    initialize_logging(&cli);

    match &cli.args().command {
        Commands::Search(args) => run_search(&cli, args).await,
        Commands::Export(args) => run_export(&cli, args).await,
        Commands::Config { action } => handle_config(&cli, action),
    }
}

/// Run a search and print one page of results
async fn run_search(cli: &CliInterface, args: &SearchArgs) -> Result<()> {
    let query = cli.build_query(args)?;
    let (_backend, manager, state) = setup_session(cli)?;

    manager.submit_query(query).await;

    let state = state.read().await;
    if let Some(info) = state.error() {
        return Err(format!("search failed: {info}").into());
    }

    let Some(page) = state.results() else {
        return Err("search produced no response".into());
    };

    println!("{}", serde_json::to_string_pretty(&page.results).map_err(|e| e.to_string())?);
    if !cli.args().quiet {
        println!(
            "Showing {} of {} records (page {})",
            page.results.len(),
            page.count,
            args.page
        );
    }
    Ok(())
}

/// Run a full export and write the produced file to disk
async fn run_export(cli: &CliInterface, args: &ExportArgs) -> Result<()> {
    let format: ExportFormat = args.format.parse()?;
    let query: SearchQuery = cli.build_query(&args.search)?;
    let (backend, manager, state) = setup_session(cli)?;

    // Export presumes a completed search: run one first, as the search
    // page does before its download button is enabled.
    manager.submit_query(query).await;
    {
        let state = state.read().await;
        if let Some(info) = state.error() {
            return Err(format!("search failed: {info}").into());
        }
    }

    let show_bar = cli.config().export.progress_bar && !args.no_progress && !cli.args().quiet;
    let tracker = ProgressTracker::new(show_bar);

    // Ctrl+C cancels the export between page fetches
    let cancel = RequestToken::new();
    let cancel_clone = cancel.clone();
    let ctrl_c_handle = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                cancel_clone.cancel("interrupted by user");
            }
            Err(err) => {
                eprintln!("Failed to listen for Ctrl+C: {}", err);
            }
        }
    });

    let mut coordinator =
        ExportCoordinator::new(backend, state.clone(), tracker, cli.config().export.clone())
            .with_cancellation(cancel);
    let outcome = coordinator.run(format).await;

    ctrl_c_handle.abort();

    match outcome? {
        Some(file) => {
            let path = output_path(cli, args, &file.filename);
            tokio::fs::write(&path, &file.bytes).await?;
            println!("Exported {} bytes to {} ({})", file.bytes.len(), path.display(), file.content_type);
            Ok(())
        }
        None => {
            let state = state.read().await;
            match state.export_job() {
                ExportJobState::Cancelled => {
                    println!("Export cancelled");
                    Ok(())
                }
                _ => Err("nothing to export: the search returned no records".into()),
            }
        }
    }
}

/// Handle config subcommands
fn handle_config(cli: &CliInterface, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", cli.config().to_toml()?);
            Ok(())
        }
        ConfigAction::Init => {
            let path = Config::default_path()
                .ok_or("could not determine the configuration directory")?;
            Config::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
        ConfigAction::Path => {
            let path = Config::default_path()
                .ok_or("could not determine the configuration directory")?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Build the backend, shared state, and query manager for one session
fn setup_session(
    cli: &CliInterface,
) -> Result<(Arc<HttpSearchClient>, QueryStateManager, Arc<RwLock<AppState>>)> {
    let backend = Arc::new(HttpSearchClient::new(&cli.config().api)?);
    let state = Arc::new(RwLock::new(AppState::new()));
    let manager = QueryStateManager::new(backend.clone(), state.clone());
    Ok((backend, manager, state))
}

/// Resolve where the exported file lands.
///
/// An explicit `--output` pointing at a directory gets the generated
/// filename appended; a file path is used as-is. Without `--output`, the
/// configured output directory or the current directory is used.
fn output_path(cli: &CliInterface, args: &ExportArgs, filename: &str) -> PathBuf {
    match &args.output {
        Some(path) if path.is_dir() => path.join(filename),
        Some(path) => path.clone(),
        None => match &cli.config().export.output_dir {
            Some(dir) => dir.join(filename),
            None => PathBuf::from(filename),
        },
    }
}

/// Initialize logging system based on verbosity level
///
/// # Arguments
/// * `cli` - CLI interface with verbosity settings
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    // Build subscriber with level filter
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    // Configure timestamps
    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
