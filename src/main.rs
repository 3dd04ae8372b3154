//! Magpie-Ledger main entry point
//!
//! This is the command-line interface for the Magpie-Ledger incremental
//! listing harvester.

use clap::Parser;
use magpie_ledger::config::load_config;
use magpie_ledger::pipeline::run_harvest;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Magpie-Ledger: An incremental listing harvester
///
/// Magpie-Ledger walks configured listing sources in a headless browser,
/// extracts each new posting's body text and embedded URLs, fetches the
/// referenced pages, and appends everything to remote append-only stores.
/// Postings recorded by a previous run are never reprocessed.
#[derive(Parser, Debug)]
#[command(name = "magpie-ledger")]
#[command(version = "1.0.0")]
#[command(about = "An incremental listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without running
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => {
            tracing::info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("magpie_ledger=info,warn"),
            1 => EnvFilter::new("magpie_ledger=debug,info"),
            2 => EnvFilter::new("magpie_ledger=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &magpie_ledger::Config) {
    println!("=== Magpie-Ledger Dry Run ===\n");

    println!("Run:");
    if config.run.max_items == 0 {
        println!("  Max items: unlimited");
    } else {
        println!("  Max items: {}", config.run.max_items);
    }

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!(
        "  Delay range: {:.1}s - {:.1}s",
        config.retry.delay_min_secs, config.retry.delay_max_secs
    );

    println!("\nStore:");
    println!("  Base URL: {}", config.store.base_url);
    println!("  Postings table: {}", config.store.postings_table);
    println!("  References table: {}", config.store.references_table);
    println!("  Postings folder: {}", config.store.postings_folder);
    println!("  References folder: {}", config.store.references_folder);

    println!("\nSources ({}):", config.sources.len());
    for source in &config.sources {
        let login = if source.login_required {
            " [login]"
        } else {
            ""
        };
        println!("  - {}{}", source.url, login);
        println!("    pattern: {}", source.item_pattern);
        for frag in &source.exclude {
            println!("    exclude: {}", frag);
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest {} listing sources", config.sources.len());
}

/// Handles the main harvest operation
async fn handle_harvest(config: magpie_ledger::Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting harvest: {} sources, max {} attempts per call",
        config.sources.len(),
        config.retry.max_attempts
    );

    match run_harvest(config).await {
        Ok(summary) => {
            tracing::info!(
                "Harvest completed: {} discovered, {} skipped, {} new postings, {} new references",
                summary.discovered,
                summary.skipped,
                summary.new_postings,
                summary.new_references
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
