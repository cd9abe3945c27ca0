use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use meshwalk_core::report::generate_summary_report;
use meshwalk_core::walk::{DEFAULT_OUTPUT_PATH, DEFAULT_START_NODE};
use meshwalk_core::{Snapshot, WalkOptions, execute_walk};
use meshwalk_scanner::{FetchConfig, NodeEndpoint};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

pub fn print_banner() {
    println!(
        "{} {}",
        "meshwalk".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("{}\n", "AREDN mesh topology walker".dimmed());
}

/// Install the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        debug!("Keeping the existing tracing subscriber: {}", e);
    }
}

/// Expand `~` and environment variables in a user supplied path.
pub fn resolve_output_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            warn!("Could not expand {}: {}", raw, e);
            PathBuf::from(shellexpand::tilde(raw).as_ref())
        }
    }
}

/// Build walk options from the `walk` subcommand's arguments.
pub fn walk_options_from_args(args: &ArgMatches) -> WalkOptions {
    let defaults = FetchConfig::default();
    let seconds = |id: &str, fallback: Duration| {
        args.get_one::<u64>(id)
            .map(|s| Duration::from_secs(*s))
            .unwrap_or(fallback)
    };

    let fetch = FetchConfig {
        max_concurrency: args
            .get_one::<usize>("concurrency")
            .copied()
            .unwrap_or(defaults.max_concurrency),
        attempts: args
            .get_one::<u32>("attempts")
            .copied()
            .unwrap_or(defaults.attempts),
        timeout: seconds("timeout", defaults.timeout),
        retry_min_delay: seconds("retry-min", defaults.retry_min_delay),
        retry_max_delay: seconds("retry-max", defaults.retry_max_delay),
        user_agent: args
            .get_one::<String>("user-agent")
            .cloned()
            .unwrap_or(defaults.user_agent),
    };

    WalkOptions {
        start: args
            .get_one::<String>("START")
            .cloned()
            .unwrap_or_else(|| DEFAULT_START_NODE.to_string()),
        endpoint: args
            .get_one::<String>("endpoint")
            .cloned()
            .unwrap_or_else(|| NodeEndpoint::DEFAULT_TEMPLATE.to_string()),
        fetch,
        show_progress: !args.get_flag("no-progress") && !args.get_flag("quiet"),
    }
}

/// Resolves on Ctrl-C. If the handler can't be installed the walk runs to completion.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

pub async fn handle_walk(args: &ArgMatches) -> anyhow::Result<()> {
    let quiet = args.get_flag("quiet");
    let options = walk_options_from_args(args);
    let output = resolve_output_path(
        args.get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or(DEFAULT_OUTPUT_PATH),
    );

    if !quiet {
        println!("{} Start node: {}", "✓".green().bold(), options.start.cyan());
        println!(
            "{} Output: {}",
            "✓".green().bold(),
            output.display().to_string().cyan()
        );
        println!(
            "{} Concurrency: {}, attempts: {}\n",
            "✓".green().bold(),
            options.fetch.max_concurrency,
            options.fetch.attempts
        );
    }
    info!("Starting walk from {}", options.start);

    let snapshot = execute_walk(options, None, shutdown_signal())
        .await
        .context("walk did not complete")?;

    snapshot
        .write_atomic(&output)
        .with_context(|| format!("failed to write snapshot to {}", output.display()))?;

    if !quiet {
        print!("{}", generate_summary_report(&snapshot));
        println!(
            "{} Snapshot written to {}",
            "✓".green().bold(),
            output.display()
        );
    }
    Ok(())
}

pub fn handle_info(args: &ArgMatches) -> anyhow::Result<()> {
    let path = resolve_output_path(
        args.get_one::<String>("PATH")
            .map(String::as_str)
            .unwrap_or(DEFAULT_OUTPUT_PATH),
    );
    let snapshot = Snapshot::load(&path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;

    println!("{} {}\n", "Snapshot:".bold(), path.display());
    print!("{}", generate_summary_report(&snapshot));
    Ok(())
}
