use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use meshwalk_scanner::{
    FetchConfig, HttpFetcher, NodeEndpoint, ProgressCallback, WalkProgress, Walker,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::{CoreError, Result};
use crate::snapshot::Snapshot;

pub const DEFAULT_START_NODE: &str = "KI5VMF-oklahoma-supernode";
pub const DEFAULT_OUTPUT_PATH: &str = "/usr/share/nginx/html/data/out.json";

/// Options for configuring a walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Node the walk starts from
    pub start: String,
    /// URL template for a node's status document, containing `{node}`
    pub endpoint: String,
    pub fetch: FetchConfig,
    pub show_progress: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_NODE.to_string(),
            endpoint: NodeEndpoint::DEFAULT_TEMPLATE.to_string(),
            fetch: FetchConfig::default(),
            show_progress: true,
        }
    }
}

/// One-line progress message for the spinner.
pub fn format_progress(progress: &WalkProgress) -> String {
    format!(
        "Completed {} of {} fetches, {} left. Found {} hosts, {} mapped nodes.",
        progress.completed,
        progress.scheduled,
        progress.remaining(),
        progress.discovered,
        progress.mapped
    )
}

/// Walk the mesh and assemble the resulting snapshot.
///
/// Fails with [`CoreError::Interrupted`] if `shutdown` completes first.
pub async fn execute_walk<S>(
    options: WalkOptions,
    progress_callback: Option<ProgressCallback>,
    shutdown: S,
) -> Result<Snapshot>
where
    S: Future<Output = ()>,
{
    let WalkOptions {
        start,
        endpoint,
        fetch,
        show_progress,
    } = options;

    let endpoint = NodeEndpoint::new(endpoint)?;
    let fetcher = HttpFetcher::new(fetch)?;

    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Fetching {}...", start));
        Some(Arc::new(pb))
    } else {
        None
    };

    let pb_clone = progress_bar.clone();
    let internal_progress_callback: ProgressCallback = Arc::new(move |progress: WalkProgress| {
        if let Some(ref pb) = pb_clone {
            pb.set_message(format_progress(&progress));
        }
        if let Some(ref callback) = progress_callback {
            callback(progress);
        }
    });

    let walker = Walker::new(fetcher)
        .with_endpoint(endpoint)
        .with_progress_callback(internal_progress_callback);

    let outcome = walker.run_until(&start, shutdown).await;

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    let outcome = outcome.ok_or(CoreError::Interrupted)?;
    info!(
        "Walk from {} finished: {} mapped, {} non-mapped, {} hosts scraped",
        start,
        outcome.records.len(),
        outcome.non_mapped,
        outcome.total_attempted
    );

    Ok(Snapshot::assemble(outcome, Utc::now()))
}
