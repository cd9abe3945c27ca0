use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, info, warn};

use crate::discovery::DiscoverySet;
use crate::document::RawDocument;
use crate::error::FetchError;
use crate::fetch::{FetchPort, NodeEndpoint};
use crate::normalize::{Classification, classify};
use crate::record::{NodeRecord, WalkOutcome, WalkProgress};

pub type ProgressCallback = Arc<dyn Fn(WalkProgress) + Send + Sync>;

/// Breadth-first walker over the mesh, starting from a single known node.
///
/// Every discovered node is fetched once. All fetches run concurrently; how
/// many actually hit the network at once is up to the [`FetchPort`].
pub struct Walker<F> {
    fetcher: F,
    endpoint: NodeEndpoint,
    progress_callback: Option<ProgressCallback>,
}

#[derive(Default)]
struct Tally {
    records: Vec<NodeRecord>,
    non_mapped: usize,
    scheduled: usize,
    completed: usize,
}

impl Tally {
    fn absorb(&mut self, doc: &RawDocument) {
        match classify(doc) {
            Classification::Mapped(record) => self.records.push(record),
            Classification::NonMapped => self.non_mapped += 1,
            Classification::Anonymous => {}
        }
    }
}

impl<F: FetchPort> Walker<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            endpoint: NodeEndpoint::default(),
            progress_callback: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: NodeEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Walk the mesh starting at `start`.
    ///
    /// Unreachable nodes are skipped. If `start` itself cannot be fetched the
    /// walk ends straight away with an empty outcome.
    pub async fn run(&self, start: &str) -> WalkOutcome {
        info!("Starting walk from {}", start);

        let seen = DiscoverySet::new();
        seen.mark_seen(start);
        let mut tally = Tally {
            scheduled: 1,
            ..Tally::default()
        };

        let (_, seed) = self.fetch_node(start.to_string()).await;
        let seed = match seed {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Seed node {} unreachable, nothing to walk: {}", start, e);
                return WalkOutcome::seed_failed();
            }
        };
        tally.completed = 1;

        let mut in_flight = FuturesUnordered::new();
        for identity in claim_neighbors(&seed, &seen) {
            in_flight.push(self.fetch_node(identity));
            tally.scheduled += 1;
        }
        if seed.identity().is_some() {
            tally.absorb(&seed);
        }
        self.report(&tally, &seen);

        while let Some((identity, result)) = in_flight.next().await {
            tally.completed += 1;

            match result {
                Err(e) => debug!("Skipping {}: {}", identity, e),
                Ok(doc) if doc.identity().is_some() => {
                    for neighbor in claim_neighbors(&doc, &seen) {
                        in_flight.push(self.fetch_node(neighbor));
                        tally.scheduled += 1;
                    }
                    tally.absorb(&doc);
                }
                Ok(_) => debug!("{} did not report a node name", identity),
            }

            self.report(&tally, &seen);
        }

        info!(
            "Walk complete. {} hosts found, {} fetched, {} mapped, {} without location",
            seen.len(),
            tally.scheduled,
            tally.records.len(),
            tally.non_mapped
        );

        WalkOutcome {
            records: tally.records,
            non_mapped: tally.non_mapped,
            total_attempted: tally.scheduled,
            discovered: seen.len(),
        }
    }

    /// Like [`Walker::run`], but gives up as soon as `shutdown` completes.
    ///
    /// Returns `None` when the walk was abandoned; in-flight fetches are
    /// dropped.
    pub async fn run_until<S>(&self, start: &str, shutdown: S) -> Option<WalkOutcome>
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            outcome = self.run(start) => Some(outcome),
            _ = shutdown => {
                warn!("Walk from {} abandoned", start);
                None
            }
        }
    }

    async fn fetch_node(&self, identity: String) -> (String, Result<RawDocument, FetchError>) {
        let url = self.endpoint.url_for(&identity);
        debug!("Fetching {}", url);
        let result = self.fetcher.fetch(&url).await;
        (identity, result)
    }

    fn report(&self, tally: &Tally, seen: &DiscoverySet) {
        if let Some(ref callback) = self.progress_callback {
            callback(WalkProgress {
                completed: tally.completed,
                scheduled: tally.scheduled,
                discovered: seen.len(),
                mapped: tally.records.len(),
            });
        }
    }
}

/// Neighbors of `doc` not seen before, marked as seen.
fn claim_neighbors(doc: &RawDocument, seen: &DiscoverySet) -> Vec<String> {
    doc.neighbors()
        .filter(|name| seen.mark_seen(name))
        .map(str::to_string)
        .collect()
}
