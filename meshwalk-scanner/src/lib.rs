pub mod discovery;
pub mod document;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod record;
pub mod walker;

pub use discovery::DiscoverySet;
pub use document::RawDocument;
pub use error::{FetchError, ScanError};
pub use fetch::{FetchConfig, FetchPort, HttpFetcher, NodeEndpoint};
pub use record::{NodeRecord, WalkOutcome, WalkProgress};
pub use walker::{ProgressCallback, Walker};
