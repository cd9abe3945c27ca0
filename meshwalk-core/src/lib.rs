pub mod error;
pub mod report;
pub mod snapshot;
pub mod walk;

pub use error::{CoreError, Result};
pub use snapshot::Snapshot;
pub use walk::{WalkOptions, execute_walk};
