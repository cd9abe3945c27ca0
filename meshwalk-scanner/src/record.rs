use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized metadata for one geolocated mesh node.
///
/// Every field is always present; data missing from the source document is
/// `null`, or an empty object/list for `meshrf`, `node_details` and
/// `link_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node: Option<String>,
    pub lastseen: Option<Value>,
    pub lat: Option<Value>,
    pub lon: Option<Value>,
    pub meshrf: Value,
    pub chanbw: Option<Value>,
    pub node_details: Map<String, Value>,
    pub interfaces: Option<Value>,
    pub link_info: Vec<Value>,
    pub lqm: Option<Value>,
}

impl NodeRecord {
    pub fn is_supernode(&self) -> bool {
        crate::document::is_truthy(self.node_details.get("mesh_supernode"))
    }
}

/// Counters reported to a progress callback after every completed fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkProgress {
    /// Fetches that have finished, successfully or not.
    pub completed: usize,
    /// Fetches issued so far, including the seed.
    pub scheduled: usize,
    /// Distinct node identities observed.
    pub discovered: usize,
    /// Records accepted so far.
    pub mapped: usize,
}

impl WalkProgress {
    pub fn remaining(&self) -> usize {
        self.scheduled.saturating_sub(self.completed)
    }
}

/// Result of one complete walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkOutcome {
    pub records: Vec<NodeRecord>,
    /// Nodes that reported a name but no usable location.
    pub non_mapped: usize,
    /// Fetches issued, including the seed.
    pub total_attempted: usize,
    /// Final size of the discovery set.
    pub discovered: usize,
}

impl WalkOutcome {
    /// Outcome of a walk whose seed could not be fetched.
    pub fn seed_failed() -> Self {
        Self {
            total_attempted: 1,
            discovered: 1,
            ..Self::default()
        }
    }
}
