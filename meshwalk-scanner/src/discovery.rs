use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Node identities already scheduled or visited during one walk.
///
/// Grows monotonically; there is no removal.
#[derive(Debug, Default)]
pub struct DiscoverySet {
    seen: Mutex<HashSet<String>>,
}

impl DiscoverySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identity`, returning `true` if it had not been seen before.
    ///
    /// The check and the insert happen under one lock, so concurrent callers
    /// racing on the same identity get exactly one `true`. Names already seen
    /// are looked up first so they are never copied.
    pub fn mark_seen(&self, identity: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        if seen.contains(identity) {
            return false;
        }
        seen.insert(identity.to_string())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(identity)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
