// Single-flight guard over approval ids.
// Check-and-insert happens under one lock, so two callers racing on the same
// id cannot both acquire it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct InFlightApprovals {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlightApprovals {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mark `id` as in flight. `None` if a run for it is already going.
    pub fn try_acquire(&self, id: &str) -> Option<InFlightTicket> {
        if !self.lock().insert(id.to_string()) {
            debug!(request.id = id, "Approval already in flight");
            return None;
        }

        Some(InFlightTicket {
            id: id.to_string(),
            ids: self.ids.clone(),
        })
    }

    pub fn is_in_flight(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Releases its id when dropped
#[derive(Debug)]
pub struct InFlightTicket {
    id: String,
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlightTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        let mut ids = self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ids.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused() {
        let guard = InFlightApprovals::new();
        let ticket = guard.try_acquire("sub-42").unwrap();
        assert_eq!(ticket.id(), "sub-42");
        assert!(guard.try_acquire("sub-42").is_none());
        assert!(guard.is_in_flight("sub-42"));
    }

    #[test]
    fn test_drop_releases_id() {
        let guard = InFlightApprovals::new();
        {
            let _ticket = guard.try_acquire("sub-42").unwrap();
            assert_eq!(guard.len(), 1);
        }
        assert!(guard.is_empty());
        assert!(guard.try_acquire("sub-42").is_some());
    }

    #[test]
    fn test_distinct_ids_are_independent() {
        let guard = InFlightApprovals::new();
        let _a = guard.try_acquire("sub-1").unwrap();
        let _b = guard.try_acquire("sub-2").unwrap();
        assert_eq!(guard.len(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let guard = InFlightApprovals::new();
        let other = guard.clone();
        let _ticket = guard.try_acquire("sub-7").unwrap();
        assert!(other.try_acquire("sub-7").is_none());
    }
}
