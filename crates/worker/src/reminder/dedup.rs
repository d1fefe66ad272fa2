//! Per-run deduplication of reminder sends.

use std::collections::HashSet;

use replenish_core::{Email, ProductId};

/// Identity of one reminder within a run.
///
/// Case-sensitive over the email exactly as stored on the order; two
/// spellings of the same address are two keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub product_id: ProductId,
    pub customer_email: Email,
}

/// Tracks which (product, customer) pairs have already been handled in the
/// current run.
///
/// Scoped to a single run: the orchestrator creates one at run start and
/// drops it at run end, so a pair that qualifies again next run is eligible
/// again. No persistence, no cross-run memory.
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen: HashSet<DedupKey>,
}

impl DedupTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time a key is seen, `false` on every
    /// subsequent call with the same key.
    pub fn admit(&mut self, key: DedupKey) -> bool {
        self.seen.insert(key)
    }

    /// Number of distinct keys admitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(product: i32, email: &str) -> DedupKey {
        DedupKey {
            product_id: ProductId::new(product),
            customer_email: Email::parse(email).unwrap(),
        }
    }

    #[test]
    fn test_admits_first_occurrence_only() {
        let mut tracker = DedupTracker::new();
        assert!(tracker.admit(key(1, "a@x.com")));
        assert!(!tracker.admit(key(1, "a@x.com")));
        assert!(!tracker.admit(key(1, "a@x.com")));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_distinct_products_are_distinct_keys() {
        let mut tracker = DedupTracker::new();
        assert!(tracker.admit(key(1, "a@x.com")));
        assert!(tracker.admit(key(2, "a@x.com")));
    }

    #[test]
    fn test_distinct_customers_are_distinct_keys() {
        let mut tracker = DedupTracker::new();
        assert!(tracker.admit(key(1, "a@x.com")));
        assert!(tracker.admit(key(1, "b@x.com")));
    }

    #[test]
    fn test_email_case_is_significant() {
        let mut tracker = DedupTracker::new();
        assert!(tracker.admit(key(1, "a@x.com")));
        assert!(tracker.admit(key(1, "A@x.com")));
    }
}
