//! One-shot reveal of elements as they scroll into view.

use std::collections::HashSet;
use std::hash::Hash;

/// Fraction of an element that must be visible before it is revealed.
pub const REVEAL_THRESHOLD: f64 = 0.2;

/// One visibility observation for an element.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry<K> {
    pub target: K,
    /// Visible fraction of the element, `0.0..=1.0`.
    pub ratio: f64,
}

impl<K> IntersectionEntry<K> {
    pub fn new(target: K, ratio: f64) -> Self {
        Self { target, ratio }
    }
}

/// Watches elements and marks each visible the first time enough of it is on
/// screen. Revealed elements are no longer observed and never hide again.
#[derive(Debug, Clone)]
pub struct RevealObserver<K> {
    threshold: f64,
    observed: HashSet<K>,
    visible: HashSet<K>,
}

impl<K: Eq + Hash + Clone> Default for RevealObserver<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> RevealObserver<K> {
    pub fn new() -> Self {
        Self::with_threshold(REVEAL_THRESHOLD)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            observed: HashSet::new(),
            visible: HashSet::new(),
        }
    }

    /// Starts observing `target`. Already revealed elements are ignored.
    pub fn observe(&mut self, target: K) -> bool {
        if self.visible.contains(&target) {
            return false;
        }
        self.observed.insert(target)
    }

    /// Applies a batch of observations and returns the newly revealed
    /// elements, in entry order.
    pub fn notify<I>(&mut self, entries: I) -> Vec<K>
    where
        I: IntoIterator<Item = IntersectionEntry<K>>,
    {
        let mut revealed = Vec::new();
        for entry in entries {
            if entry.ratio < self.threshold || !self.observed.remove(&entry.target) {
                continue;
            }
            self.visible.insert(entry.target.clone());
            revealed.push(entry.target);
        }
        revealed
    }

    pub fn is_visible(&self, target: &K) -> bool {
        self.visible.contains(target)
    }

    pub fn is_observed(&self, target: &K) -> bool {
        self.observed.contains(target)
    }

    /// Number of elements still waiting to be revealed.
    pub fn pending(&self) -> usize {
        self.observed.len()
    }
}
