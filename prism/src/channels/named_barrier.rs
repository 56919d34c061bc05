//! Named barrier for fan-in synchronization.
//!
//! Tracks a set of expected names and becomes available once all of them have been
//! marked as seen. The graph executor holds one barrier per stage whose names are
//! the stage's dependencies; when the last dependency reaches a terminal state the
//! barrier opens and the stage is scheduled.
//!
//! # Example
//!
//! ```rust
//! use prism::channels::NamedBarrierValue;
//!
//! let mut barrier = NamedBarrierValue::from_names(["google_search", "bing_search"]);
//! assert!(!barrier.is_available());
//!
//! barrier.mark_seen("google_search").unwrap();
//! assert!(!barrier.is_available());
//!
//! barrier.mark_seen("bing_search").unwrap();
//! assert!(barrier.is_available());
//! ```

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use super::ChannelError;

/// Waits until all named values have been seen.
///
/// - An empty name set is available immediately (a stage with no dependencies).
/// - Marking a name twice is not an error; it reports that nothing changed.
/// - Marking a name outside the expected set is `ChannelError::InvalidUpdate`.
#[derive(Debug, Clone)]
pub struct NamedBarrierValue<T>
where
    T: Clone + Send + Sync + Debug + Hash + Eq + 'static,
{
    names: HashSet<T>,
    seen: HashSet<T>,
}

impl<T> NamedBarrierValue<T>
where
    T: Clone + Send + Sync + Debug + Hash + Eq + 'static,
{
    /// Creates a barrier that waits for every name in `names`.
    pub fn new(names: HashSet<T>) -> Self {
        Self {
            names,
            seen: HashSet::new(),
        }
    }

    /// Creates a barrier from an iterator of names.
    pub fn from_names<I: IntoIterator<Item = T>>(names: I) -> Self {
        Self::new(names.into_iter().collect())
    }

    /// True once all expected names have been seen.
    pub fn is_available(&self) -> bool {
        self.seen.len() == self.names.len()
    }

    /// Names still being waited for.
    pub fn pending_names(&self) -> HashSet<T> {
        self.names.difference(&self.seen).cloned().collect()
    }

    /// All expected names.
    pub fn expected_names(&self) -> &HashSet<T> {
        &self.names
    }

    /// Marks a name as seen.
    ///
    /// Returns `Ok(true)` if the name was newly seen, `Ok(false)` if it had already
    /// been seen, and `Err` if the name is not expected by this barrier.
    pub fn mark_seen(&mut self, name: T) -> Result<bool, ChannelError> {
        if !self.names.contains(&name) {
            return Err(ChannelError::InvalidUpdate(format!(
                "name {:?} not in expected names",
                name
            )));
        }
        Ok(self.seen.insert(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: A fan-in barrier stays closed until the last dependency is seen.
    #[test]
    fn barrier_opens_after_last_name() {
        let mut barrier = NamedBarrierValue::from_names(["a", "b", "c"]);
        assert!(!barrier.is_available());
        assert!(barrier.mark_seen("c").unwrap());
        assert!(barrier.mark_seen("a").unwrap());
        assert!(!barrier.is_available());
        assert_eq!(barrier.pending_names(), ["b"].into_iter().collect());
        assert!(barrier.mark_seen("b").unwrap());
        assert!(barrier.is_available());
        assert!(barrier.pending_names().is_empty());
    }

    /// **Scenario**: Seeing the same name twice reports no change and does not open the barrier early.
    #[test]
    fn barrier_duplicate_mark_is_noop() {
        let mut barrier = NamedBarrierValue::from_names(["a", "b"]);
        assert!(barrier.mark_seen("a").unwrap());
        assert!(!barrier.mark_seen("a").unwrap());
        assert!(!barrier.is_available());
    }

    /// **Scenario**: An unexpected name is rejected with InvalidUpdate.
    #[test]
    fn barrier_unknown_name_is_rejected() {
        let mut barrier = NamedBarrierValue::from_names(["a".to_string()]);
        match barrier.mark_seen("zzz".to_string()) {
            Err(ChannelError::InvalidUpdate(msg)) => assert!(msg.contains("zzz")),
            other => panic!("expected InvalidUpdate, got {:?}", other),
        }
    }

    /// **Scenario**: A barrier with no expected names is available immediately.
    #[test]
    fn barrier_without_names_is_available() {
        let barrier: NamedBarrierValue<String> = NamedBarrierValue::from_names(Vec::new());
        assert!(barrier.is_available());
        assert!(barrier.expected_names().is_empty());
    }
}
