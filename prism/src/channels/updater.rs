//! State updaters: how a stage's partial update is merged into the run state.
//!
//! Per-field update strategies (similar to `Annotated` reducers in graph frameworks)
//! are expressed by the state type itself through [`GraphState::apply`]. The
//! executor does not call `apply` directly; it goes through a [`StateUpdater`], so a
//! graph can swap in a different merge (e.g. a [`FieldBasedUpdater`] in tests).
//!
//! # Write-once fields
//!
//! Research state fields are written by exactly one stage. [`write_once`] and
//! [`write_once_entry`] turn a second write into `ChannelError::AlreadyWritten`
//! instead of silently overwriting:
//!
//! ```rust
//! use prism::channels::write_once;
//!
//! let mut answer: Option<String> = None;
//! write_once(&mut answer, Some("first".to_string()), "final_answer").unwrap();
//! write_once(&mut answer, None, "final_answer").unwrap(); // no write requested
//! assert!(write_once(&mut answer, Some("second".to_string()), "final_answer").is_err());
//! assert_eq!(answer.as_deref(), Some("first"));
//! ```

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::GraphState;

use super::ChannelError;

/// Merges a stage's update into the current state.
pub trait StateUpdater<S>: Send + Sync + Debug
where
    S: GraphState,
{
    /// Apply `update` (the output of one stage) to `current`.
    fn apply_update(&self, current: &mut S, update: S::Update) -> Result<(), ChannelError>;
}

/// Default updater: delegates to the state's own [`GraphState::apply`].
#[derive(Debug, Clone, Default)]
pub struct MergeUpdater;

impl<S> StateUpdater<S> for MergeUpdater
where
    S: GraphState,
{
    fn apply_update(&self, current: &mut S, update: S::Update) -> Result<(), ChannelError> {
        current.apply(update)
    }
}

/// Updater backed by a closure.
///
/// # Example
///
/// ```rust,no_run
/// use prism::channels::FieldBasedUpdater;
/// use prism::graph::GraphState;
/// use prism::ChannelError;
///
/// #[derive(Clone, Debug, Default)]
/// struct Tally { seen: Vec<String> }
///
/// impl GraphState for Tally {
///     type Update = String;
///     fn apply(&mut self, update: String) -> Result<(), ChannelError> {
///         self.seen.push(update);
///         Ok(())
///     }
/// }
///
/// // Keep only the first value written.
/// let updater = FieldBasedUpdater::new(|current: &mut Tally, update: String| {
///     if current.seen.is_empty() {
///         current.seen.push(update);
///     }
///     Ok(())
/// });
/// ```
pub struct FieldBasedUpdater<S, F>
where
    S: GraphState,
    F: Fn(&mut S, S::Update) -> Result<(), ChannelError> + Send + Sync + 'static,
{
    updater_fn: F,
    _marker: std::marker::PhantomData<fn(S)>,
}

impl<S, F> Debug for FieldBasedUpdater<S, F>
where
    S: GraphState,
    F: Fn(&mut S, S::Update) -> Result<(), ChannelError> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBasedUpdater")
            .field("updater_fn", &"<function>")
            .finish()
    }
}

impl<S, F> FieldBasedUpdater<S, F>
where
    S: GraphState,
    F: Fn(&mut S, S::Update) -> Result<(), ChannelError> + Send + Sync + 'static,
{
    pub fn new(updater_fn: F) -> Self {
        Self {
            updater_fn,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<S, F> StateUpdater<S> for FieldBasedUpdater<S, F>
where
    S: GraphState,
    F: Fn(&mut S, S::Update) -> Result<(), ChannelError> + Send + Sync + 'static,
{
    fn apply_update(&self, current: &mut S, update: S::Update) -> Result<(), ChannelError> {
        (self.updater_fn)(current, update)
    }
}

/// Shared, type-erased state updater.
pub type BoxedStateUpdater<S> = Arc<dyn StateUpdater<S>>;

/// Wraps an updater as [`BoxedStateUpdater`].
pub fn boxed_updater<S, U>(updater: U) -> BoxedStateUpdater<S>
where
    S: GraphState,
    U: StateUpdater<S> + 'static,
{
    Arc::new(updater)
}

/// Writes `value` into `slot` unless `slot` already holds a value.
///
/// `None` means the stage did not write this field and is always accepted.
pub fn write_once<T>(
    slot: &mut Option<T>,
    value: Option<T>,
    field: &str,
) -> Result<(), ChannelError> {
    let Some(value) = value else {
        return Ok(());
    };
    if slot.is_some() {
        return Err(ChannelError::AlreadyWritten(field.to_string()));
    }
    *slot = Some(value);
    Ok(())
}

/// Inserts `value` under `key` unless the key is already present.
pub fn write_once_entry<K, V>(
    map: &mut BTreeMap<K, V>,
    key: K,
    value: V,
    field: &str,
) -> Result<(), ChannelError>
where
    K: Ord + Debug,
{
    if map.contains_key(&key) {
        return Err(ChannelError::AlreadyWritten(format!("{}[{:?}]", field, key)));
    }
    map.insert(key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct CounterState {
        labels: Vec<String>,
        total: i32,
    }

    impl GraphState for CounterState {
        type Update = (String, i32);

        fn apply(&mut self, (label, n): (String, i32)) -> Result<(), ChannelError> {
            self.labels.push(label);
            self.total = n;
            Ok(())
        }
    }

    /// **Scenario**: MergeUpdater delegates to GraphState::apply.
    #[test]
    fn merge_updater_uses_state_apply() {
        let mut state = CounterState::default();
        MergeUpdater
            .apply_update(&mut state, ("a".into(), 3))
            .unwrap();
        assert_eq!(state.labels, vec!["a".to_string()]);
        assert_eq!(state.total, 3);
    }

    /// **Scenario**: FieldBasedUpdater can replace the state's own merge (here: additive total).
    #[test]
    fn field_based_updater_overrides_merge() {
        let updater: BoxedStateUpdater<CounterState> =
            boxed_updater(FieldBasedUpdater::new(|s: &mut CounterState, (l, n): (String, i32)| {
                s.labels.push(l);
                s.total += n;
                Ok(())
            }));
        let mut state = CounterState::default();
        updater.apply_update(&mut state, ("x".into(), 2)).unwrap();
        updater.apply_update(&mut state, ("y".into(), 5)).unwrap();
        assert_eq!(state.total, 7);
        assert_eq!(state.labels.len(), 2);
    }

    #[test]
    fn write_once_rejects_second_write() {
        let mut slot = None;
        write_once(&mut slot, Some(1), "n").unwrap();
        match write_once(&mut slot, Some(2), "n") {
            Err(ChannelError::AlreadyWritten(f)) => assert_eq!(f, "n"),
            other => panic!("expected AlreadyWritten, got {:?}", other),
        }
        assert_eq!(slot, Some(1));
    }

    #[test]
    fn write_once_entry_is_per_key() {
        let mut map = BTreeMap::new();
        write_once_entry(&mut map, "a", 1, "m").unwrap();
        write_once_entry(&mut map, "b", 2, "m").unwrap();
        let err = write_once_entry(&mut map, "a", 3, "m").unwrap_err();
        assert!(err.to_string().contains("m[\"a\"]"), "{}", err);
        assert_eq!(map.get("a"), Some(&1));
    }
}
