//! State graph builder: named stages and their dependencies.
//!
//! Build with `add_stage` / `add_stage_with_policy`, then `compile()` to get an
//! executable [`CompiledStateGraph`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::channels::{boxed_updater, BoxedStateUpdater, MergeUpdater, StateUpdater};

use super::compile_error::CompilationError;
use super::compiled::CompiledStateGraph;
use super::stage::{ErrorPolicy, Stage};
use super::GraphState;

/// A registered stage: name, dependencies, implementation and failure policy.
pub(super) struct StageEntry<S>
where
    S: GraphState,
{
    pub(super) id: String,
    pub(super) dependencies: Vec<String>,
    pub(super) stage: Arc<dyn Stage<S>>,
    pub(super) policy: ErrorPolicy,
}

impl<S> Clone for StageEntry<S>
where
    S: GraphState,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            dependencies: self.dependencies.clone(),
            stage: Arc::clone(&self.stage),
            policy: self.policy,
        }
    }
}

/// State graph: stages plus dependency edges. Generic over state type `S`.
///
/// A stage may only depend on stages registered before it, so registration order is
/// a valid execution order and the graph cannot contain a cycle.
///
/// **State updates**: by default each stage's update is merged with
/// [`GraphState::apply`]. Use [`with_state_updater`](Self::with_state_updater) to
/// supply a different merge strategy.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use prism::graph::{ErrorPolicy, FnStage, StateGraph};
/// use prism::{ResearchState, ResearchUpdate};
///
/// # fn main() -> Result<(), prism::CompilationError> {
/// let mut graph = StateGraph::<ResearchState>::new();
/// let noop = |_s: ResearchState| async move { Ok::<_, prism::StageError>(ResearchUpdate::default()) };
/// graph
///     .add_stage_with_policy("search", [] as [&str; 0], Arc::new(FnStage::new(noop)), ErrorPolicy::Isolate)?
///     .add_stage("summarize", ["search"], Arc::new(FnStage::new(noop)))?;
/// let compiled = graph.compile()?;
/// assert_eq!(compiled.stage_ids(), vec!["search", "summarize"]);
/// # Ok(())
/// # }
/// ```
pub struct StateGraph<S>
where
    S: GraphState,
{
    stages: Vec<StageEntry<S>>,
    index: HashMap<String, usize>,
    state_updater: Option<BoxedStateUpdater<S>>,
}

impl<S> Default for StateGraph<S>
where
    S: GraphState,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: GraphState,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            index: HashMap::new(),
            state_updater: None,
        }
    }

    /// Sets a custom state updater used to merge every stage's update.
    pub fn with_state_updater<U>(mut self, updater: U) -> Self
    where
        U: StateUpdater<S> + 'static,
    {
        self.state_updater = Some(boxed_updater(updater));
        self
    }

    /// Registers a stage with `ErrorPolicy::Propagate`.
    ///
    /// See [`add_stage_with_policy`](Self::add_stage_with_policy).
    pub fn add_stage<I, D>(
        &mut self,
        id: impl Into<String>,
        dependencies: I,
        stage: Arc<dyn Stage<S>>,
    ) -> Result<&mut Self, CompilationError>
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.add_stage_with_policy(id, dependencies, stage, ErrorPolicy::Propagate)
    }

    /// Registers a stage that runs once every stage in `dependencies` is terminal.
    ///
    /// Fails if `id` is already registered, if a dependency is not yet registered, or
    /// if the stage names itself. Repeated dependency names are collapsed.
    pub fn add_stage_with_policy<I, D>(
        &mut self,
        id: impl Into<String>,
        dependencies: I,
        stage: Arc<dyn Stage<S>>,
        policy: ErrorPolicy,
    ) -> Result<&mut Self, CompilationError>
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(CompilationError::DuplicateStage(id));
        }

        let mut seen = HashSet::new();
        let mut deps = Vec::new();
        for dep in dependencies {
            let dep = dep.into();
            if dep == id {
                return Err(CompilationError::Cycle(id));
            }
            if !self.index.contains_key(&dep) {
                return Err(CompilationError::StageNotFound {
                    stage: id,
                    dependency: dep,
                });
            }
            if seen.insert(dep.clone()) {
                deps.push(dep);
            }
        }

        self.index.insert(id.clone(), self.stages.len());
        self.stages.push(StageEntry {
            id,
            dependencies: deps,
            stage,
            policy,
        });
        Ok(self)
    }

    /// Number of registered stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Builds the executable graph.
    ///
    /// Computes, for each stage, the stages that depend on it. Fails with
    /// `CompilationError::EmptyGraph` if no stage was registered.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        if self.stages.is_empty() {
            return Err(CompilationError::EmptyGraph);
        }

        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.stages.len()];
        for (idx, entry) in self.stages.iter().enumerate() {
            for dep in &entry.dependencies {
                if let Some(&dep_idx) = self.index.get(dep) {
                    dependents[dep_idx].push(idx);
                }
            }
        }

        let state_updater = self
            .state_updater
            .unwrap_or_else(|| boxed_updater(MergeUpdater));

        Ok(CompiledStateGraph::new(self.stages, dependents, state_updater))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelError;
    use crate::error::StageError;
    use crate::graph::FnStage;

    #[derive(Clone, Debug, Default)]
    struct Empty;

    impl GraphState for Empty {
        type Update = ();
        fn apply(&mut self, _update: ()) -> Result<(), ChannelError> {
            Ok(())
        }
    }

    fn noop() -> Arc<dyn Stage<Empty>> {
        Arc::new(FnStage::new(|_s: Empty| async move { Ok::<_, StageError>(()) }))
    }

    const NONE: [&str; 0] = [];

    /// **Scenario**: Registering the same name twice is rejected.
    #[test]
    fn add_stage_rejects_duplicate() {
        let mut graph = StateGraph::<Empty>::new();
        graph.add_stage("a", NONE, noop()).unwrap();
        match graph.add_stage("a", NONE, noop()) {
            Err(CompilationError::DuplicateStage(id)) => assert_eq!(id, "a"),
            other => panic!("expected DuplicateStage, got {:?}", other.err()),
        }
    }

    /// **Scenario**: A dependency on a stage that is not registered yet is rejected.
    #[test]
    fn add_stage_rejects_unknown_dependency() {
        let mut graph = StateGraph::<Empty>::new();
        let err = graph.add_stage("b", ["a"], noop()).err().unwrap();
        assert!(matches!(
            err,
            CompilationError::StageNotFound { ref stage, ref dependency }
                if stage == "b" && dependency == "a"
        ));
        assert!(graph.is_empty());
    }

    #[test]
    fn add_stage_rejects_self_dependency() {
        let mut graph = StateGraph::<Empty>::new();
        let err = graph.add_stage("a", ["a"], noop()).err().unwrap();
        assert!(matches!(err, CompilationError::Cycle(ref id) if id == "a"));
    }

    #[test]
    fn compile_empty_graph_fails() {
        let graph = StateGraph::<Empty>::new();
        assert!(matches!(graph.compile(), Err(CompilationError::EmptyGraph)));
    }

    /// **Scenario**: Duplicate dependency names collapse to one edge.
    #[test]
    fn duplicate_dependencies_are_collapsed() {
        let mut graph = StateGraph::<Empty>::new();
        graph
            .add_stage("a", NONE, noop())
            .unwrap()
            .add_stage("b", ["a", "a"], noop())
            .unwrap();
        let compiled = graph.compile().unwrap();
        assert_eq!(compiled.dependencies("b"), Some(&["a".to_string()][..]));
        assert_eq!(compiled.policy("b"), Some(ErrorPolicy::Propagate));
    }
}
