//! Compiled state graph: immutable, supports invoke only.
//!
//! Built by `StateGraph::compile`. Runs stages concurrently as their dependencies
//! become terminal and merges each stage's update in completion order.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::channels::{BoxedStateUpdater, NamedBarrierValue};
use crate::error::{RunError, StageError};

use super::event::StageEvent;
use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_stage_complete, log_stage_failed,
    log_stage_start,
};
use super::stage::ErrorPolicy;
use super::state_graph::StageEntry;
use super::GraphState;

type StageOutcome<U> = Result<Result<U, StageError>, Box<dyn Any + Send>>;

/// Compiled graph: immutable structure, supports `invoke` only.
///
/// Cheap to clone; clones share stage implementations. One compiled graph can serve
/// any number of concurrent runs; each run owns its own state.
pub struct CompiledStateGraph<S>
where
    S: GraphState,
{
    stages: Arc<[StageEntry<S>]>,
    /// For each stage index, the indices of stages that list it as a dependency.
    dependents: Arc<[Vec<usize>]>,
    state_updater: BoxedStateUpdater<S>,
}

impl<S> Clone for CompiledStateGraph<S>
where
    S: GraphState,
{
    fn clone(&self) -> Self {
        Self {
            stages: Arc::clone(&self.stages),
            dependents: Arc::clone(&self.dependents),
            state_updater: Arc::clone(&self.state_updater),
        }
    }
}

impl<S> std::fmt::Debug for CompiledStateGraph<S>
where
    S: GraphState,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledStateGraph")
            .field("stages", &self.stage_ids())
            .finish()
    }
}

impl<S> CompiledStateGraph<S>
where
    S: GraphState,
{
    pub(super) fn new(
        stages: Vec<StageEntry<S>>,
        dependents: Vec<Vec<usize>>,
        state_updater: BoxedStateUpdater<S>,
    ) -> Self {
        Self {
            stages: stages.into(),
            dependents: dependents.into(),
            state_updater,
        }
    }

    /// Stage names in registration order (a valid topological order).
    pub fn stage_ids(&self) -> Vec<&str> {
        self.stages.iter().map(|e| e.id.as_str()).collect()
    }

    /// Declared dependencies of `id`, or `None` if no such stage exists.
    pub fn dependencies(&self, id: &str) -> Option<&[String]> {
        self.entry(id).map(|e| e.dependencies.as_slice())
    }

    /// Error policy of `id`, or `None` if no such stage exists.
    pub fn policy(&self, id: &str) -> Option<ErrorPolicy> {
        self.entry(id).map(|e| e.policy)
    }

    fn entry(&self, id: &str) -> Option<&StageEntry<S>> {
        self.stages.iter().find(|e| e.id == id)
    }

    /// Runs the graph from `state` until every stage is terminal.
    ///
    /// Returns the final state, or a [`RunError`] if a `Propagate` stage failed, a
    /// stage panicked, or an update could not be merged.
    pub async fn invoke(&self, state: S) -> Result<S, RunError> {
        self.run(state, None).await
    }

    /// Like [`invoke`](Self::invoke), additionally sending a [`StageEvent`] for every
    /// stage transition.
    ///
    /// Sending awaits channel capacity, so the receiver must be drained concurrently
    /// (or sized to hold two events per stage). A dropped receiver is ignored.
    pub async fn invoke_with_events(
        &self,
        state: S,
        events: mpsc::Sender<StageEvent>,
    ) -> Result<S, RunError> {
        self.run(state, Some(&events)).await
    }

    async fn run(
        &self,
        mut state: S,
        events: Option<&mpsc::Sender<StageEvent>>,
    ) -> Result<S, RunError> {
        log_graph_start(self.stages.len());

        let mut barriers: Vec<NamedBarrierValue<String>> = self
            .stages
            .iter()
            .map(|e| NamedBarrierValue::from_names(e.dependencies.iter().cloned()))
            .collect();
        let mut scheduled = vec![false; self.stages.len()];
        let mut tasks: JoinSet<(usize, StageOutcome<S::Update>)> = JoinSet::new();

        for idx in 0..self.stages.len() {
            if barriers[idx].is_available() {
                scheduled[idx] = true;
                self.spawn_stage(&mut tasks, idx, &state, events).await;
            }
        }

        let mut failure: Option<RunError> = None;
        while let Some(joined) = tasks.join_next().await {
            let (idx, outcome) = match joined {
                Ok(done) => done,
                Err(join_error) => {
                    // Panics are caught inside the task; this is cancellation.
                    failure.get_or_insert(RunError::StagePanicked {
                        stage: "<unknown>".to_string(),
                        message: join_error.to_string(),
                    });
                    continue;
                }
            };
            let entry = &self.stages[idx];

            match outcome {
                Ok(Ok(update)) => {
                    tracing::trace!(stage = %entry.id, ?update, "Merging stage update");
                    match self.state_updater.apply_update(&mut state, update) {
                        Ok(()) => {
                            log_stage_complete(&entry.id);
                            emit(events, StageEvent::Completed { stage: entry.id.clone() }).await;
                        }
                        Err(source) => {
                            failure.get_or_insert(RunError::Merge {
                                stage: entry.id.clone(),
                                source,
                            });
                        }
                    }
                }
                Ok(Err(error)) => match entry.policy {
                    ErrorPolicy::Isolate => {
                        log_stage_failed(&entry.id, &error, true);
                        emit(
                            events,
                            StageEvent::Isolated {
                                stage: entry.id.clone(),
                                error: error.to_string(),
                            },
                        )
                        .await;
                    }
                    ErrorPolicy::Propagate => {
                        log_stage_failed(&entry.id, &error, false);
                        emit(
                            events,
                            StageEvent::Failed {
                                stage: entry.id.clone(),
                                error: error.to_string(),
                            },
                        )
                        .await;
                        failure.get_or_insert(RunError::StageFailed {
                            stage: entry.id.clone(),
                            source: error,
                        });
                    }
                },
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    emit(
                        events,
                        StageEvent::Failed {
                            stage: entry.id.clone(),
                            error: message.clone(),
                        },
                    )
                    .await;
                    failure.get_or_insert(RunError::StagePanicked {
                        stage: entry.id.clone(),
                        message,
                    });
                }
            }

            // After a failure, in-flight stages drain but nothing new starts.
            if failure.is_some() {
                continue;
            }

            for &next in &self.dependents[idx] {
                let opened = barriers[next]
                    .mark_seen(entry.id.clone())
                    .map_err(|source| RunError::Merge {
                        stage: self.stages[next].id.clone(),
                        source,
                    })?;
                if opened && barriers[next].is_available() && !scheduled[next] {
                    scheduled[next] = true;
                    self.spawn_stage(&mut tasks, next, &state, events).await;
                }
            }
        }

        if let Some(error) = failure {
            log_graph_error(&error);
            return Err(error);
        }

        let never_scheduled: Vec<String> = self
            .stages
            .iter()
            .zip(&scheduled)
            .filter(|(_, done)| !**done)
            .map(|(e, _)| e.id.clone())
            .collect();
        if !never_scheduled.is_empty() {
            let error = RunError::Incomplete(never_scheduled);
            log_graph_error(&error);
            return Err(error);
        }

        log_graph_complete();
        Ok(state)
    }

    /// Spawns stage `idx` on a snapshot of the current state.
    async fn spawn_stage(
        &self,
        tasks: &mut JoinSet<(usize, StageOutcome<S::Update>)>,
        idx: usize,
        state: &S,
        events: Option<&mpsc::Sender<StageEvent>>,
    ) {
        let entry = &self.stages[idx];
        log_stage_start(&entry.id);
        emit(events, StageEvent::Started { stage: entry.id.clone() }).await;

        let stage = Arc::clone(&entry.stage);
        let snapshot = state.clone();
        tasks.spawn(async move {
            let outcome = AssertUnwindSafe(stage.run(snapshot)).catch_unwind().await;
            (idx, outcome)
        });
    }
}

async fn emit(events: Option<&mpsc::Sender<StageEvent>>, event: StageEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event).await;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "stage panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::channels::ChannelError;
    use crate::graph::{FnStage, Stage, StateGraph};

    #[derive(Clone, Debug, Default)]
    struct Trace {
        visited: Vec<String>,
    }

    impl GraphState for Trace {
        type Update = Option<String>;
        fn apply(&mut self, update: Option<String>) -> Result<(), ChannelError> {
            if let Some(name) = update {
                self.visited.push(name);
            }
            Ok(())
        }
    }

    struct Named(&'static str);

    #[async_trait]
    impl Stage<Trace> for Named {
        async fn run(&self, _state: Trace) -> Result<Option<String>, StageError> {
            Ok(Some(self.0.to_string()))
        }
    }

    struct Failing;

    #[async_trait]
    impl Stage<Trace> for Failing {
        async fn run(&self, _state: Trace) -> Result<Option<String>, StageError> {
            Err(StageError::ExecutionFailed("boom".into()))
        }
    }

    struct Panicking;

    #[async_trait]
    impl Stage<Trace> for Panicking {
        async fn run(&self, _state: Trace) -> Result<Option<String>, StageError> {
            panic!("stage exploded");
        }
    }

    const NONE: [&str; 0] = [];

    /// **Scenario**: A stage sees every update written by its transitive dependencies.
    #[tokio::test]
    async fn chain_passes_state_forward() {
        let mut graph = StateGraph::<Trace>::new();
        graph
            .add_stage("a", NONE, Arc::new(Named("a")))
            .unwrap()
            .add_stage("b", ["a"], Arc::new(Named("b")))
            .unwrap()
            .add_stage(
                "c",
                ["b"],
                Arc::new(FnStage::new(|s: Trace| async move {
                    assert_eq!(s.visited, vec!["a".to_string(), "b".to_string()]);
                    Ok::<_, StageError>(Some("c".to_string()))
                })),
            )
            .unwrap();
        let out = graph.compile().unwrap().invoke(Trace::default()).await.unwrap();
        assert_eq!(out.visited, vec!["a", "b", "c"]);
    }

    /// **Scenario**: An isolated failure leaves the run going and its dependents still run.
    #[tokio::test]
    async fn isolated_failure_does_not_block_dependents() {
        let mut graph = StateGraph::<Trace>::new();
        graph
            .add_stage_with_policy("bad", NONE, Arc::new(Failing), ErrorPolicy::Isolate)
            .unwrap()
            .add_stage("after", ["bad"], Arc::new(Named("after")))
            .unwrap();
        let out = graph.compile().unwrap().invoke(Trace::default()).await.unwrap();
        assert_eq!(out.visited, vec!["after"]);
    }

    /// **Scenario**: A propagated failure stops scheduling and surfaces as StageFailed.
    #[tokio::test]
    async fn propagated_failure_stops_run() {
        let mut graph = StateGraph::<Trace>::new();
        graph
            .add_stage("bad", NONE, Arc::new(Failing))
            .unwrap()
            .add_stage("after", ["bad"], Arc::new(Named("after")))
            .unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let err = graph
            .compile()
            .unwrap()
            .invoke_with_events(Trace::default(), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::StageFailed { ref stage, .. } if stage == "bad"));

        let mut seen = Vec::new();
        while let Some(ev) = rx.recv().await {
            seen.push(ev);
        }
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[1], StageEvent::Failed { .. }));
        assert!(seen.iter().all(|e| e.stage() == "bad"));
    }

    /// **Scenario**: A panic inside a stage becomes RunError::StagePanicked with the message.
    #[tokio::test]
    async fn panic_is_reported_with_stage_name() {
        let mut graph = StateGraph::<Trace>::new();
        graph.add_stage("p", NONE, Arc::new(Panicking)).unwrap();
        let err = graph.compile().unwrap().invoke(Trace::default()).await.unwrap_err();
        match err {
            RunError::StagePanicked { stage, message } => {
                assert_eq!(stage, "p");
                assert!(message.contains("stage exploded"), "{}", message);
            }
            other => panic!("expected StagePanicked, got {:?}", other),
        }
    }

    /// **Scenario**: Independent stages run concurrently (two 100ms sleeps take ~100ms).
    #[tokio::test(start_paused = true)]
    async fn independent_stages_run_concurrently() {
        let sleepy = || {
            Arc::new(FnStage::new(|_s: Trace| async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<_, StageError>(None)
            }))
        };
        let mut graph = StateGraph::<Trace>::new();
        graph
            .add_stage("x", NONE, sleepy())
            .unwrap()
            .add_stage("y", NONE, sleepy())
            .unwrap();
        let compiled = graph.compile().unwrap();
        let start = tokio::time::Instant::now();
        compiled.invoke(Trace::default()).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[test]
    fn panic_message_downcasts_strings() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "stage panicked");
    }
}
