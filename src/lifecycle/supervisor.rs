//! Supervised task group.
//!
//! # State Machine
//! ```text
//! Idle ──run()──▶ Running ──first failure / parent canceled──▶ Draining ──all joined──▶ Done
//! ```
//!
//! # Design Decisions
//! - One child token shared by every unit; canceled once, by whichever comes
//!   first: the parent scope or a failing unit
//! - Join semantics: `run` returns only after every unit has returned
//! - First failure in detection order wins; cancellation is not a failure
//! - Panics are fail-fast and take precedence over ordinary errors

use std::any::Any;
use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::task::{TaskError, TaskUnit};
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Idle,
    Running,
    Draining,
    Done,
}

/// The first failure observed in a group run.
#[derive(Debug, Error)]
#[error("task {task:?}: {source}")]
pub struct SupervisionError {
    pub task: String,
    #[source]
    pub source: TaskError,
}

pub struct TaskGroup {
    units: Vec<Box<dyn TaskUnit>>,
    state_tx: watch::Sender<GroupState>,
}

impl TaskGroup {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(GroupState::Idle);
        Self {
            units: Vec::new(),
            state_tx,
        }
    }

    /// Register a unit. Units start only when [`run`](Self::run) is called.
    pub fn spawn(&mut self, unit: Box<dyn TaskUnit>) -> &mut Self {
        tracing::debug!(task = unit.name(), "Registering task");
        self.units.push(unit);
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn state(&self) -> watch::Receiver<GroupState> {
        self.state_tx.subscribe()
    }

    /// Run every unit concurrently until all have returned.
    ///
    /// Returns the first failure in detection order, except that a panic
    /// outranks ordinary failures: if any unit panicked, the first panic is
    /// returned even when an ordinary failure was detected earlier.
    pub async fn run(self, parent: &CancellationToken) -> Result<(), SupervisionError> {
        let scope = parent.child_token();
        let mut set = JoinSet::new();
        let mut names = HashMap::new();

        self.state_tx.send_replace(GroupState::Running);
        tracing::info!(tasks = self.len(), "Task group starting");

        for unit in self.units {
            let name = unit.name().to_string();
            let shutdown = scope.clone();
            let task_name = name.clone();
            let handle = set.spawn(async move { (task_name, unit.run(shutdown).await) });
            names.insert(handle.id(), name);
        }

        let mut failure: Option<SupervisionError> = None;
        let mut panic: Option<SupervisionError> = None;
        let mut draining = false;

        loop {
            let joined = tokio::select! {
                joined = set.join_next() => match joined {
                    Some(joined) => joined,
                    None => break,
                },
                _ = scope.cancelled(), if !draining => {
                    draining = true;
                    self.state_tx.send_replace(GroupState::Draining);
                    tracing::info!(remaining = set.len(), "Task group draining");
                    continue;
                }
            };

            match joined {
                Ok((task, Ok(()))) => {
                    metrics::record_task_exit("ok");
                    tracing::debug!(task = %task, "Task finished");
                }
                Ok((task, Err(err))) if err.is_cancellation() && scope.is_cancelled() => {
                    metrics::record_task_exit(err.as_label());
                    tracing::debug!(task = %task, "Task canceled");
                }
                Ok((task, Err(err))) => {
                    metrics::record_task_exit(err.as_label());
                    tracing::error!(task = %task, error = %err, "Task failed");
                    cancel_once(&scope, &task);
                    if failure.is_none() {
                        failure = Some(SupervisionError { task, source: err });
                    }
                }
                Err(join_err) => {
                    let task = names
                        .get(&join_err.id())
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string());
                    if join_err.is_panic() {
                        let message = panic_message(join_err.into_panic());
                        metrics::record_task_exit("panicked");
                        tracing::error!(task = %task, panic = %message, "Task panicked");
                        cancel_once(&scope, &task);
                        if panic.is_none() {
                            panic = Some(SupervisionError {
                                task,
                                source: TaskError::Panicked(message),
                            });
                        }
                    } else {
                        tracing::debug!(task = %task, "Task aborted");
                    }
                }
            }
        }

        self.state_tx.send_replace(GroupState::Done);

        match panic.or(failure) {
            Some(err) => {
                tracing::info!(task = %err.task, "Task group stopped with error");
                Err(err)
            }
            None => {
                tracing::info!("Task group stopped");
                Ok(())
            }
        }
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

fn cancel_once(scope: &CancellationToken, cause: &str) {
    if !scope.is_cancelled() {
        tracing::warn!(task = %cause, "Canceling task group");
        scope.cancel();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
