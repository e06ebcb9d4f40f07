//! The "run until canceled" unit of work supervised by [`TaskGroup`].
//!
//! [`TaskGroup`]: crate::lifecycle::TaskGroup

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors a supervised unit can return.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The unit stopped because its scope was canceled.
    #[error("operation was canceled")]
    Canceled,

    /// Listener-level failure (bind, accept).
    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Any other unit failure.
    #[error("{0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The unit panicked.
    #[error("task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    pub fn transport(context: &'static str, source: std::io::Error) -> Self {
        TaskError::Transport { context, source }
    }

    pub fn failed(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        TaskError::Failed(err.into())
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }

    /// Short stable label for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Canceled => "canceled",
            TaskError::Transport { .. } => "transport",
            TaskError::Failed(_) => "failed",
            TaskError::Panicked(_) => "panicked",
        }
    }
}

/// A long-lived operation that runs until `shutdown` is canceled, then
/// returns promptly.
#[async_trait]
pub trait TaskUnit: Send + 'static {
    fn name(&self) -> &str;

    async fn run(self: Box<Self>, shutdown: CancellationToken) -> Result<(), TaskError>;
}

/// Adapter turning an async closure into a [`TaskUnit`].
pub struct FnTask<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F, Fut> TaskUnit for FnTask<F>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(self: Box<Self>, shutdown: CancellationToken) -> Result<(), TaskError> {
        (self.f)(shutdown).await
    }
}

pub fn task_fn<F, Fut>(name: impl Into<String>, f: F) -> Box<dyn TaskUnit>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    Box::new(FnTask {
        name: name.into(),
        f,
    })
}
