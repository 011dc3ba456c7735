use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Context carries an optional deadline through a chain of gateway calls.
///
/// It is cheaply `Clone`-able so that it can be handed to every task spawned
/// by [`crate::fan_out`]; cancellation is cooperative: the context itself
/// never aborts a future, it only tells the caller when time has run out.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    deadline: Option<Instant>,
}

impl Context {
    /// A context with no deadline; calls run until the gateway itself gives up.
    pub fn background() -> Self {
        Self { deadline: None }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Drive `fut` to completion, racing it against the deadline if any is set.
    pub async fn honor<F: Future>(&self, fut: F) -> Result<F::Output, Elapsed> {
        match self.deadline {
            None => Ok(fut.await),
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| Elapsed),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("deadline exceeded")]
pub struct Elapsed;
