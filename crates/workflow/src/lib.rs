//! A bounded-parallel, checkpointed task runner for long-running workflow
//! phases (e.g. resharding) that need to fan work out across many shards
//! without losing track of progress across a restart.
//!
//! Built on the same [`tokio::sync::Semaphore`] acquire-then-spawn-then-drain
//! shape the reference codebase uses for its own bounded task server, rather
//! than a bespoke worker pool.

mod checkpoint;
mod concurrency;
mod error;
mod runner;
mod task;

pub use checkpoint::CheckpointWriter;
pub use concurrency::{ConcurrencyLevel, PARALLEL, SEQUENTIAL};
pub use error::Error;
pub use runner::run;
pub use task::{TaskState, WorkflowTask};

pub use fanout::Context;
