use crate::checkpoint::CheckpointWriter;
use crate::concurrency::ConcurrencyLevel;
use crate::error::Error;
use crate::task::{TaskState, WorkflowTask};
use fanout::Context;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Runs `tasks` through `action`, honouring `level`'s concurrency bound and
/// persisting each task's new state through `checkpoint`.
///
/// Tasks already `Done` are skipped, supporting resumption after a crash.
/// Every non-done task still runs even if an earlier one failed; the
/// returned error, if any, aggregates every action failure. A checkpoint
/// write failure is logged and otherwise ignored, per the reference runner:
/// the workflow must keep making progress even against a flaky checkpoint
/// store, and only the action's own errors can stop it.
#[tracing::instrument(skip_all, fields(task_count = tasks.len(), ?level))]
pub async fn run<A, Fut, E, C>(
    ctx: &Context,
    tasks: &mut [WorkflowTask],
    level: ConcurrencyLevel,
    checkpoint: Arc<C>,
    action: A,
) -> Result<(), Error<E>>
where
    A: Fn(Context, std::collections::HashMap<String, String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: std::error::Error + Send + 'static,
    C: CheckpointWriter + 'static,
{
    let parallel_num = level.permits(tasks.len());
    let semaphore = Arc::new(tokio::sync::Semaphore::new(parallel_num as usize));
    let outcomes: Arc<Mutex<Vec<(usize, Result<(), E>)>>> = Arc::new(Mutex::new(Vec::new()));

    for index in 0..tasks.len() {
        if tasks[index].is_done() {
            tracing::debug!(task_id = %tasks[index].id, "skipping already-done task");
            continue;
        }

        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("runner's own semaphore is never closed");

        let action_fut = action(*ctx, tasks[index].attributes.clone());
        let outcomes = outcomes.clone();
        let checkpoint = checkpoint.clone();
        let task_id = tasks[index].id.clone();
        let attributes = tasks[index].attributes.clone();

        tokio::spawn(async move {
            let result = action_fut.await;

            let snapshot = match &result {
                Ok(()) => WorkflowTask {
                    id: task_id.clone(),
                    attributes,
                    state: TaskState::Done,
                    error: String::new(),
                },
                Err(err) => WorkflowTask {
                    id: task_id.clone(),
                    attributes,
                    state: TaskState::NotStarted,
                    error: err.to_string(),
                },
            };
            if let Err(checkpoint_err) = checkpoint.update_task(&snapshot).await {
                tracing::warn!(
                    task_id = %task_id,
                    error = %checkpoint_err,
                    "checkpoint write failed, continuing without it"
                );
            }

            outcomes.lock().unwrap().push((index, result));
            drop(permit);
        });
    }

    // Every task holds its permit until it (and its checkpoint write) is
    // done, so acquiring every permit back proves every spawned task has
    // finished.
    let _ = semaphore
        .acquire_many_owned(parallel_num)
        .await
        .expect("runner's own semaphore is never closed");

    let mut errors = Vec::new();
    for (index, result) in outcomes.lock().unwrap().drain(..) {
        match result {
            Ok(()) => tasks[index].state = TaskState::Done,
            Err(err) => {
                tasks[index].error = err.to_string();
                tasks[index].state = TaskState::NotStarted;
                errors.push(err);
            }
        }
    }

    fanout::Error::reduce(errors).map_err(Error::from)
}
