use crate::task::WorkflowTask;

/// Persists a task's post-action state. A checkpoint failure is logged by
/// the runner and never aborts the workflow; see [`crate::run`].
#[async_trait::async_trait]
pub trait CheckpointWriter: Send + Sync {
    async fn update_task(
        &self,
        task: &WorkflowTask,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
