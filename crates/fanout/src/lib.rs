//! Parallel fan-out over a set of participants, with error aggregation.
//!
//! This crate has exactly one job: given a list of items and an async action,
//! run the action once per item, wait for all of them regardless of failure,
//! and reduce whatever errors came back to a single value. Nothing here knows
//! about transactions, shards, or gateways; [`coordinator`] and [`workflow`]
//! build their retry-free, all-must-finish semantics on top of it.

mod context;
mod error;

pub use context::{Context, Elapsed};
pub use error::Error;

use std::future::Future;

/// Runs `action` once for every item in `items`, concurrently, and joins all
/// of them before returning.
///
/// If `items` holds exactly one element, `action` runs inline on the calling
/// task: no spawn, no join, and a bare error rather than an aggregate of one.
/// Otherwise every item is spawned onto the runtime before any of them is
/// awaited, and every spawned task is awaited even after the first failure:
/// fan-out never cancels in-flight work.
pub async fn fan_out<T, E, F, Fut>(ctx: &Context, items: Vec<T>, action: F) -> Result<(), Error<E>>
where
    T: Send + 'static,
    E: std::error::Error + Send + 'static,
    F: Fn(Context, T) -> Fut,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
{
    let mut items = items.into_iter();

    let Some(first) = items.next() else {
        return Ok(());
    };
    let Some(second) = items.next() else {
        return action(*ctx, first).await.map_err(Error::Single);
    };

    let handles: Vec<_> = std::iter::once(first)
        .chain(std::iter::once(second))
        .chain(items)
        .map(|item| tokio::spawn(action(*ctx, item)))
        .collect();

    let mut errors = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => errors.push(err),
            Err(join_err) => {
                // The task panicked or was cancelled out from under us; a
                // panic is a defect in `action`, not a participant failure,
                // so resume the panic here rather than swallow it.
                if join_err.is_panic() {
                    std::panic::resume_unwind(join_err.into_panic());
                }
            }
        }
    }

    Error::reduce(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, thiserror::Error)]
    #[error("boom on {0}")]
    struct BoomError(u32);

    #[tokio::test]
    async fn single_item_runs_inline_and_unwraps_error() {
        let ctx = Context::background();
        let invocations = Arc::new(AtomicUsize::new(0));

        let result = {
            let invocations = invocations.clone();
            fan_out(&ctx, vec![7u32], move |_ctx, item| {
                let invocations = invocations.clone();
                async move {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(BoomError(item))
                }
            })
            .await
        };

        assert_eq!(invocations.load(Ordering::SeqCst), 1);
        match result.unwrap_err() {
            Error::Single(BoomError(7)) => {}
            other => panic!("expected bare Single error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_tasks_run_even_after_failures() {
        let ctx = Context::background();
        let invocations = Arc::new(AtomicUsize::new(0));

        let result = {
            let invocations = invocations.clone();
            fan_out(&ctx, vec![1u32, 2, 3, 4], move |_ctx, item| {
                let invocations = invocations.clone();
                async move {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    if item % 2 == 0 {
                        Err(BoomError(item))
                    } else {
                        Ok(())
                    }
                }
            })
            .await
        };

        assert_eq!(invocations.load(Ordering::SeqCst), 4);
        match result.unwrap_err() {
            Error::Aggregate(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected Aggregate of 2, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_input_succeeds() {
        let ctx = Context::background();
        let result: Result<(), Error<BoomError>> =
            fan_out(&ctx, Vec::<u32>::new(), |_ctx, _item| async { Ok(()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn no_errors_among_many_succeeds() {
        let ctx = Context::background();
        let result: Result<(), Error<BoomError>> =
            fan_out(&ctx, vec![1u32, 2, 3], |_ctx, _item| async { Ok(()) }).await;
        assert!(result.is_ok());
    }

    /// Fan-out of N actions where K fail returns an aggregate containing
    /// exactly K child errors, and all N actions ran regardless of K.
    #[quickcheck_macros::quickcheck]
    fn aggregate_has_exactly_k_errors_and_all_n_ran(total: u8, fail_every: u8) -> bool {
        let total = (total % 12) as u32;
        let fail_every = 1 + (fail_every % 5) as u32;

        let invocations = Arc::new(AtomicUsize::new(0));
        let items: Vec<u32> = (0..total).collect();
        let expected_failures = items.iter().filter(|i| *i % fail_every == 0).count();

        let result = {
            let invocations = invocations.clone();
            tokio_test::block_on(fan_out(&Context::background(), items, move |_ctx, item| {
                let invocations = invocations.clone();
                async move {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    if item % fail_every == 0 {
                        Err(BoomError(item))
                    } else {
                        Ok(())
                    }
                }
            }))
        };

        if invocations.load(Ordering::SeqCst) as u32 != total {
            return false;
        }

        match (expected_failures, result) {
            (0, Ok(())) => true,
            (1, Err(Error::Single(_))) => true,
            (n, Err(Error::Aggregate(errors))) if n >= 2 => errors.len() == n,
            _ => false,
        }
    }
}
