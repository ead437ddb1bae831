//! Fan-out/join for one phase's gateway calls.
//!
//! Every request runs concurrently; a timeout on one marks only that request
//! as failed. The group settles when every request finished or timed out, or
//! immediately when the optional group deadline expires, in which case the
//! unfinished remainder is failed with [`FAILURE_GROUP_TIMEOUT`].

use std::future::Future;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use time::OffsetDateTime;
use tokio::sync::mpsc;

use crate::domain::round::{FAILURE_GROUP_TIMEOUT, FAILURE_TIMEOUT};
use crate::gateway::GatewayError;

/// One settled request. `result` carries the output or the failure string
/// recorded on the owning task/vote.
#[derive(Debug, Clone)]
pub struct TaskOutcome<T> {
    pub index: usize,
    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
    pub result: Result<T, String>,
}

/// Run `count` gateway calls concurrently and return all outcomes, indexed
/// by request position.
///
/// Outcomes are additionally streamed over `progress` as they settle, so the
/// caller can broadcast partial completion before the group is done. No
/// error from one call ever aborts a sibling or this function.
pub async fn run_group<T, F, Fut>(
    count: usize,
    per_task_timeout: Duration,
    group_deadline: Option<Duration>,
    progress: Option<mpsc::UnboundedSender<TaskOutcome<T>>>,
    task_fn: F,
) -> Vec<TaskOutcome<T>>
where
    T: Clone + Send + 'static,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<T, GatewayError>> + Send,
{
    let dispatched_at = OffsetDateTime::now_utc();

    let mut pending: FuturesUnordered<_> = (0..count)
        .map(|index| {
            let fut = task_fn(index);
            async move {
                let result = match tokio::time::timeout(per_task_timeout, fut).await {
                    Ok(Ok(output)) => Ok(output),
                    Ok(Err(err)) => Err(err.to_string()),
                    Err(_) => Err(FAILURE_TIMEOUT.to_string()),
                };
                TaskOutcome {
                    index,
                    started_at: dispatched_at,
                    finished_at: OffsetDateTime::now_utc(),
                    result,
                }
            }
        })
        .collect();

    let mut settled: Vec<Option<TaskOutcome<T>>> = (0..count).map(|_| None).collect();

    {
        let drain = async {
            while let Some(outcome) = pending.next().await {
                if let Some(progress) = &progress {
                    let _ = progress.send(outcome.clone());
                }
                let index = outcome.index;
                settled[index] = Some(outcome);
            }
        };

        match group_deadline {
            Some(deadline) => {
                // A lapsed deadline drops the unfinished futures; their slots
                // are failed below.
                let _ = tokio::time::timeout(deadline, drain).await;
            }
            None => drain.await,
        }
    }

    settled
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| {
            outcome.unwrap_or_else(|| {
                let outcome = TaskOutcome {
                    index,
                    started_at: dispatched_at,
                    finished_at: OffsetDateTime::now_utc(),
                    result: Err(FAILURE_GROUP_TIMEOUT.to_string()),
                };
                if let Some(progress) = &progress {
                    let _ = progress.send(outcome.clone());
                }
                outcome
            })
        })
        .collect()
}
