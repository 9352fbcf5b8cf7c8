//! Detached cache maintenance.

use std::future::Future;
use std::time::Duration;

use bookshelf_core::cache::Result;

/// Runs `fut` on the runtime without waiting for it.
///
/// The task gets at most `budget` to finish and is dropped after that. Its
/// outcome is logged and never reported to the caller.
pub fn spawn_detached<F>(task: &'static str, budget: Duration, fut: F)
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match tokio::time::timeout(budget, fut).await {
            Ok(Ok(())) => tracing::trace!(task, "Background cache task finished"),
            Ok(Err(err)) => tracing::warn!(task, error = %err, "Background cache task failed"),
            Err(_) => tracing::warn!(
                task,
                budget_ms = budget.as_millis() as u64,
                "Background cache task timed out"
            ),
        }
    });
}
