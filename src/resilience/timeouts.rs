//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound a single attempt with a caller-imposed deadline
//! - Convert deadline elapse into a transient remote failure
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A timed-out attempt fails like any other transient error, so the retry
//!   loop records exactly one attempt for it and backs off normally

use std::future::Future;
use std::time::Duration;

use crate::resilience::types::RemoteError;

/// Run one attempt under a deadline.
///
/// On elapse the attempt fails with a message the classifier treats as
/// transient; the inner future is dropped, cancelling any in-flight work.
pub async fn with_attempt_timeout<T, Fut>(limit: Duration, attempt: Fut) -> Result<T, RemoteError>
where
    Fut: Future<Output = Result<T, RemoteError>>,
{
    match tokio::time::timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::new(format!(
            "attempt timed out after {}ms",
            limit.as_millis()
        ))),
    }
}
