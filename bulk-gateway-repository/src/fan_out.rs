//! Bounded fan-out executor.
//!
//! Runs one async operation per input item with at most `limit` operations in flight,
//! and returns the results in input order regardless of completion order. The
//! operations are polled from the calling task; nothing is spawned.
//!
//! The executor never short-circuits. Mapping functions are expected to capture
//! per-item failures in their output value, which is what lets a batch report
//! partial success.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Default number of in-flight operations per batch.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Run `f` over every item with at most `limit` futures in flight.
///
/// A `limit` of zero is treated as one. An empty input returns immediately without
/// invoking `f`.
///
/// # Example
///
/// ```
/// use bulk_gateway_repository::fan_out;
///
/// # async fn example() {
/// let doubled = fan_out(vec![1, 2, 3], 2, |n| async move { n * 2 }).await;
/// assert_eq!(doubled, vec![2, 4, 6]);
/// # }
/// ```
pub async fn fan_out<I, T, F, Fut>(items: I, limit: usize, f: F) -> Vec<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(items)
        .map(f)
        .buffered(limit.max(1))
        .collect()
        .await
}
