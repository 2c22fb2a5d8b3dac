//! Progress notifications from a synthesis run.
//!
//! The engine never writes to an output stream itself. Callers that want
//! progress implement [`SynthesisObserver`]; [`TracingObserver`] forwards
//! to `tracing` for command-line use.

use tracing::{debug, trace};

/// Receives progress events during island traversal.
///
/// Every method has a no-op default so implementors override only what
/// they need.
pub trait SynthesisObserver {
    /// An island has been closed off.
    fn island_completed(&mut self, _index: usize, _point_count: usize) {}

    /// `visited` of `total` ink points have been assigned to islands.
    ///
    /// Called every [`progress_interval`](crate::SynthesisConfig::progress_interval)
    /// points when that interval is non-zero.
    fn points_processed(&mut self, _visited: usize, _total: usize) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SynthesisObserver for NoopObserver {}

/// Observer that logs events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SynthesisObserver for TracingObserver {
    fn island_completed(&mut self, index: usize, point_count: usize) {
        trace!(island = index, points = point_count, "island completed");
    }

    #[allow(clippy::cast_precision_loss)]
    fn points_processed(&mut self, visited: usize, total: usize) {
        let percent = if total == 0 {
            100.0
        } else {
            visited as f64 / total as f64 * 100.0
        };
        debug!(visited, total, "traversal {percent:.1}% complete");
    }
}
