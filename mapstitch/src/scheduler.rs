//! Bounded-concurrency grid scheduling.
//!
//! The scheduler fans one fetch out per grid coordinate through a sliding
//! window of concurrently polled futures; the fetcher's
//! [`FetchLimiter`](crate::fetch::FetchLimiter) gates each network phase.
//! The window (twice the gate capacity) bounds memory for large grids while
//! the gate alone bounds simultaneous requests.
//!
//! # Fail-fast
//!
//! The first fetch error cancels the shared token exactly once. Nothing new
//! is submitted after that; every outstanding future is drained so it can
//! observe cancellation and unwind, and the original error is returned with
//! any later errors discarded. Tiles that finished before cancellation stay
//! in the cache, which is what makes a re-run resume instead of restart.

use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::fetch::{FetchError, FetchOutcome, TileFetcher};
use crate::grid::{MapGrid, TileCoord};
use crate::progress::ProgressSink;
use crate::provider::AsyncHttpClient;

/// Aggregate counts for one grid run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSummary {
    /// Tiles in the grid.
    pub total: u64,
    /// Tiles downloaded this run.
    pub completed: u64,
    /// Tiles already cached.
    pub skipped: u64,
    /// Tiles that observed cancellation and unwound.
    pub cancelled: u64,
    /// Tiles that failed. Fail-fast means at most the window size.
    pub failed: u64,
}

impl GridSummary {
    /// An empty summary for a grid of `total` tiles.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            completed: 0,
            skipped: 0,
            cancelled: 0,
            failed: 0,
        }
    }

    fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Completed => self.completed += 1,
            FetchOutcome::Skipped => self.skipped += 1,
            FetchOutcome::Cancelled => self.cancelled += 1,
        }
    }

    /// Tiles that reached a terminal state.
    pub fn finished(&self) -> u64 {
        self.completed + self.skipped + self.cancelled + self.failed
    }
}

/// Schedules every tile of a grid through the fetch pipeline.
pub struct GridScheduler<C: AsyncHttpClient> {
    fetcher: TileFetcher<C>,
}

impl<C: AsyncHttpClient> GridScheduler<C> {
    /// Create a scheduler driving the given fetcher.
    pub fn new(fetcher: TileFetcher<C>) -> Self {
        Self { fetcher }
    }

    /// Fetch every tile of `grid`, failing fast on the first error.
    ///
    /// Progress is ticked on every terminal outcome, including failures and
    /// cancellations, so a bar always reaches a stable final position.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error after all in-flight siblings have been
    /// cancelled and drained. An externally cancelled token is not an error
    /// here; callers inspect the token or the summary's `cancelled` count.
    pub async fn run(
        &self,
        grid: &MapGrid,
        progress: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> Result<GridSummary, FetchError> {
        let mut summary = GridSummary::new(grid.tile_count());
        progress.grid_started(grid, summary.total);
        info!(
            label = %grid.label(),
            tiles = summary.total,
            window = self.window(),
            "grid fetch started"
        );

        let mut coords = grid.coordinates();
        let mut in_flight = FuturesUnordered::new();
        for coord in coords.by_ref().take(self.window()) {
            in_flight.push(self.fetch_one(grid, coord, &cancel));
        }

        let mut first_error: Option<FetchError> = None;

        while let Some(result) = in_flight.next().await {
            match result {
                Ok(outcome) => summary.record(outcome),
                Err(err) => {
                    summary.failed += 1;
                    if first_error.is_none() {
                        warn!(label = %grid.label(), error = %err, "tile failed, cancelling grid");
                        cancel.cancel();
                        first_error = Some(err);
                    }
                }
            }
            progress.tile_finished();

            if !cancel.is_cancelled() {
                if let Some(coord) = coords.next() {
                    in_flight.push(self.fetch_one(grid, coord, &cancel));
                }
            }
        }

        progress.grid_finished(&summary);

        if let Some(err) = first_error {
            return Err(err);
        }
        info!(
            label = %grid.label(),
            completed = summary.completed,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            "grid fetch finished"
        );
        Ok(summary)
    }

    fn window(&self) -> usize {
        self.fetcher.limiter().capacity().saturating_mul(2)
    }

    async fn fetch_one(
        &self,
        grid: &MapGrid,
        coord: TileCoord,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome, FetchError> {
        if cancel.is_cancelled() {
            return Ok(FetchOutcome::Cancelled);
        }
        self.fetcher.fetch(grid, coord, cancel).await
    }
}
