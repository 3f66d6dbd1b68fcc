//! Progress reporting for grid runs.
//!
//! The scheduler ticks a [`ProgressSink`] on every terminal tile outcome so a
//! frontend can render a bar or counter. Reporting is purely cosmetic and
//! must never affect control flow; sink implementations should not block.

use crate::grid::MapGrid;
use crate::scheduler::GridSummary;

/// Observer for grid fetch progress.
///
/// All methods have empty default bodies so implementations only override
/// what they render.
pub trait ProgressSink: Send + Sync {
    /// A grid run is starting; `total_tiles` ticks will follow at most.
    fn grid_started(&self, _grid: &MapGrid, _total_tiles: u64) {}

    /// One tile reached a terminal state (completed, skipped, cancelled or
    /// failed).
    fn tile_finished(&self) {}

    /// The grid run ended; `summary` holds the aggregate counts.
    fn grid_finished(&self, _summary: &GridSummary) {}
}

/// Sink that discards all progress events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {}
