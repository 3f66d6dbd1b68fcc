//! Terminal progress rendering.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

use mapstitch::grid::MapGrid;
use mapstitch::progress::ProgressSink;
use mapstitch::scheduler::GridSummary;

/// Progress sink drawing one indicatif bar per grid run.
pub struct ConsoleProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleProgress {
    /// Create a sink with no active bar.
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:20} [{bar:40}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn grid_started(&self, grid: &MapGrid, total_tiles: u64) {
        let bar = ProgressBar::new(total_tiles);
        bar.set_style(Self::style());
        bar.set_message(grid.label());
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn tile_finished(&self) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.inc(1);
            }
        }
    }

    fn grid_finished(&self, summary: &GridSummary) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_with_message(format!(
                    "{} fetched, {} already cached",
                    summary.completed, summary.skipped
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapstitch::grid::MapType;

    #[test]
    fn test_full_grid_lifecycle_does_not_panic() {
        let sink = ConsoleProgress::new();
        let grid = MapGrid::new("1.27", MapType::Satellite, 1).unwrap();

        sink.grid_started(&grid, 4);
        for _ in 0..4 {
            sink.tile_finished();
        }
        let mut summary = GridSummary::new(4);
        summary.completed = 4;
        sink.grid_finished(&summary);
    }

    #[test]
    fn test_tick_without_active_bar_is_ignored() {
        let sink = ConsoleProgress::new();
        sink.tile_finished();
    }
}
