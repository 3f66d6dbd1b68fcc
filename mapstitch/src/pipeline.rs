//! The full fetch-and-compose pipeline.
//!
//! Resolutions are processed strictly sequentially, never concurrently with
//! each other: peak connection count and disk usage stay bounded to one
//! grid at a time. A failure in any grid aborts the remaining resolutions;
//! whatever was cached stays on disk so the next run resumes.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::atlas::{AtlasComposer, AtlasError};
use crate::cache::CacheLayout;
use crate::fetch::FetchError;
use crate::grid::MapGrid;
use crate::progress::ProgressSink;
use crate::provider::AsyncHttpClient;
use crate::scheduler::GridScheduler;

/// Errors that can occur while driving the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A tile fetch failed; the grid run was cancelled.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Atlas composition failed.
    #[error(transparent)]
    Atlas(#[from] AtlasError),

    /// Removing a composed grid's cache tree failed.
    #[error("failed to clear tile cache {path}: {source}")]
    ClearCache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The run was interrupted; cached tiles were kept for resume.
    #[error("interrupted; cached tiles were kept for resume")]
    Interrupted,
}

/// Drives grid fetches, and optionally composition, over a batch of
/// resolutions.
pub struct AtlasPipeline<C: AsyncHttpClient> {
    scheduler: GridScheduler<C>,
    layout: CacheLayout,
    composer: Option<AtlasComposer>,
}

impl<C: AsyncHttpClient> AtlasPipeline<C> {
    /// Create a fetch-only pipeline: tiles are downloaded into the cache and
    /// left there.
    pub fn new(scheduler: GridScheduler<C>, layout: CacheLayout) -> Self {
        Self {
            scheduler,
            layout,
            composer: None,
        }
    }

    /// Enable composition: after each grid completes, the atlas is composed
    /// and that grid's cache tree is removed.
    pub fn with_composer(mut self, composer: AtlasComposer) -> Self {
        self.composer = Some(composer);
        self
    }

    /// Process every grid in order.
    ///
    /// The first failure aborts the batch immediately; no skip-and-continue
    /// across resolutions. External cancellation (Ctrl-C) surfaces as
    /// [`PipelineError::Interrupted`].
    pub async fn run(
        &self,
        grids: &[MapGrid],
        progress: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> Result<(), PipelineError> {
        for grid in grids {
            if cancel.is_cancelled() {
                return Err(PipelineError::Interrupted);
            }

            let summary = self.scheduler.run(grid, progress, cancel.clone()).await?;
            if cancel.is_cancelled() {
                info!(
                    label = %grid.label(),
                    completed = summary.completed,
                    "interrupted; cache kept for resume"
                );
                return Err(PipelineError::Interrupted);
            }

            if let Some(composer) = &self.composer {
                let atlas_path = composer.compose(grid)?;
                info!(label = %grid.label(), path = %atlas_path.display(), "atlas composed");

                // The cache for a composed grid has served its purpose.
                self.layout
                    .clear_grid(grid)
                    .map_err(|source| PipelineError::ClearCache {
                        path: self.layout.grid_dir(grid),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    use bytes::Bytes;
    use image::{ImageFormat, Rgba, RgbaImage};

    use crate::fetch::{FetchLimiter, TileFetcher};
    use crate::grid::MapType;
    use crate::progress::NullProgress;
    use crate::provider::{MockHttpClient, XamSource};

    const TILE_SIZE: u32 = 4;

    fn tile_bytes() -> Bytes {
        let tile = RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        tile.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        Bytes::from(buf)
    }

    fn grids(resolutions: &[u8]) -> Vec<MapGrid> {
        resolutions
            .iter()
            .map(|&r| MapGrid::new("1.27", MapType::Satellite, r).unwrap())
            .collect()
    }

    fn pipeline(
        client: Arc<MockHttpClient>,
        root: &Path,
    ) -> (AtlasPipeline<Arc<MockHttpClient>>, CacheLayout) {
        let layout = CacheLayout::new(root.join("cache"));
        let fetcher = TileFetcher::new(
            client,
            Arc::new(XamSource::default()),
            layout.clone(),
            FetchLimiter::new(4),
        );
        (AtlasPipeline::new(GridScheduler::new(fetcher), layout.clone()), layout)
    }

    #[tokio::test]
    async fn test_end_to_end_fetch_compose_and_clean() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(MockHttpClient::with_body(tile_bytes()));
        let (pipeline, layout) = pipeline(Arc::clone(&client), dir.path());
        let out_dir = dir.path().join("out");
        let pipeline =
            pipeline.with_composer(AtlasComposer::new(layout.clone(), &out_dir));

        let batch = grids(&[1]);
        pipeline
            .run(&batch, &NullProgress, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(client.calls(), 4);

        let atlas_path = out_dir.join("satellite_1.27_2x2.png");
        assert!(atlas_path.exists(), "atlas must be saved");
        let atlas = image::open(&atlas_path).unwrap();
        assert_eq!(atlas.width(), 2 * TILE_SIZE);
        assert_eq!(atlas.height(), 2 * TILE_SIZE);

        assert!(
            !layout.grid_dir(&batch[0]).exists(),
            "composed grid's cache must be cleared"
        );
    }

    #[tokio::test]
    async fn test_fetch_only_keeps_cache_and_makes_no_atlas() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(MockHttpClient::with_body(tile_bytes()));
        let (pipeline, layout) = pipeline(Arc::clone(&client), dir.path());

        let batch = grids(&[1]);
        pipeline
            .run(&batch, &NullProgress, CancellationToken::new())
            .await
            .unwrap();

        assert!(layout.grid_dir(&batch[0]).exists());
        assert_eq!(client.calls(), 4);
    }

    #[tokio::test]
    async fn test_resolutions_run_sequentially_and_failure_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        // Every URL fails: the first grid's single tile errors and the
        // second grid must never start.
        let client = Arc::new(MockHttpClient::with_body(tile_bytes()).failing_when(".webp"));
        let (pipeline, _layout) = pipeline(Arc::clone(&client), dir.path());

        let err = pipeline
            .run(&grids(&[0, 1]), &NullProgress, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Fetch(FetchError::Network { .. })));
        assert_eq!(client.calls(), 1, "second resolution must not start");
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_interrupts_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(MockHttpClient::with_body(tile_bytes()));
        let (pipeline, _layout) = pipeline(Arc::clone(&client), dir.path());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pipeline
            .run(&grids(&[1]), &NullProgress, cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Interrupted));
        assert_eq!(client.calls(), 0);
    }
}
