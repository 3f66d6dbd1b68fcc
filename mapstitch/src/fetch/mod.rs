//! Single-tile fetching.
//!
//! [`TileFetcher`] resolves one coordinate to its cache path, skips work that
//! is already done, and otherwise performs exactly one HTTP GET followed by
//! an atomic write (temp file + rename). The GET runs under a
//! [`FetchLimiter`] permit; cache hits never touch the gate. Cancellation is
//! observed at every suspension point, so a cancelled fetch never leaves
//! anything at the final tile path. Retry policy, if any, belongs one layer
//! up; this component never retries.

mod error;
mod limiter;

pub use error::FetchError;
pub use limiter::{FetchLimiter, FetchPermit};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::CacheLayout;
use crate::grid::{MapGrid, TileCoord};
use crate::provider::{AsyncHttpClient, TileSource};

/// Terminal state of one tile fetch. Consumed immediately by the scheduler's
/// aggregation; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The tile was already cached; no network access happened.
    Skipped,
    /// The tile was downloaded and renamed into place.
    Completed,
    /// Cancellation was observed before the tile was finalized.
    Cancelled,
}

/// Downloads one tile per call, resuming from the cache.
pub struct TileFetcher<C: AsyncHttpClient> {
    client: C,
    source: Arc<dyn TileSource>,
    layout: CacheLayout,
    limiter: FetchLimiter,
}

impl<C: AsyncHttpClient> TileFetcher<C> {
    /// Create a fetcher.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP transport
    /// * `source` - URL template and expected content type
    /// * `layout` - cache path derivation
    /// * `limiter` - permit pool gating the network phase
    pub fn new(
        client: C,
        source: Arc<dyn TileSource>,
        layout: CacheLayout,
        limiter: FetchLimiter,
    ) -> Self {
        Self {
            client,
            source,
            layout,
            limiter,
        }
    }

    /// The cache layout this fetcher writes into.
    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// The permit pool gating this fetcher's network phase.
    pub fn limiter(&self) -> &FetchLimiter {
        &self.limiter
    }

    /// Fetch one tile into the cache.
    ///
    /// Returns [`FetchOutcome::Skipped`] without any network access when the
    /// tile file already exists, which is what makes re-running a partially
    /// failed grid cheap and safe.
    pub async fn fetch(
        &self,
        grid: &MapGrid,
        coord: TileCoord,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome, FetchError> {
        // Idempotent, and outside the permit: filesystem preparation must
        // not serialize behind the gate.
        let dir = self.layout.column_dir(grid, coord.x);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| FetchError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let path = self.layout.tile_path(grid, coord);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(FetchOutcome::Skipped);
        }

        if cancel.is_cancelled() {
            return Ok(FetchOutcome::Cancelled);
        }

        // Acquire a permit from the concurrency gate for the network phase.
        let _permit = self.limiter.acquire().await;
        if cancel.is_cancelled() {
            return Ok(FetchOutcome::Cancelled);
        }

        let url = self.source.tile_url(grid, coord);
        let response = tokio::select! {
            _ = cancel.cancelled() => return Ok(FetchOutcome::Cancelled),
            response = self.client.get(&url) => response?,
        };

        if !response.is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status,
                url,
            });
        }

        let expected = self.source.content_type();
        let actual = response.media_type();
        if actual != Some(expected) {
            return Err(FetchError::InvalidContentType {
                url,
                expected: expected.to_string(),
                actual: actual.map(ToString::to_string),
            });
        }

        if cancel.is_cancelled() {
            return Ok(FetchOutcome::Cancelled);
        }

        // Write to a sibling and rename so a crash mid-write can never be
        // mistaken for a complete tile on resume.
        let part = self.layout.tile_part_path(grid, coord);
        tokio::fs::write(&part, &response.body)
            .await
            .map_err(|source| FetchError::WriteTile {
                path: part.clone(),
                source,
            })?;
        tokio::fs::rename(&part, &path)
            .await
            .map_err(|source| FetchError::WriteTile {
                path: path.clone(),
                source,
            })?;

        debug!(tile = %coord, bytes = response.body.len(), "tile cached");
        Ok(FetchOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MapType;
    use crate::provider::{MockHttpClient, XamSource};

    fn grid() -> MapGrid {
        MapGrid::new("1.27", MapType::Satellite, 1).unwrap()
    }

    fn fetcher(client: MockHttpClient, root: &std::path::Path) -> TileFetcher<MockHttpClient> {
        TileFetcher::new(
            client,
            Arc::new(XamSource::default()),
            CacheLayout::new(root),
            FetchLimiter::new(4),
        )
    }

    #[tokio::test]
    async fn test_fetch_writes_tile_and_cleans_temp() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher(MockHttpClient::webp(b"tile-bytes"), dir.path());
        let coord = TileCoord::new(0, 1);

        let outcome = fetcher
            .fetch(&grid(), coord, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::Completed);
        let path = fetcher.layout().tile_path(&grid(), coord);
        assert_eq!(std::fs::read(&path).unwrap(), b"tile-bytes");
        assert!(!fetcher.layout().tile_part_path(&grid(), coord).exists());
    }

    #[tokio::test]
    async fn test_cached_tile_is_skipped_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher(MockHttpClient::webp(b"fresh"), dir.path());
        let coord = TileCoord::new(1, 0);

        let path = fetcher.layout().tile_path(&grid(), coord);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"already-there").unwrap();

        let outcome = fetcher
            .fetch(&grid(), coord, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::Skipped);
        assert_eq!(fetcher.client.calls(), 0);
        assert_eq!(std::fs::read(&path).unwrap(), b"already-there");
    }

    #[tokio::test]
    async fn test_skip_does_not_wait_on_the_gate() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = TileFetcher::new(
            MockHttpClient::webp(b"fresh"),
            Arc::new(XamSource::default()),
            CacheLayout::new(dir.path()),
            FetchLimiter::new(1),
        );
        let coord = TileCoord::new(0, 0);

        let path = fetcher.layout().tile_path(&grid(), coord);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"cached").unwrap();

        // Hold the only permit; a cache hit must still return immediately.
        let _held = fetcher.limiter().acquire().await;
        let outcome = fetcher
            .fetch(&grid(), coord, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_http_error_status_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher(MockHttpClient::webp(b"nope").with_status(503), dir.path());
        let coord = TileCoord::new(0, 0);

        let err = fetcher
            .fetch(&grid(), coord, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::HttpStatus { status: 503, .. }));
        assert!(!fetcher.layout().tile_path(&grid(), coord).exists());
    }

    #[tokio::test]
    async fn test_wrong_content_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::webp(b"<html>404</html>")
            .with_content_type(Some("text/html; charset=utf-8"));
        let fetcher = fetcher(client, dir.path());
        let coord = TileCoord::new(1, 1);

        let err = fetcher
            .fetch(&grid(), coord, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            FetchError::InvalidContentType {
                expected, actual, ..
            } => {
                assert_eq!(expected, "image/webp");
                assert_eq!(actual.as_deref(), Some("text/html"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!fetcher.layout().tile_path(&grid(), coord).exists());
    }

    #[tokio::test]
    async fn test_missing_content_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::webp(b"??").with_content_type(None);
        let fetcher = fetcher(client, dir.path());

        let err = fetcher
            .fetch(&grid(), TileCoord::new(0, 0), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::InvalidContentType { actual: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher(MockHttpClient::webp(b"tile"), dir.path());
        let coord = TileCoord::new(0, 0);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = fetcher.fetch(&grid(), coord, &cancel).await.unwrap();

        assert_eq!(outcome, FetchOutcome::Cancelled);
        assert_eq!(fetcher.client.calls(), 0);
        assert!(!fetcher.layout().tile_path(&grid(), coord).exists());
    }
}
