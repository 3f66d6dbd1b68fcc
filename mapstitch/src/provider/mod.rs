//! Remote tile source abstraction.
//!
//! A [`TileSource`] renders the deterministic URL for one tile and declares
//! the content type a healthy response must carry. The HTTP transport behind
//! it is abstracted by [`AsyncHttpClient`] so the whole fetch pipeline can be
//! exercised against a mock in tests.

mod http;
mod xam;

pub use http::{AsyncHttpClient, ReqwestClient, TileResponse};
pub use xam::{XamSource, DEFAULT_BASE_URL};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use crate::grid::{MapGrid, TileCoord};

/// A remote server publishing map tiles under a fixed URL template.
pub trait TileSource: Send + Sync {
    /// The URL serving one tile. Pure function of the key; no side effects.
    fn tile_url(&self, grid: &MapGrid, coord: TileCoord) -> String;

    /// Media type a valid tile response must declare. Responses with any
    /// other content type are rejected rather than cached, which guards
    /// against error pages served with a 200 status.
    fn content_type(&self) -> &str;
}
