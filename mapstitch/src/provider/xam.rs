//! The xam.nu tile server.

use super::TileSource;
use crate::grid::{MapGrid, TileCoord};

/// Base URL of the public xam.nu Chernarus tile server.
pub const DEFAULT_BASE_URL: &str = "https://static.xam.nu/dayz/maps/chernarusplus";

/// Tile source for xam.nu map tiles.
///
/// URLs follow the template
/// `<base>/<version>/<maptype>/<resolution>/<x>/<y>.webp`; all tiles are
/// served as WebP.
#[derive(Debug, Clone)]
pub struct XamSource {
    base_url: String,
}

impl Default for XamSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl XamSource {
    /// Create a source with a custom base URL (mirrors, test servers).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl TileSource for XamSource {
    fn tile_url(&self, grid: &MapGrid, coord: TileCoord) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}.webp",
            self.base_url,
            grid.game_version(),
            grid.map_type(),
            grid.resolution(),
            coord.x,
            coord.y
        )
    }

    fn content_type(&self) -> &str {
        "image/webp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MapType;

    #[test]
    fn test_tile_url_template() {
        let source = XamSource::default();
        let grid = MapGrid::new("1.27", MapType::Satellite, 8).unwrap();
        assert_eq!(
            source.tile_url(&grid, TileCoord::new(12, 200)),
            "https://static.xam.nu/dayz/maps/chernarusplus/1.27/satellite/8/12/200.webp"
        );
    }

    #[test]
    fn test_custom_base_url() {
        let source = XamSource::new("http://localhost:8080/maps");
        let grid = MapGrid::new("1.27", MapType::Topographic, 0).unwrap();
        assert_eq!(
            source.tile_url(&grid, TileCoord::new(0, 0)),
            "http://localhost:8080/maps/1.27/topographic/0/0/0.webp"
        );
    }

    #[test]
    fn test_expected_content_type() {
        assert_eq!(XamSource::default().content_type(), "image/webp");
    }
}
