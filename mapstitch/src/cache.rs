//! On-disk tile cache layout.
//!
//! The cache is a directory tree keyed by map identity, one subdirectory per
//! x-column, one file per y-row:
//!
//! ```text
//! <root>/<version>_<maptype>_<resolution>/<x>/<y>.webp
//! ```
//!
//! Every path is a pure function of the grid identity and coordinate, so
//! concurrent fetches never target the same file and need no locking. A file
//! present at its final path is the sole proof that the tile was downloaded
//! completely; in-progress writes use a `.part` sibling that is renamed into
//! place.

use std::io;
use std::path::{Path, PathBuf};

use crate::grid::{MapGrid, TileCoord};

/// Default cache root, relative to the working directory.
pub const DEFAULT_CACHE_ROOT: &str = "static/images/map/tiles";

/// Deterministic path derivation for cached tiles and composed atlases.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl Default for CacheLayout {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_ROOT)
    }
}

impl CacheLayout {
    /// Create a layout rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one grid's tiles:
    /// `<root>/<version>_<maptype>_<resolution>`.
    pub fn grid_dir(&self, grid: &MapGrid) -> PathBuf {
        self.root.join(format!(
            "{}_{}_{}",
            grid.game_version(),
            grid.map_type(),
            grid.resolution()
        ))
    }

    /// Directory holding one column of tiles: `<grid_dir>/<x>`.
    pub fn column_dir(&self, grid: &MapGrid, x: u32) -> PathBuf {
        self.grid_dir(grid).join(x.to_string())
    }

    /// Final path of one tile: `<column_dir>/<y>.webp`.
    pub fn tile_path(&self, grid: &MapGrid, coord: TileCoord) -> PathBuf {
        self.column_dir(grid, coord.x).join(format!("{}.webp", coord.y))
    }

    /// Temporary sibling a tile is written to before the atomic rename.
    pub fn tile_part_path(&self, grid: &MapGrid, coord: TileCoord) -> PathBuf {
        let mut path = self.tile_path(grid, coord).into_os_string();
        path.push(".part");
        PathBuf::from(path)
    }

    /// File name of the composed atlas, e.g. `satellite_1.27_4x4.png`.
    pub fn atlas_file_name(&self, grid: &MapGrid) -> String {
        let size = grid.grid_size();
        format!(
            "{}_{}_{}x{}.png",
            grid.map_type(),
            grid.game_version(),
            size,
            size
        )
    }

    /// Remove one grid's cache tree. A grid that was never fetched (or was
    /// already cleaned) is not an error.
    pub fn clear_grid(&self, grid: &MapGrid) -> io::Result<()> {
        match std::fs::remove_dir_all(self.grid_dir(grid)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}
