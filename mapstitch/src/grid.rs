//! Map identity and tile grid enumeration.
//!
//! A map at resolution `r` is a square grid of `2^r × 2^r` fixed-size tiles.
//! `MapGrid` carries everything except the coordinate needed to address one
//! tile; remote URL and local cache path are pure functions of
//! (`MapGrid`, `TileCoord`).

use std::fmt;

use thiserror::Error;

/// Highest supported resolution. `2^16` tiles per axis is already far beyond
/// anything the tile servers publish.
pub const MAX_RESOLUTION: u8 = 16;

/// Errors from constructing a [`MapGrid`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Requested resolution exceeds [`MAX_RESOLUTION`].
    #[error("resolution {resolution} exceeds maximum {max}")]
    InvalidResolution { resolution: u8, max: u8 },
}

/// Map style published by the tile server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapType {
    /// Aerial/satellite imagery.
    Satellite,
    /// Topographic rendering.
    Topographic,
}

impl MapType {
    /// The lowercase wire form used in URLs and cache directory names.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapType::Satellite => "satellite",
            MapType::Topographic => "topographic",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of one tile within its grid.
///
/// Both axes run `0..grid_size`; `x` selects the column directory in the
/// cache, `y` the file within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.x, self.y)
    }
}

/// One map's tile grid at a single resolution.
///
/// # Example
///
/// ```
/// use mapstitch::grid::{MapGrid, MapType};
///
/// let grid = MapGrid::new("1.27", MapType::Satellite, 2).unwrap();
/// assert_eq!(grid.grid_size(), 4);
/// assert_eq!(grid.tile_count(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapGrid {
    game_version: String,
    map_type: MapType,
    resolution: u8,
}

impl MapGrid {
    /// Create a grid identity, validating the resolution up front.
    ///
    /// # Arguments
    ///
    /// * `game_version` - Game version string, e.g. "1.27"
    /// * `map_type` - Satellite or topographic
    /// * `resolution` - Zoom level; the grid is `2^resolution` tiles per axis
    pub fn new(
        game_version: impl Into<String>,
        map_type: MapType,
        resolution: u8,
    ) -> Result<Self, GridError> {
        if resolution > MAX_RESOLUTION {
            return Err(GridError::InvalidResolution {
                resolution,
                max: MAX_RESOLUTION,
            });
        }
        Ok(Self {
            game_version: game_version.into(),
            map_type,
            resolution,
        })
    }

    /// Game version the tiles belong to.
    pub fn game_version(&self) -> &str {
        &self.game_version
    }

    /// Map style.
    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    /// Zoom level.
    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    /// Tiles per axis: `2^resolution`.
    pub fn grid_size(&self) -> u32 {
        1u32 << self.resolution
    }

    /// Total number of tiles in the grid.
    pub fn tile_count(&self) -> u64 {
        u64::from(self.grid_size()) * u64::from(self.grid_size())
    }

    /// Enumerate every coordinate in the grid, x outer and y inner.
    ///
    /// The order only affects how progress is perceived; sibling tile
    /// fetches are independent and commutative.
    pub fn coordinates(&self) -> impl Iterator<Item = TileCoord> {
        let size = self.grid_size();
        (0..size).flat_map(move |x| (0..size).map(move |y| TileCoord::new(x, y)))
    }

    /// Human-readable label for progress output, e.g. "1.27/satellite/3".
    pub fn label(&self) -> String {
        format!("{}/{}/{}", self.game_version, self.map_type, self.resolution)
    }
}
