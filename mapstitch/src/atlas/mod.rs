//! Atlas composition from cached tiles.
//!
//! Reads every tile of one grid in increasing x then increasing y, pastes
//! them onto a single canvas and saves it once. Composition is sequential;
//! the cost here is local decode/encode, not network latency, so there is
//! nothing to overlap.

mod error;

pub use error::AtlasError;

use std::path::PathBuf;

use image::imageops::overlay;
use image::{ImageReader, RgbaImage};
use tracing::info;

use crate::cache::CacheLayout;
use crate::grid::{MapGrid, TileCoord};

/// Stitches one grid's cached tiles into a single image.
#[derive(Debug, Clone)]
pub struct AtlasComposer {
    layout: CacheLayout,
    output_dir: PathBuf,
}

impl AtlasComposer {
    /// Create a composer reading from `layout` and saving into `output_dir`.
    pub fn new(layout: CacheLayout, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            layout,
            output_dir: output_dir.into(),
        }
    }

    /// Compose the atlas for `grid` and save it.
    ///
    /// The tile edge length is taken from the (0,0) tile; the canvas is
    /// `grid_size * tile_size` pixels square. Tiles are pasted with their
    /// own alpha channel as the mask.
    ///
    /// # Errors
    ///
    /// Fails with [`AtlasError::MissingTile`] before anything is written if
    /// any expected tile file is absent.
    pub fn compose(&self, grid: &MapGrid) -> Result<PathBuf, AtlasError> {
        let size = grid.grid_size();
        let origin = self.load_tile(grid, TileCoord::new(0, 0))?;
        let tile_size = origin.width();

        let mut canvas = RgbaImage::new(size * tile_size, size * tile_size);
        overlay(&mut canvas, &origin, 0, 0);

        for coord in grid.coordinates().skip(1) {
            let tile = self.load_tile(grid, coord)?;
            overlay(
                &mut canvas,
                &tile,
                i64::from(coord.x) * i64::from(tile_size),
                i64::from(coord.y) * i64::from(tile_size),
            );
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|source| AtlasError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(self.layout.atlas_file_name(grid));
        canvas.save(&path).map_err(|source| AtlasError::Save {
            path: path.clone(),
            source,
        })?;

        info!(
            path = %path.display(),
            width = canvas.width(),
            height = canvas.height(),
            "atlas saved"
        );
        Ok(path)
    }

    fn load_tile(&self, grid: &MapGrid, coord: TileCoord) -> Result<RgbaImage, AtlasError> {
        let path = self.layout.tile_path(grid, coord);
        if !path.exists() {
            return Err(AtlasError::MissingTile {
                x: coord.x,
                y: coord.y,
                path,
            });
        }

        let image = ImageReader::open(&path)
            .map_err(|source| AtlasError::ReadTile {
                path: path.clone(),
                source,
            })?
            .with_guessed_format()
            .map_err(|source| AtlasError::ReadTile {
                path: path.clone(),
                source,
            })?
            .decode()
            .map_err(|source| AtlasError::Decode {
                path: path.clone(),
                source,
            })?;

        Ok(image.to_rgba8())
    }
}
