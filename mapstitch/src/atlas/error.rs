//! Error types for atlas composition.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while composing an atlas from cached tiles.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// An expected tile file is absent. Signals an earlier incomplete grid
    /// run; composition never substitutes blank tiles for missing data.
    #[error("missing tile {x}/{y} at {path}; re-run the fetch to repair the cache")]
    MissingTile { x: u32, y: u32, path: PathBuf },

    /// Failed to open a tile file.
    #[error("failed to read tile {path}: {source}")]
    ReadTile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A tile file exists but does not decode as an image.
    #[error("failed to decode tile {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to create the output directory.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to encode or save the composed atlas.
    #[error("failed to save atlas {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
