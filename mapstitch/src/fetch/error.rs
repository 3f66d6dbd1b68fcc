//! Error types for tile fetching.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching a single tile.
///
/// Any of these is fatal to the enclosing grid run: the scheduler cancels
/// all sibling work and propagates the first one observed. Fetches are not
/// retried; a re-run resumes from the cache instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The response declared an unexpected content type; likely an error
    /// page or redirect target served with a 200 status.
    #[error("{url}: invalid content type {actual:?}, expected {expected}")]
    InvalidContentType {
        url: String,
        expected: String,
        actual: Option<String>,
    },

    /// Transport-level failure (DNS, connect, TLS, reset).
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The request exceeded its total timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Failed to create a cache directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write or finalize a tile file.
    #[error("failed to write tile {path}: {source}")]
    WriteTile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to construct the HTTP client.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),
}
