//! Mapstitch - map tile grids fetched, cached and stitched into atlases
//!
//! This library downloads the rectangular grid of image tiles that makes up
//! one game map at a given resolution, stores the tiles in a hierarchical
//! on-disk cache, and assembles them into a single composite atlas image.
//!
//! # Architecture
//!
//! ```text
//! AtlasPipeline (one resolution at a time)
//!     │
//!     ├─► scheduler: GridScheduler
//!     │     └─ bounded fan-out over all grid coordinates, fail-fast
//!     │
//!     ├─► fetch: TileFetcher + FetchLimiter
//!     │     └─ cache check, single GET, atomic write, permit gating
//!     │
//!     ├─► provider: TileSource + AsyncHttpClient
//!     │     └─ URL template and HTTP seam (mockable in tests)
//!     │
//!     ├─► cache: CacheLayout
//!     │     └─ deterministic tile and atlas paths
//!     │
//!     └─► atlas: AtlasComposer
//!           └─ sequential decode + paste onto one canvas, saved once
//! ```
//!
//! A finished tile file on disk is the sole proof of completion: re-running a
//! partially failed download skips every cached tile and only fetches what is
//! missing. This idempotent resume is the system's primary resilience
//! mechanism; individual fetches are never retried.

pub mod atlas;
pub mod cache;
pub mod config;
pub mod fetch;
pub mod grid;
pub mod pipeline;
pub mod progress;
pub mod provider;
pub mod scheduler;

/// Library version, as baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
