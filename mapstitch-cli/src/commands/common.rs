//! Shared argument types and pipeline wiring for CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use tokio_util::sync::CancellationToken;

use mapstitch::atlas::AtlasComposer;
use mapstitch::cache::{CacheLayout, DEFAULT_CACHE_ROOT};
use mapstitch::config::{FetchConfig, DEFAULT_CONCURRENT_FETCHES, DEFAULT_TIMEOUT_SECS};
use mapstitch::fetch::{FetchLimiter, TileFetcher};
use mapstitch::grid::{MapGrid, MapType};
use mapstitch::pipeline::{AtlasPipeline, PipelineError};
use mapstitch::provider::{ReqwestClient, XamSource};
use mapstitch::scheduler::GridScheduler;

use crate::error::CliError;
use crate::progress::ConsoleProgress;

/// Map style selection for CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MapTypeArg {
    /// Aerial/satellite imagery
    Satellite,
    /// Topographic rendering
    Topographic,
}

impl From<MapTypeArg> for MapType {
    fn from(arg: MapTypeArg) -> Self {
        match arg {
            MapTypeArg::Satellite => MapType::Satellite,
            MapTypeArg::Topographic => MapType::Topographic,
        }
    }
}

/// Arguments shared by every pipeline command.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Game version the tiles belong to, e.g. 1.27
    #[arg(long, value_name = "VERSION")]
    pub game_version: String,

    /// Map style to download
    #[arg(long, value_enum)]
    pub map_type: MapTypeArg,

    /// Single resolution to process
    #[arg(long, value_name = "N", conflicts_with = "resolution_range")]
    pub resolution: Option<u8>,

    /// Inclusive resolution range, lowest first
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"])]
    pub resolution_range: Option<Vec<u8>>,

    /// Directory the tile cache lives in
    #[arg(long, value_name = "DIR", default_value = DEFAULT_CACHE_ROOT)]
    pub cache_dir: PathBuf,

    /// Maximum simultaneous tile requests
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CONCURRENT_FETCHES)]
    pub concurrent: usize,

    /// Total per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl CommonArgs {
    /// Expand the resolution selection, rejecting absent or inverted input
    /// before any work starts.
    pub fn resolutions(&self) -> Result<Vec<u8>, CliError> {
        if let Some([from, to]) = self.resolution_range.as_deref() {
            if from > to {
                return Err(CliError::InvalidRange {
                    from: *from,
                    to: *to,
                });
            }
            Ok((*from..=*to).collect())
        } else if let Some(resolution) = self.resolution {
            Ok(vec![resolution])
        } else {
            Err(CliError::MissingResolution)
        }
    }

    /// One validated grid per selected resolution.
    pub fn grids(&self) -> Result<Vec<MapGrid>, CliError> {
        self.resolutions()?
            .into_iter()
            .map(|resolution| {
                MapGrid::new(self.game_version.clone(), self.map_type.into(), resolution)
                    .map_err(CliError::from)
            })
            .collect()
    }

    /// Fetch configuration from the CLI overrides.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::new()
            .with_concurrency(self.concurrent)
            .with_timeout_secs(self.timeout)
    }

    /// Cache layout rooted at the selected directory.
    pub fn layout(&self) -> CacheLayout {
        CacheLayout::new(self.cache_dir.clone())
    }
}

/// Wire up the pipeline and drive it to completion.
///
/// Validation happens before the runtime, the interrupt handler or any
/// network client exists, so user errors exit without side effects.
pub fn run_pipeline(common: &CommonArgs, composer: Option<AtlasComposer>) -> Result<(), CliError> {
    let grids = common.grids()?;
    let config = common.fetch_config();
    let layout = common.layout();
    tracing::info!(
        grids = grids.len(),
        concurrency = config.concurrency(),
        cache = %layout.root().display(),
        "starting pipeline"
    );

    let client = ReqwestClient::new(&config).map_err(PipelineError::from)?;
    let fetcher = TileFetcher::new(
        client,
        Arc::new(XamSource::default()),
        layout.clone(),
        FetchLimiter::from_config(&config),
    );
    let mut pipeline = AtlasPipeline::new(GridScheduler::new(fetcher), layout);
    if let Some(composer) = composer {
        pipeline = pipeline.with_composer(composer);
    }

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\ninterrupt received, stopping after in-flight tiles...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    let progress = ConsoleProgress::new();
    runtime
        .block_on(pipeline.run(&grids, &progress, cancel))
        .map_err(CliError::from)
}
