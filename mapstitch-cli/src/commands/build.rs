//! Build command - download tiles, compose atlases, clear the cache.

use std::path::PathBuf;

use clap::Args;

use mapstitch::atlas::AtlasComposer;

use super::common::{run_pipeline, CommonArgs};
use crate::error::CliError;

/// Arguments for the build command.
#[derive(Debug, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory composed atlases are saved into
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

/// Run the build command.
pub fn run(args: BuildArgs) -> Result<(), CliError> {
    let composer = AtlasComposer::new(args.common.layout(), args.output_dir.clone());
    run_pipeline(&args.common, Some(composer))
}
