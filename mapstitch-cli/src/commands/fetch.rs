//! Fetch command - download tiles into the local cache.
//!
//! Leaves the cache in place, so repeated runs resume and the tiles stay
//! available for a later `build`.

use clap::Args;

use super::common::{run_pipeline, CommonArgs};
use crate::error::CliError;

/// Arguments for the fetch command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run the fetch command.
pub fn run(args: FetchArgs) -> Result<(), CliError> {
    run_pipeline(&args.common, None)
}
