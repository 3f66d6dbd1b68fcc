//! CLI error types.

use std::fmt;

use mapstitch::grid::GridError;
use mapstitch::pipeline::PipelineError;

/// Errors surfaced to the terminal before the process exits non-zero.
#[derive(Debug)]
pub enum CliError {
    /// Neither --resolution nor --resolution-range was given.
    MissingResolution,

    /// --resolution-range given with FROM greater than TO.
    InvalidRange { from: u8, to: u8 },

    /// Invalid grid parameters.
    Grid(GridError),

    /// The pipeline failed.
    Pipeline(PipelineError),

    /// The async runtime could not be created.
    Runtime(String),

    /// The interrupt handler could not be installed.
    Signal(String),

    /// The run was interrupted by the user.
    Interrupted,
}

impl CliError {
    /// Process exit code for this error; 130 follows the shell convention
    /// for interrupted commands.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Interrupted => 130,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::MissingResolution => {
                write!(f, "either --resolution or --resolution-range must be given")
            }
            CliError::InvalidRange { from, to } => {
                write!(f, "invalid resolution range: {} is greater than {}", from, to)
            }
            CliError::Grid(e) => write!(f, "{}", e),
            CliError::Pipeline(e) => write!(f, "{}", e),
            CliError::Runtime(msg) => write!(f, "failed to start async runtime: {}", msg),
            CliError::Signal(msg) => write!(f, "failed to install interrupt handler: {}", msg),
            CliError::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Grid(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for CliError {
    fn from(e: GridError) -> Self {
        CliError::Grid(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Interrupted => CliError::Interrupted,
            other => CliError::Pipeline(other),
        }
    }
}
