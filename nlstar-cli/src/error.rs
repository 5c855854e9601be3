use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("error reading {0}: {1}")]
    File(PathBuf, #[source] io::Error),
    #[error(transparent)]
    Learn(#[from] nlstar::error::LearnError),
}
