use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModelError;
use crate::tools::ToolError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported server script {}: must be a .py or .js file", .0.display())]
    UnsupportedServerType(PathBuf),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("tool {name} failed: {source}")]
    ToolInvocation {
        name: String,
        #[source]
        source: ToolError,
    },

    #[error("cleanup failed: {0}")]
    Cleanup(String),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, Error>;
