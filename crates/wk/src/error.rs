//! CLI error types.

use wk_config::ConfigError;
use wk_links::ParsePageIdError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid page id: {0}")]
    PageId(#[from] ParsePageIdError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
