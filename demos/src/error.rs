use stride_core::error::{ConfigError, PreviewError};

/// Errors surfaced by the demo binaries.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("preview failed: {0}")]
    Preview(#[from] PreviewError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to serialize trajectory: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
