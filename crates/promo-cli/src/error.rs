use promo_core::config::ConfigError;
use thiserror::Error as ThisError;

///
/// CliError
///

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] promo_core::Error),

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("failed to start runtime: {0}")]
    Runtime(String),

    #[error("failed to wait for shutdown signal: {0}")]
    Signal(String),
}
