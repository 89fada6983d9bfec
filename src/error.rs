use crate::config::ConfigError;
use crate::init::InitError;
use thiserror::Error;

/// Boxed error returned by user-supplied callbacks (initializers, wizard validators).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for the ignition library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("initialization error: {0}")]
    Init(#[from] InitError),
}
