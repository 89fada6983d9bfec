use thiserror::Error;

use crate::BoxError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InitError {
    #[error("initializer '{key}' was requested but never registered")]
    UnknownInitializer { key: String },

    #[error("initializer '{key}' failed: {source}")]
    Failed {
        key: String,
        #[source]
        source: BoxError,
    },
}
