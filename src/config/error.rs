use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("'{name}' is not an attribute of environment '{environment}'")]
    NotFound { name: String, environment: String },

    #[error("'{0}' is not a table")]
    NotATable(String),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config from {location}: {source}")]
    ParseError {
        location: String,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create config directory '{path}': {source}")]
    CreateDirError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot save config that was not loaded from a file")]
    NoBackingFile,

    #[error("no config search directories available")]
    NoSearchDirs,

    #[error("failed to read answer: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),
}
