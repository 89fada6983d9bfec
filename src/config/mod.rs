//! Environment-scoped configuration backed by a TOML file.

mod builder;
mod error;
mod file;
mod node;
mod paths;
mod store;
mod wizard;

pub use builder::LayeredConfigBuilder;
pub use error::ConfigError;
pub use node::{Node, Section};
pub use paths::{default_search_dirs, locate};
pub use store::{LayeredConfig, DEFAULT_ENVIRONMENT};
pub use wizard::{Prompt, PromptDefault, StdTerminal, Terminal, Validator};
