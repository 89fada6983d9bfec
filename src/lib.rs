pub mod config;
mod error;
pub mod init;

pub use config::{ConfigError, LayeredConfig, Node, Prompt, Section, StdTerminal, Terminal};
pub use error::{BoxError, Error};
pub use init::{InitError, InitRegistry, SharedState};
