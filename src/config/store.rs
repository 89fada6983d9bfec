use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use toml::{Table, Value};
use tracing::{debug, info};

use super::builder::LayeredConfigBuilder;
use super::node::{Node, Section};
use super::{file, ConfigError};

/// Name of the environment selected when none is given, and the fallback
/// consulted by [`LayeredConfig::addon_namespace`].
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Configuration partitioned into named environments.
///
/// The backing document is a table of environments, each a table of settings:
///
/// ```toml
/// [default]
/// url = "https://example.com"
///
/// [staging]
/// url = "https://staging.example.com"
/// ```
///
/// Reads only see the current environment. The single exception is
/// [`addon_namespace`](Self::addon_namespace), which falls back to
/// `default`. Changes stay in memory until [`save`](Self::save) is called.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    raw: Table,
    environment: String,
    path: Option<PathBuf>,
}

impl LayeredConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> LayeredConfigBuilder {
        LayeredConfigBuilder::default()
    }

    pub(crate) fn from_parts(raw: Table, environment: String, path: Option<PathBuf>) -> Self {
        Self {
            raw,
            environment,
            path,
        }
    }

    /// Looks up `name` in the current environment.
    ///
    /// The `default` environment is never consulted here.
    pub fn get(&self, name: &str) -> Result<Node<'_>, ConfigError> {
        self.current_table()?
            .and_then(|table| table.get(name))
            .map(|value| Node::wrap(self, value))
            .ok_or_else(|| ConfigError::NotFound {
                name: name.to_string(),
                environment: self.environment.clone(),
            })
    }

    pub fn contains_key(&self, name: &str) -> bool {
        matches!(self.current_table(), Ok(Some(table)) if table.contains_key(name))
    }

    /// Returns the settings table for an add-on.
    ///
    /// Looks in the current environment, then in `default`. If neither has
    /// `name`, an empty table is created under the current environment.
    pub fn addon_namespace(&mut self, name: &str) -> Result<Section<'_>, ConfigError> {
        let in_current = self
            .current_table()?
            .is_some_and(|table| table.contains_key(name));
        let in_default = !in_current
            && self
                .raw
                .get(DEFAULT_ENVIRONMENT)
                .and_then(Value::as_table)
                .is_some_and(|table| table.contains_key(name));

        if !in_current && !in_default {
            debug!(name, environment = %self.environment, "creating add-on namespace");
            self.current_table_mut()?
                .insert(name.to_string(), Value::Table(Table::new()));
        }

        let environment = if in_default {
            DEFAULT_ENVIRONMENT
        } else {
            self.environment.as_str()
        };
        let this: &Self = self;
        this.raw
            .get(environment)
            .and_then(Value::as_table)
            .and_then(|table| table.get(name))
            .and_then(Value::as_table)
            .map(|table| Section::new(this, table))
            .ok_or_else(|| ConfigError::NotATable(name.to_string()))
    }

    /// Name of the current environment.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Switches to `name`, creating it empty if it does not exist yet.
    pub fn set_environment(&mut self, name: impl Into<String>) -> &str {
        let name = name.into();
        if !self.raw.contains_key(&name) {
            debug!(environment = %name, "creating environment");
            self.raw.insert(name.clone(), Value::Table(Table::new()));
        }
        self.environment = name;
        &self.environment
    }

    /// Names of all environments in the document.
    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.raw.keys().map(String::as_str)
    }

    /// Stores `value` under `key` in the current environment.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ConfigError> {
        self.current_table_mut()?.insert(key.into(), value.into());
        Ok(())
    }

    /// The whole document, all environments included.
    pub fn raw(&self) -> &Table {
        &self.raw
    }

    /// File this config was loaded from and saves to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Deserializes the current environment into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let table = self.current_table()?.cloned().unwrap_or_else(Table::new);
        Value::Table(table)
            .try_into()
            .map_err(ConfigError::DeserializeError)
    }

    /// Writes every environment back to the backing file.
    ///
    /// Fails with [`ConfigError::NoBackingFile`] for configs built from a buffer.
    #[tracing::instrument(skip(self))]
    pub fn save(&self) -> Result<&Path, ConfigError> {
        let path = self.path.as_deref().ok_or(ConfigError::NoBackingFile)?;
        file::write_table(path, &self.raw)?;
        info!(path = %path.display(), "configuration saved");
        Ok(path)
    }

    pub(crate) fn current_table(&self) -> Result<Option<&Table>, ConfigError> {
        match self.raw.get(&self.environment) {
            None => Ok(None),
            Some(Value::Table(table)) => Ok(Some(table)),
            Some(_) => Err(ConfigError::NotATable(self.environment.clone())),
        }
    }

    fn current_table_mut(&mut self) -> Result<&mut Table, ConfigError> {
        let environment = self.environment.clone();
        self.raw
            .entry(environment.clone())
            .or_insert(Value::Table(Table::new()))
            .as_table_mut()
            .ok_or(ConfigError::NotATable(environment))
    }
}

impl FromStr for LayeredConfig {
    type Err = ConfigError;

    /// Parses an in-memory document. The result cannot be saved.
    fn from_str(buffer: &str) -> Result<Self, Self::Err> {
        Self::builder().with_buffer(buffer).build()
    }
}
