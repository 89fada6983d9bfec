use std::fmt;

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use super::{ConfigError, LayeredConfig};

/// A value read from a [`LayeredConfig`].
///
/// Nested tables come back as a [`Section`] borrowing the stored table, so
/// lookups can continue without copying.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Scalar(&'a Value),
    Sequence(&'a [Value]),
    Section(Section<'a>),
}

impl<'a> Node<'a> {
    pub(crate) fn wrap(config: &'a LayeredConfig, value: &'a Value) -> Self {
        match value {
            Value::Table(table) => Node::Section(Section::new(config, table)),
            Value::Array(items) => Node::Sequence(items),
            scalar => Node::Scalar(scalar),
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_integer(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_integer)
    }

    pub fn as_float(&self) -> Option<f64> {
        self.as_scalar().and_then(Value::as_float)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    pub fn as_scalar(&self) -> Option<&'a Value> {
        match self {
            Node::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&'a [Value]> {
        match self {
            Node::Sequence(items) => Some(*items),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<Section<'a>> {
        match self {
            Node::Section(section) => Some(*section),
            _ => None,
        }
    }

    /// Returns an owned copy of the underlying value.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Scalar(value) => (*value).clone(),
            Node::Sequence(items) => Value::Array(items.to_vec()),
            Node::Section(section) => Value::Table(section.table().clone()),
        }
    }
}

/// Read-through view of a nested table inside a [`LayeredConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    config: &'a LayeredConfig,
    table: &'a Table,
}

impl<'a> Section<'a> {
    pub(crate) fn new(config: &'a LayeredConfig, table: &'a Table) -> Self {
        Self { config, table }
    }

    /// Looks up `key` in this section.
    pub fn get(&self, key: &str) -> Result<Node<'a>, ConfigError> {
        self.table
            .get(key)
            .map(|value| Node::wrap(self.config, value))
            .ok_or_else(|| ConfigError::NotFound {
                name: key.to_string(),
                environment: self.config.environment().to_string(),
            })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> {
        self.table.keys().map(String::as_str)
    }

    /// The underlying table.
    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// The config this section belongs to.
    pub fn config(&self) -> &'a LayeredConfig {
        self.config
    }

    /// Deserializes this section into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Value::Table(self.table.clone())
            .try_into()
            .map_err(ConfigError::DeserializeError)
    }
}

impl fmt::Display for Section<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = toml::to_string(self.table).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
