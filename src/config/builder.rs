use std::path::{Path, PathBuf};

use tracing::debug;

use super::paths::{default_search_dirs, locate};
use super::store::{LayeredConfig, DEFAULT_ENVIRONMENT};
use super::{file, ConfigError};

const DEFAULT_APP_NAME: &str = "ignition";
const DEFAULT_FILENAME: &str = "ignition.toml";

/// Builder for a [`LayeredConfig`].
///
/// A config comes either from an in-memory buffer or from a file found in a
/// list of search directories. Buffer-backed configs cannot be saved.
///
/// When no file is found, the config starts empty and will be saved to the
/// first search directory. That directory is created if it is missing.
///
/// ## Example
///
/// ```no_run
/// use ignition::LayeredConfig;
///
/// let mut config = LayeredConfig::builder()
///     .with_app_name("myapp")
///     .with_app_author("acme")
///     .with_filename("myapp.toml")
///     .with_environment("staging")
///     .build()?;
///
/// let url = config.get("url")?.as_str().map(str::to_owned);
/// let mailer = config.addon_namespace("mailer")?;
/// # Ok::<(), ignition::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct LayeredConfigBuilder {
    buffer: Option<String>,
    search_dirs: Option<Vec<PathBuf>>,
    filename: Option<String>,
    app_name: Option<String>,
    app_author: Option<String>,
    environment: Option<String>,
}

impl LayeredConfigBuilder {
    /// Parses `buffer` instead of looking for a file.
    pub fn with_buffer(mut self, buffer: impl Into<String>) -> Self {
        self.buffer = Some(buffer.into());
        self
    }

    /// Appends a directory to search for the config file.
    ///
    /// Once any directory is given, the platform defaults are not used.
    pub fn with_search_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.search_dirs
            .get_or_insert_with(Vec::new)
            .push(dir.as_ref().to_path_buf());
        self
    }

    /// Replaces the directories searched for the config file.
    pub fn with_search_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.search_dirs = Some(dirs.into_iter().map(|d| d.as_ref().to_path_buf()).collect());
        self
    }

    /// File name to look for. Defaults to `ignition.toml`.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Application name used for the platform data directory.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Vendor name; on Windows the data directory is nested under it.
    pub fn with_app_author(mut self, app_author: impl Into<String>) -> Self {
        self.app_author = Some(app_author.into());
        self
    }

    /// Environment to start in. Defaults to `default`.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Loads the configuration.
    #[tracing::instrument(skip(self))]
    pub fn build(self) -> Result<LayeredConfig, ConfigError> {
        let environment = self
            .environment
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        if let Some(buffer) = self.buffer {
            let raw = file::parse_table(&buffer, "buffer")?;
            return Ok(LayeredConfig::from_parts(raw, environment, None));
        }

        let filename = self.filename.as_deref().unwrap_or(DEFAULT_FILENAME);
        let search_dirs = self.search_dirs.unwrap_or_else(|| {
            default_search_dirs(
                self.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME),
                self.app_author.as_deref(),
            )
        });

        let path = match locate(&search_dirs, filename) {
            Some(found) => {
                debug!(path = %found.display(), "found config file");
                found
            }
            None => {
                let dir = search_dirs.first().ok_or(ConfigError::NoSearchDirs)?;
                debug!(dir = %dir.display(), "no config file found, starting empty");
                dir.join(filename)
            }
        };

        file::ensure_parent_dir(&path)?;
        let raw = file::load_table(&path)?.unwrap_or_else(toml::Table::new);

        Ok(LayeredConfig::from_parts(raw, environment, Some(path)))
    }
}
