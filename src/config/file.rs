//! Reading and writing the backing TOML file.

use std::path::Path;

use toml::Table;
use tracing::debug;

use super::ConfigError;

/// Parses a TOML document into a table. `location` names the source in errors.
pub(crate) fn parse_table(contents: &str, location: &str) -> Result<Table, ConfigError> {
    toml::from_str(contents).map_err(|e| ConfigError::ParseError {
        location: location.to_string(),
        source: e,
    })
}

/// Loads and parses a TOML config file.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub(crate) fn load_table(path: &Path) -> Result<Option<Table>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_table(&contents, &format!("'{}'", path.display())).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Serializes `table` and overwrites the file at `path`.
pub(crate) fn write_table(path: &Path, table: &Table) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(table)?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Creates the parent directory of `path` and any missing ancestors.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), ConfigError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }

    debug!(path = %parent.display(), "creating config directory");
    std::fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirError {
        path: parent.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_load_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[default]\nkey = \"value\"").unwrap();

        let table = load_table(file.path()).unwrap().unwrap();
        assert_eq!(table["default"]["key"].as_str(), Some("value"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert!(load_table(&dir.path().join("absent.toml")).unwrap().is_none());
    }

    #[test]
    fn test_load_unreadable_path() {
        let dir = tempdir().unwrap();
        let result = load_table(dir.path());
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[default\nkey = ").unwrap();

        let result = load_table(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_ensure_parent_dir_creates_ancestors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("config.toml");

        ensure_parent_dir(&path).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
        ensure_parent_dir(&path).unwrap();
    }
}
