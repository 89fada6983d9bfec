//! Config file discovery.

use std::path::{Path, PathBuf};

/// Returns the directories searched for a config file when none are given.
///
/// In order: the platform user-data directory for the application, the
/// user's home directory, and the current directory. Directories the platform
/// cannot determine are left out.
pub fn default_search_dirs(app_name: &str, app_author: Option<&str>) -> Vec<PathBuf> {
    dirs::data_dir()
        .map(|dir| app_data_dir(dir, app_name, app_author))
        .into_iter()
        .chain(dirs::home_dir())
        .chain(std::iter::once(PathBuf::from(".")))
        .collect()
}

/// Windows nests application data under the vendor
/// (`%APPDATA%\<author>\<app>`); other platforms use `<data_dir>/<app>`.
fn app_data_dir(data_dir: PathBuf, app_name: &str, app_author: Option<&str>) -> PathBuf {
    match app_author {
        Some(author) if cfg!(windows) => data_dir.join(author).join(app_name),
        _ => data_dir.join(app_name),
    }
}

/// Returns the first `dir/filename` that exists as a file, checking
/// `search_dirs` in order.
pub fn locate<P: AsRef<Path>>(search_dirs: &[P], filename: &str) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.as_ref().join(filename))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_locate_first_match_wins() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        std::fs::write(first.path().join("app.toml"), "").unwrap();
        std::fs::write(second.path().join("app.toml"), "").unwrap();

        let found = locate(&[first.path(), second.path()], "app.toml");
        assert_eq!(found, Some(first.path().join("app.toml")));
    }

    #[test]
    fn test_locate_skips_missing_dirs() {
        let empty = tempdir().unwrap();
        let holder = tempdir().unwrap();
        std::fs::write(holder.path().join("app.toml"), "").unwrap();

        let dirs = [empty.path().join("nope"), holder.path().to_path_buf()];
        assert_eq!(locate(&dirs, "app.toml"), Some(holder.path().join("app.toml")));
    }

    #[test]
    fn test_locate_ignores_directories() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("app.toml")).unwrap();

        assert_eq!(locate(&[dir.path()], "app.toml"), None);
    }

    #[test]
    fn test_default_search_dirs_end_with_cwd() {
        let dirs = default_search_dirs("ignition", None);
        assert_eq!(dirs.last(), Some(&PathBuf::from(".")));
    }

    #[test]
    fn test_app_data_dir_uses_author_on_windows_only() {
        let dir = app_data_dir(PathBuf::from("data"), "Config", Some("Vendor"));
        if cfg!(windows) {
            assert_eq!(dir, Path::new("data").join("Vendor").join("Config"));
        } else {
            assert_eq!(dir, Path::new("data").join("Config"));
        }
        assert_eq!(
            app_data_dir(PathBuf::from("data"), "Config", None),
            Path::new("data").join("Config")
        );
    }
}
