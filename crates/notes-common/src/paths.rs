//! Default file locations, following the XDG base directory layout.

use std::path::PathBuf;

/// Directory name used under each XDG base directory.
pub const APP_DIR: &str = "notes-store";

const DATABASE_FILE: &str = "notes.db";
const CONFIG_FILE: &str = "config.toml";

/// `<base>/notes-store`, where `base` is the XDG directory if known, else
/// `home_relative` under the home directory, else the system temp dir.
fn app_dir(base: Option<PathBuf>, home_relative: &str) -> PathBuf {
    base.or_else(|| dirs::home_dir().map(|home| home.join(home_relative)))
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// Default database file: `$XDG_DATA_HOME/notes-store/notes.db`.
pub fn database_path() -> PathBuf {
    app_dir(dirs::data_dir(), ".local/share").join(DATABASE_FILE)
}

/// Default config file: `$XDG_CONFIG_HOME/notes-store/config.toml`.
pub fn config_path() -> PathBuf {
    app_dir(dirs::config_dir(), ".config").join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_files_live_in_app_dir() {
        for (path, file) in [(database_path(), DATABASE_FILE), (config_path(), CONFIG_FILE)] {
            assert_eq!(path.file_name().unwrap(), file);
            assert_eq!(path.parent().unwrap().file_name().unwrap(), APP_DIR);
        }
    }

    #[test]
    fn test_app_dir_prefers_xdg_base() {
        let dir = app_dir(Some(PathBuf::from("/xdg/data")), ".local/share");
        assert_eq!(dir, Path::new("/xdg/data/notes-store"));
    }
}
