// Cache path utilities.
// Resolves where the cache database and settings live on this machine.

use std::path::PathBuf;

use directories::ProjectDirs;

/// File name of the cache database.
pub const DATABASE_FILE: &str = "database.db";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "bordado")
}

/// Get the base data directory (~/.local/share/bordado on Linux).
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Get the base config directory (~/.config/bordado on Linux).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path to the writable cache database.
pub fn database_path() -> Option<PathBuf> {
    data_dir().map(|dir| database_path_in(&dir))
}

/// Path to the settings file.
pub fn settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("settings.json"))
}

/// Cache database location under an arbitrary data directory.
pub fn database_path_in(dir: &std::path::Path) -> PathBuf {
    dir.join("SQLite").join(DATABASE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_layout() {
        let path = database_path_in(std::path::Path::new("/tmp/bordado"));
        assert!(path.ends_with("SQLite/database.db"));
    }

    #[test]
    fn test_project_paths() {
        // Some sandboxes have no home directory; only check shape when resolvable.
        if let Some(db) = database_path() {
            assert!(db.ends_with("SQLite/database.db"));
        }
        if let Some(settings) = settings_path() {
            assert!(settings.ends_with("settings.json"));
        }
    }
}
