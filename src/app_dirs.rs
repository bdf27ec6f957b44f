use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn data_dir() -> PathBuf {
        ProjectDirs::from("", "", "faktorquiz")
            .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Key-value storage holding the settings between runs
    pub fn storage_path() -> PathBuf {
        Self::data_dir().join("storage.json")
    }

    pub fn log_path() -> PathBuf {
        Self::data_dir().join("faktorquiz.log")
    }
}
