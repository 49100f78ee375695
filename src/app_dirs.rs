use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Files kept in the state directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub db: PathBuf,
    pub history: PathBuf,
    pub log: PathBuf,
}

impl StatePaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            db: dir.join("stats.db"),
            history: dir.join("history.csv"),
            log: dir.join("moviequiz.log"),
        }
    }
}

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/moviequiz`, or the platform data dir without `$HOME`
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("moviequiz"),
            )
        } else {
            ProjectDirs::from("", "", "moviequiz")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Paths under `override_dir`, else the default state dir, else the
    /// working directory.
    pub fn state_paths(override_dir: Option<&Path>) -> StatePaths {
        let dir = override_dir
            .map(Path::to_path_buf)
            .or_else(Self::state_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        StatePaths::in_dir(dir)
    }
}
