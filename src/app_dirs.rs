use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typ0";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// `$HOME/.local/state/typ0` where HOME is known, else the platform data dir.
    pub fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
        } else {
            Self::project()
                .map(|dirs| dirs.data_local_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        }
    }

    pub fn stats_path() -> PathBuf {
        Self::state_dir().join("Savegames").join("statistics.txt")
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir().join("typ0.log")
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|dirs| dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("typ0_config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_share_the_state_dir() {
        let state = AppDirs::state_dir();
        assert!(AppDirs::stats_path().starts_with(&state));
        assert!(AppDirs::log_path().starts_with(&state));
        assert_eq!(
            AppDirs::stats_path().file_name().unwrap(),
            "statistics.txt"
        );
    }

    #[test]
    fn config_is_json() {
        assert_eq!(
            AppDirs::config_path().extension().unwrap(),
            "json"
        );
    }
}
