use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::metrics::Timespan;
use crate::words::{DEFAULT_API_URL, DEFAULT_WORD_COUNT};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub timespan_secs: u32,
    pub language: String,
    pub word_count: usize,
    pub word_api_url: String,
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timespan_secs: Timespan::default().secs(),
            language: "en".to_string(),
            word_count: DEFAULT_WORD_COUNT,
            word_api_url: DEFAULT_API_URL.to_string(),
            offline: false,
        }
    }
}

/// Per-run settings from the command line; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub timespan: Option<Timespan>,
    pub language: Option<String>,
    pub word_count: Option<usize>,
    pub offline: bool,
}

impl Config {
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(timespan) = overrides.timespan {
            self.timespan_secs = timespan.secs();
        }
        if let Some(language) = &overrides.language {
            self.language = language.clone();
        }
        if let Some(word_count) = overrides.word_count {
            self.word_count = word_count;
        }
        self.offline |= overrides.offline;
        self
    }

    /// Session length, falling back to the default for a zero stored value.
    pub fn timespan(&self) -> Timespan {
        Timespan::from_secs(self.timespan_secs).unwrap_or_else(|err| {
            warn!(%err, "invalid stored session length, using default");
            Timespan::default()
        })
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(%err, path = %self.path.display(), "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
