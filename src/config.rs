//! Configuration for logtable
//!
//! Centralized configuration with sensible defaults.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the log path while recovery replays it
pub(crate) const SWAP_SUFFIX: &str = ".swp";

/// Main configuration for a Table instance
#[derive(Debug, Clone, Default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the append-only log backing the table.
    /// `None` runs the table purely in memory with no filesystem side effects.
    ///
    /// During startup recovery the existing log is moved aside:
    ///   {path}       (fresh, compacted log)
    ///   {path}.swp   (previous log, removed once replayed)
    pub path: Option<PathBuf>,

    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    /// Number of keys to pre-allocate room for in the in-memory index
    pub initial_capacity: usize,
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Whether mutations are persisted to a log file
    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    /// Path the previous log is renamed to while it is replayed
    pub fn swap_path(&self) -> Option<PathBuf> {
        self.path.as_deref().map(swap_path_for)
    }
}

/// `{path}.swp`, keeping the full original file name
pub(crate) fn swap_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(SWAP_SUFFIX);
    PathBuf::from(name)
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the log path. An empty path selects in-memory mode.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.config.path = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self
    }

    /// Run without a backing file
    pub fn in_memory(mut self) -> Self {
        self.config.path = None;
        self
    }

    /// Set the initial index capacity hint
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
