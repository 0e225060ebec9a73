//! Path management for smartops files.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for smartops_core::SmartOpsError {
    fn from(err: PathError) -> Self {
        smartops_core::SmartOpsError::config(err.to_string())
    }
}

/// Resolves smartops paths, optionally under a custom root.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/smartops/
/// ├── config.toml
/// └── logs/
///     └── smartops.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, Default)]
pub struct SmartOpsPaths {
    base_dir: Option<PathBuf>,
}

impl SmartOpsPaths {
    /// `base_dir` replaces `~/.config/smartops` when given (used by tests).
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: e.g. `~/.config/smartops/`
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        let home = dirs::home_dir().ok_or(PathError::HomeDirNotFound)?;
        Ok(home.join(".config").join("smartops"))
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn log_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
