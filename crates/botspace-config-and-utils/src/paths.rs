//! File system paths used by the client.
//!
//! The local state file defaults to a path relative to the working directory
//! (see `DEFAULT_STATE_FILE`) so several bots can run side by side from
//! different directories. Only the shared account file is anchored at home.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Directory under the home directory holding the shared account file.
const ACCOUNT_DIR_NAME: &str = ".openclaw";
/// Shared account filename.
const ACCOUNT_FILE_NAME: &str = "openclaw.json";

/// Resolves files that live under the user's home directory.
#[derive(Debug, Clone)]
pub struct Paths {
    home_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance for the current user.
    pub fn new() -> CoreResult<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self { home_dir })
    }

    /// Create a new Paths instance with an explicit home directory.
    pub fn with_home(home_dir: PathBuf) -> Self {
        Self { home_dir }
    }

    /// Get the shared account file path (~/.openclaw/openclaw.json).
    pub fn account_file(&self) -> PathBuf {
        self.home_dir.join(ACCOUNT_DIR_NAME).join(ACCOUNT_FILE_NAME)
    }
}
