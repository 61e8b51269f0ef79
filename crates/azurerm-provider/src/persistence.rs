use std::path::{Path, PathBuf};

use crate::error::ProviderError;
use crate::state::{ProviderState, CURRENT_VERSION};

/// JSON state file on local disk.
#[derive(Debug, Clone)]
pub struct StatePersistence {
    path: PathBuf,
}

impl StatePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write state atomically: tmp file, then rename over the old one.
    pub async fn flush(&self, state: &ProviderState) -> Result<(), ProviderError> {
        let mut stamped = state.clone();
        stamped.version = CURRENT_VERSION;
        let json = serde_json::to_vec_pretty(&stamped)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;

        // Attributes include access keys.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), resources = state.resources.len(), "state flushed");
        Ok(())
    }

    /// Load state, or start fresh when there is no state file yet.
    pub async fn load(&self) -> Result<ProviderState, ProviderError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no existing state found, starting fresh");
            return Ok(ProviderState::default());
        }

        let json = std::fs::read(&self.path)?;
        let state = ProviderState::from_json(&json)
            .map_err(|e| ProviderError::State(format!("loading {}: {e}", self.path.display())))?;
        tracing::debug!(path = %self.path.display(), resources = state.resources.len(), "state loaded");
        Ok(state)
    }
}
