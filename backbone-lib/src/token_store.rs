//! A single persistent slot for the bearer token.
//!
//! Failure to persist is non-fatal — the caller just re-authenticates next
//! time — so every operation here logs on error rather than propagating one
//! up into the session state machine.

use std::path::PathBuf;

use tracing::warn;

use crate::config::SessionConfig;
use crate::error::TokenStoreError;

const TOKEN_FILE: &str = "token";

/// Persists/recalls the single opaque bearer token for this profile.
pub struct TokenStore {
    path: Option<PathBuf>,
}

impl TokenStore {
    pub fn new(config: &SessionConfig) -> Self {
        TokenStore {
            path: config.profile_dir().map(|dir| dir.join(TOKEN_FILE)),
        }
    }

    /// Reads the saved token, if any. Returns `None` on any I/O failure —
    /// the caller treats that the same as "never logged in".
    pub fn load(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let trimmed = contents.trim_end_matches(['\n', '\r']);
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, "failed to read token store");
                None
            }
        }
    }

    /// Saves the token. Non-fatal on failure — logs and returns.
    pub fn save(&self, token: &str) {
        if let Err(e) = self.try_save(token) {
            warn!(error = %e, "failed to persist token");
        }
    }

    fn try_save(&self, token: &str) -> Result<(), TokenStoreError> {
        let path = self.path.as_ref().ok_or(TokenStoreError::NoProfileDir)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, token)?;
        Ok(())
    }

    /// Clears the token on explicit logout. Non-fatal on failure.
    pub fn clear(&self) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "failed to clear token store");
            }
        }
    }
}
