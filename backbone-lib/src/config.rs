//! Explicit configuration record supplied to the session constructor.
//!
//! Nothing in this crate reaches for a process-wide mutable; callers build
//! one `SessionConfig` and hand it to
//! [`crate::session::SessionController::new`].

use std::path::PathBuf;
use std::time::Duration;

use sha2::{Digest, Sha256};

/// A per-install identifier used to scope persisted credentials and caches.
/// Two builds on the same machine never collide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileId(pub String);

impl ProfileId {
    /// Resolves the profile id: an explicit override (normally sourced from
    /// an `APP_PROFILE` environment variable) takes precedence; otherwise
    /// derive a stable digest of the current executable's canonical path.
    pub fn resolve(env_override: Option<&str>) -> ProfileId {
        if let Some(value) = env_override {
            if !value.is_empty() {
                return ProfileId(value.to_string());
            }
        }
        ProfileId(Self::hash_of_current_exe())
    }

    fn hash_of_current_exe() -> String {
        let exe_path = std::env::current_exe()
            .and_then(|p| p.canonicalize())
            .unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(exe_path.to_string_lossy().as_bytes());
        let digest = hasher.finalize();
        hex_prefix(&digest, 16)
    }
}

fn hex_prefix(bytes: &[u8], chars: usize) -> String {
    let mut out = String::with_capacity(chars);
    for byte in bytes {
        if out.len() >= chars {
            break;
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out.truncate(chars);
    out
}

/// Top-level configuration for one runtime session. Constructed once by the
/// embedding application before creating the [`crate::session::SessionController`].
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// WebSocket URL of the game server.
    pub server_url: String,
    /// Display name used under the user config root, e.g. `"rumble-client"`.
    pub app_name: String,
    /// Explicit profile-id override, normally read from `APP_PROFILE` by the
    /// embedding application before constructing this struct.
    pub profile_override: Option<String>,
    /// Handshake timeout for `Transport::dial`.
    pub dial_timeout: Duration,
    /// Capacity of the inbound frame channel.
    pub inbox_capacity: usize,
    /// Name sent via `SetName` immediately after connecting.
    pub player_display_name: String,
}

impl SessionConfig {
    pub fn profile_id(&self) -> ProfileId {
        ProfileId::resolve(self.profile_override.as_deref())
    }

    /// `<user-config-root>/<app-name>/<profile-id>/`.
    pub fn profile_dir(&self) -> Option<PathBuf> {
        let root = dirs::config_dir()?;
        Some(root.join(&self.app_name).join(self.profile_id().0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_override_wins() {
        let id = ProfileId::resolve(Some("dev-build"));
        assert_eq!(id.0, "dev-build");
    }

    #[test]
    fn empty_override_falls_back_to_hash() {
        let id = ProfileId::resolve(Some(""));
        assert_eq!(id.0.len(), 16);
    }

    #[test]
    fn hash_fallback_is_deterministic() {
        let a = ProfileId::resolve(None);
        let b = ProfileId::resolve(None);
        assert_eq!(a, b);
    }
}
