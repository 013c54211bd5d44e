//! Runtime knobs for the application services.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings the services read at call time. Transport concerns (ports,
/// timeouts, body limits) live in the server crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Lifetime of a login session.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Files younger than this are never treated as orphans; an upload may
    /// still be between its file write and its row insert.
    #[serde(default = "default_orphan_grace_secs")]
    pub orphan_grace_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl_secs(),
            orphan_grace_secs: default_orphan_grace_secs(),
        }
    }
}

impl AppConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn orphan_grace(&self) -> Duration {
        Duration::from_secs(self.orphan_grace_secs)
    }
}

fn default_session_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_orphan_grace_secs() -> u64 {
    60 * 60
}
