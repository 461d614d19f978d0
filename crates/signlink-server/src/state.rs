use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hubspot_client::HubSpotClient;
use signlink_core::config::Config;
use signlink_core::link::{NoLookup, Orchestrator};

use crate::housekeeping;

/// The orchestrator wired to HubSpot for both file storage and contacts.
pub type Linker = Orchestrator<HubSpotClient, HubSpotClient, NoLookup>;

/// How often expired signatures are swept from transient storage.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub linker: Arc<Linker>,
}

impl AppState {
    pub fn new(root: PathBuf, config: Config) -> Self {
        let linker = Orchestrator::hubspot(&root, config, reqwest::Client::new());
        let state = Self {
            root,
            linker: Arc::new(linker),
        };

        // Guard: only spawn if inside a Tokio runtime (skipped in sync unit tests).
        if tokio::runtime::Handle::try_current().is_ok() {
            housekeeping::spawn_sweeper(
                state.linker.storage().clone(),
                state.linker.config().retention(),
                SWEEP_INTERVAL,
            );
        }

        state
    }

    pub fn config(&self) -> &Config {
        self.linker.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_resolves_storage_under_root() {
        let state = AppState::new(PathBuf::from("/tmp/signlink-test"), Config::default());
        assert_eq!(state.root, PathBuf::from("/tmp/signlink-test"));
        assert_eq!(
            state.linker.storage().dir(),
            std::path::Path::new("/tmp/signlink-test/.signlink/signatures")
        );
    }
}
