pub mod config;
pub mod serve;
pub mod sweep;

use anyhow::Context;
use signlink_core::config::Config;
use std::path::Path;

/// Credentials supplied on the command line or through the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_token: Option<String>,
    pub portal_id: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(token) = self.api_token.as_deref().filter(|t| !t.trim().is_empty()) {
            config.api_token = token.trim().to_string();
        }
        if let Some(portal) = self.portal_id.as_deref().filter(|p| !p.trim().is_empty()) {
            config.portal_id = portal.trim().to_string();
        }
    }
}

/// `signlink.yaml` under `root` with overrides applied.
pub fn load_config(root: &Path, overrides: &Overrides) -> anyhow::Result<Config> {
    let mut config = Config::load(root).context("failed to load signlink.yaml")?;
    overrides.apply(&mut config);
    Ok(config)
}
