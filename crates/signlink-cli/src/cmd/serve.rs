use super::{load_config, Overrides};
use anyhow::Result;
use signlink_core::config::WarnLevel;
use std::path::Path;

pub fn run(root: &Path, overrides: &Overrides, port: u16) -> Result<()> {
    let config = load_config(root, overrides)?;

    for w in config.validate() {
        match w.level {
            WarnLevel::Error => tracing::error!("config: {}", w.message),
            WarnLevel::Warning => tracing::warn!("config: {}", w.message),
        }
    }

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();
    rt.block_on(async move { signlink_server::serve(root_buf, config, port).await })
}
