use super::{load_config, Overrides};
use crate::output::print_json;
use anyhow::{Context, Result};
use signlink_core::store::Storage;
use std::path::Path;
use std::time::{Duration, SystemTime};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

pub fn run(
    root: &Path,
    overrides: &Overrides,
    retention_days: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = load_config(root, overrides)?;
    let retention = retention_days
        .map(|d| DAY * u32::try_from(d).unwrap_or(u32::MAX))
        .unwrap_or_else(|| config.retention());

    let storage = Storage::from_config(root, &config);
    let report = storage
        .sweep(retention, SystemTime::now())
        .with_context(|| format!("failed to sweep {}", storage.dir().display()))?;

    if json {
        return print_json(&report);
    }
    for name in &report.deleted {
        println!("deleted {name}");
    }
    println!(
        "Swept {}: {} of {} stored signature(s) removed.",
        storage.dir().display(),
        report.deleted.len(),
        report.scanned
    );
    Ok(())
}
