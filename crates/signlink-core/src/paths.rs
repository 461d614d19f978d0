use crate::error::{Result, SignlinkError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const SIGNLINK_DIR: &str = ".signlink";
pub const CONFIG_FILE: &str = "signlink.yaml";
pub const DEFAULT_STORAGE_DIR: &str = ".signlink/signatures";

/// Suffix appended to a stored image while a finalize call owns it.
pub const CLAIM_SUFFIX: &str = ".claimed";

pub const FILENAME_PREFIX: &str = "signature_";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the storage directory. Relative settings are anchored at `root`.
pub fn storage_dir(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

// ---------------------------------------------------------------------------
// Stored filenames
// ---------------------------------------------------------------------------

fn stored_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^signature_[0-9]+_[A-Za-z0-9]{12}\.(png|jpg|jpeg|gif)(\.claimed)?$")
            .expect("stored-name regex is valid")
    })
}

/// `signature_<unix-ts>_<token>.<ext>`
pub fn stored_filename(timestamp: i64, token: &str, ext: &str) -> String {
    format!("{FILENAME_PREFIX}{timestamp}_{token}.{ext}")
}

/// True for names this service generated, claimed or not.
pub fn is_stored_filename(name: &str) -> bool {
    stored_name_re().is_match(name)
}

/// Reduce a reference (bare filename, path, or URL) to its filename and make
/// sure it names an unclaimed stored image.
pub fn reference_filename(reference: &str) -> Result<String> {
    let trimmed = reference.trim();
    let without_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    let name = without_query
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(without_query);
    if !is_stored_filename(name) || name.ends_with(CLAIM_SUFFIX) {
        return Err(SignlinkError::InvalidReference(reference.to_string()));
    }
    Ok(name.to_string())
}
