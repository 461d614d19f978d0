//! Transient signature storage.
//!
//! Layout:
//!   <storage_dir>/index.html                                    listing guard
//!   <storage_dir>/signature_<unix-ts>_<token>.<ext>             awaiting finalize
//!   <storage_dir>/signature_<unix-ts>_<token>.<ext>.claimed     owned by a finalize call
//!
//! A stored image is consumed exactly once: finalize claims it with an atomic
//! rename, and either deletes it (upload succeeded) or renames it back
//! (upload failed). Anything left behind is reaped by [`Storage::sweep`].

use crate::config::Config;
use crate::error::{Result, SignlinkError};
use crate::image::{decode_data_uri, ImageType};
use crate::{io, paths};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const TOKEN_LEN: usize = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Server-assigned handle for a persisted but not yet linked image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImageReference {
    pub url: String,
    pub path: PathBuf,
    pub filename: String,
    pub size: usize,
    pub image_type: ImageType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

/// Exclusive ownership of one stored image for the duration of a finalize.
///
/// A claim dropped without `release` or `consume` (the finalize future was
/// cancelled) renames the image back so a later finalize can still find it.
#[derive(Debug)]
pub struct Claim {
    original: PathBuf,
    claimed: PathBuf,
    filename: String,
    image_type: ImageType,
    settled: bool,
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

impl Storage {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into(),
            max_bytes,
        }
    }

    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self::new(
            paths::storage_dir(root, &config.storage_dir),
            config.public_base_url.clone(),
            config.max_image_bytes,
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate, decode and persist a data-URI payload.
    ///
    /// All validation happens before the directory is touched, so a rejected
    /// payload leaves no trace on disk.
    pub fn store(&self, payload: &str) -> Result<StoredImageReference> {
        let image = decode_data_uri(payload, self.max_bytes)?;

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        let filename = paths::stored_filename(
            chrono::Utc::now().timestamp(),
            &token,
            image.image_type.extension(),
        );

        io::ensure_private_dir(&self.dir)?;
        let path = self.dir.join(&filename);
        io::atomic_write(&path, &image.bytes)?;

        tracing::info!(file = %filename, size = image.bytes.len(), "signature stored");
        Ok(StoredImageReference {
            url: self.reference_url(&filename),
            path,
            filename,
            size: image.bytes.len(),
            image_type: image.image_type,
        })
    }

    fn reference_url(&self, filename: &str) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        if base.is_empty() {
            filename.to_string()
        } else {
            format!("{base}/{filename}")
        }
    }

    /// Take exclusive ownership of the image named by `reference`.
    ///
    /// Fails with `ReferenceNotFound` when the image was already claimed,
    /// consumed, or reaped.
    pub fn claim(&self, reference: &str) -> Result<Claim> {
        let filename = paths::reference_filename(reference)?;
        let image_type = ImageType::from_filename(&filename)
            .ok_or_else(|| SignlinkError::InvalidReference(reference.to_string()))?;
        let original = self.dir.join(&filename);
        let claimed = self
            .dir
            .join(format!("{filename}{}", paths::CLAIM_SUFFIX));

        if !original.is_file() {
            return Err(SignlinkError::ReferenceNotFound(filename));
        }
        match std::fs::rename(&original, &claimed) {
            Ok(()) => Ok(Claim {
                original,
                claimed,
                filename,
                image_type,
                settled: false,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SignlinkError::ReferenceNotFound(filename))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete stored images (claimed or not) whose modification time is older
    /// than `retention` relative to `now`. Foreign files are left alone.
    pub fn sweep(&self, retention: Duration, now: SystemTime) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        if !self.dir.is_dir() {
            return Ok(report);
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !paths::is_stored_filename(&name) {
                continue;
            }
            report.scanned += 1;
            let modified = entry.metadata()?.modified()?;
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= retention {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => report.deleted.push(name),
                // Consumed by a concurrent finalize.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if !report.deleted.is_empty() {
            tracing::info!(
                deleted = report.deleted.len(),
                scanned = report.scanned,
                "swept expired signatures"
            );
        }
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

impl Claim {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.claimed)?)
    }

    /// Hand the image back so a later finalize may try again.
    pub fn release(mut self) -> Result<()> {
        self.settled = true;
        std::fs::rename(&self.claimed, &self.original)?;
        Ok(())
    }

    /// The image has been linked; remove it for good.
    pub fn consume(mut self) -> Result<()> {
        // Never hand an uploaded image back, even if the delete fails.
        self.settled = true;
        std::fs::remove_file(&self.claimed)?;
        Ok(())
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        match std::fs::rename(&self.claimed, &self.original) {
            Ok(()) => tracing::warn!(file = %self.filename, "abandoned signature claim released"),
            Err(e) => tracing::warn!(file = %self.filename, error = %e, "could not release abandoned signature claim"),
        }
    }
}
