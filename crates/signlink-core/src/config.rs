use crate::error::{Result, SignlinkError};
use crate::image::MAX_IMAGE_BYTES;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ContactProperties
// ---------------------------------------------------------------------------

/// CRM property names written when a signature is linked to a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactProperties {
    #[serde(default = "default_file_id_property")]
    pub file_id: String,
    #[serde(default = "default_date_property")]
    pub date: String,
    #[serde(default = "default_status_property")]
    pub status: String,
    #[serde(default = "default_updated_property")]
    pub last_updated: String,
    #[serde(default = "default_status_value")]
    pub status_value: String,
}

fn default_file_id_property() -> String {
    "signature_file_id".to_string()
}

fn default_date_property() -> String {
    "signature_date".to_string()
}

fn default_status_property() -> String {
    "signature_status".to_string()
}

fn default_updated_property() -> String {
    "signature_last_updated".to_string()
}

fn default_status_value() -> String {
    "signed".to_string()
}

impl Default for ContactProperties {
    fn default() -> Self {
        Self {
            file_id: default_file_id_property(),
            date: default_date_property(),
            status: default_status_property(),
            last_updated: default_updated_property(),
            status_value: default_status_value(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Private-app token. Usually supplied via `SIGNLINK_API_TOKEN` rather
    /// than written to disk.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_token: String,
    #[serde(default)]
    pub portal_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    /// Prefix used to build the reference URL returned by `store`.
    #[serde(default)]
    pub public_base_url: String,
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,
    #[serde(default = "default_patch_timeout")]
    pub patch_timeout_secs: u64,
    #[serde(default)]
    pub contact_properties: ContactProperties,
}

fn default_api_base_url() -> String {
    hubspot_client::DEFAULT_BASE_URL.to_string()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_STORAGE_DIR)
}

fn default_retention_days() -> u64 {
    7
}

fn default_max_image_bytes() -> usize {
    MAX_IMAGE_BYTES
}

fn default_upload_timeout() -> u64 {
    60
}

fn default_patch_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_token: String::new(),
            portal_id: String::new(),
            folder_id: None,
            public_base_url: String::new(),
            storage_dir: default_storage_dir(),
            retention_days: default_retention_days(),
            max_image_bytes: default_max_image_bytes(),
            upload_timeout_secs: default_upload_timeout(),
            patch_timeout_secs: default_patch_timeout(),
            contact_properties: ContactProperties::default(),
        }
    }
}

impl Config {
    /// Load `signlink.yaml` from `root`; defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(24 * 60 * 60))
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn patch_timeout(&self) -> Duration {
        Duration::from_secs(self.patch_timeout_secs)
    }

    /// Credentials the finalize step cannot run without.
    pub fn require_remote(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(SignlinkError::ConfigMissing("api_token"));
        }
        if self.portal_id.trim().is_empty() {
            return Err(SignlinkError::ConfigMissing("portal_id"));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.api_token.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "api_token is empty; finalize will fail".to_string(),
            });
        }
        if self.portal_id.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "portal_id is empty; finalize will fail".to_string(),
            });
        }
        if self.folder_id.as_deref().map_or(true, |f| f.trim().is_empty()) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "folder_id not set; files land in the file manager root".to_string(),
            });
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("api_base_url '{}' is not an http(s) URL", self.api_base_url),
            });
        }
        if self.retention_days == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "retention_days is 0; the sweep will delete every stored image"
                    .to_string(),
            });
        }
        if self.max_image_bytes == 0 || self.max_image_bytes > MAX_IMAGE_BYTES {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "max_image_bytes must be between 1 and {MAX_IMAGE_BYTES}, got {}",
                    self.max_image_bytes
                ),
            });
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn complete() -> Config {
        Config {
            api_token: "pat-123".into(),
            portal_id: "4455".into(),
            folder_id: Some("77".into()),
            ..Config::default()
        }
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.retention_days, 7);
        assert_eq!(cfg.max_image_bytes, 5 * 1024 * 1024);
        assert_eq!(cfg.upload_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.patch_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.api_base_url, "https://api.hubapi.com");
    }

    #[test]
    fn save_and_load_round_trip_keeps_overrides() {
        let dir = TempDir::new().unwrap();
        let mut cfg = complete();
        cfg.retention_days = 3;
        cfg.contact_properties.status_value = "complete".into();
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.retention_days, 3);
        assert_eq!(loaded.portal_id, "4455");
        assert_eq!(loaded.contact_properties.status_value, "complete");
    }

    #[test]
    fn huge_retention_saturates() {
        let cfg = Config {
            retention_days: u64::MAX,
            ..Config::default()
        };
        assert_eq!(cfg.retention(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            paths::config_path(dir.path()),
            "portal_id: \"99\"\ncontact_properties:\n  status: sig_state\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.portal_id, "99");
        assert_eq!(cfg.contact_properties.status, "sig_state");
        assert_eq!(cfg.contact_properties.file_id, "signature_file_id");
    }

    #[test]
    fn require_remote_names_missing_token() {
        let cfg = Config {
            portal_id: "1".into(),
            ..Config::default()
        };
        assert!(matches!(
            cfg.require_remote(),
            Err(SignlinkError::ConfigMissing("api_token"))
        ));
    }

    #[test]
    fn require_remote_names_missing_portal() {
        let cfg = Config {
            api_token: "t".into(),
            ..Config::default()
        };
        assert!(matches!(
            cfg.require_remote(),
            Err(SignlinkError::ConfigMissing("portal_id"))
        ));
    }

    #[test]
    fn complete_config_has_no_warnings() {
        assert!(complete().validate().is_empty());
    }

    #[test]
    fn default_config_reports_errors() {
        let warnings = Config::default().validate();
        let errors = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .count();
        assert_eq!(errors, 2);
    }

    #[test]
    fn oversized_ceiling_is_error() {
        let cfg = Config {
            max_image_bytes: 50 * 1024 * 1024,
            ..complete()
        };
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
    }
}
