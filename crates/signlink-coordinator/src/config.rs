use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::carrier::CarrierScope;

/// Value written into the marker field while the surface holds a signature.
pub const SIGNED_VALUE: &str = "signed";

fn default_signed_field_name() -> String {
    "signature_signed".to_string()
}

fn default_placeholder_selector() -> String {
    "#signature-pad-placeholder".to_string()
}

fn default_width() -> u32 {
    400
}

fn default_height() -> u32 {
    200
}

fn default_true() -> bool {
    true
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_success_display_ms() -> u64 {
    2500
}

fn default_carrier_key() -> String {
    "signlink_submission".to_string()
}

fn default_carrier_ttl_secs() -> u64 {
    60
}

fn default_carrier_path() -> String {
    "/".to_string()
}

/// Named options passed to `Coordinator::initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Selector of the element the form is rendered into.
    pub target: String,
    pub portal_id: String,
    pub form_id: String,

    /// Hidden form field the form's own validation reads.
    #[serde(default = "default_signed_field_name")]
    pub signed_field_name: String,

    #[serde(default = "default_placeholder_selector")]
    pub placeholder_selector: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_true")]
    pub show_clear_button: bool,

    #[serde(default = "default_true")]
    pub auto_hide_marker_field: bool,

    /// Wait after form-ready before touching the form.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_success_display_ms")]
    pub success_display_ms: u64,

    #[serde(default)]
    pub carrier: CarrierSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierSettings {
    #[serde(default = "default_carrier_key")]
    pub key: String,
    #[serde(default = "default_carrier_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_carrier_path")]
    pub path: String,
}

impl Default for CarrierSettings {
    fn default() -> Self {
        Self {
            key: default_carrier_key(),
            ttl_secs: default_carrier_ttl_secs(),
            path: default_carrier_path(),
        }
    }
}

impl CarrierSettings {
    pub fn scope(&self) -> CarrierScope {
        CarrierScope {
            ttl: Duration::from_secs(self.ttl_secs),
            path: self.path.clone(),
        }
    }
}

impl CoordinatorConfig {
    pub fn new(
        target: impl Into<String>,
        portal_id: impl Into<String>,
        form_id: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            portal_id: portal_id.into(),
            form_id: form_id.into(),
            signed_field_name: default_signed_field_name(),
            placeholder_selector: default_placeholder_selector(),
            width: default_width(),
            height: default_height(),
            show_clear_button: true,
            auto_hide_marker_field: true,
            settle_delay_ms: default_settle_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            success_display_ms: default_success_display_ms(),
            carrier: CarrierSettings::default(),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }

    /// Selector for the marker input inside the form.
    pub fn marker_selector(&self) -> String {
        format!("input[name=\"{}\"]", self.signed_field_name)
    }

    /// First required option that is blank, if any.
    pub(crate) fn missing_option(&self) -> Option<&'static str> {
        [
            ("target", &self.target),
            ("portal_id", &self.portal_id),
            ("form_id", &self.form_id),
            ("signed_field_name", &self.signed_field_name),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
    }
}
