//! Short-lived, single-read hand-off that survives the form's post-submit
//! reload.
//!
//! A value is scoped by key and path, expires after its TTL, and is removed
//! by the read that returns it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierScope {
    pub ttl: Duration,
    /// Visible only to pages whose path starts with this prefix.
    pub path: String,
}

pub trait Carrier: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: String, scope: &CarrierScope);

    /// Remove and return the live value for `key` as seen from `page_path`.
    fn take(&self, key: &str, page_path: &str) -> Option<String>;
}

/// What crosses the reload: the platform's submission id, the stored image
/// reference returned by `store`, and the submitter's email when the form
/// collected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarriedSubmission {
    pub form_id: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CarriedSubmission {
    pub fn encode(&self) -> String {
        // Plain string fields cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

// ---------------------------------------------------------------------------
// In-memory carrier
// ---------------------------------------------------------------------------

struct Entry {
    value: String,
    path: String,
    expires_at: Instant,
}

/// Process-local carrier. Shared between page-load instances through `Arc`.
#[derive(Default)]
pub struct MemoryCarrier {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCarrier {
    pub fn new() -> Self {
        Self::default()
    }
}

fn path_matches(scope_path: &str, page_path: &str) -> bool {
    if scope_path == "/" || scope_path == page_path {
        return true;
    }
    page_path
        .strip_prefix(scope_path.trim_end_matches('/'))
        .is_some_and(|rest| rest.starts_with('/'))
}

impl Carrier for MemoryCarrier {
    fn put(&self, key: &str, value: String, scope: &CarrierScope) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(
            key.to_string(),
            Entry {
                value,
                path: scope.path.clone(),
                expires_at: Instant::now() + scope.ttl,
            },
        );
    }

    fn take(&self, key: &str, page_path: &str) -> Option<String> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            entries.remove(key);
            return None;
        }
        if !path_matches(&entry.path, page_path) {
            return None;
        }
        entries.remove(key).map(|e| e.value)
    }
}
