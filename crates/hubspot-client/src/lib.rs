//! `hubspot-client`: minimal async driver for the two HubSpot endpoints the
//! signature pipeline touches.
//!
//! ```text
//! HubSpotClient
//!     │
//!     ├── upload_file      POST  /files/v3/files                      (multipart, expects 201)
//!     └── update_contact   PATCH /crm/v3/objects/contacts/{email}
//!                                ?idProperty=email                    (json, expects 200)
//! ```
//!
//! Every call takes an explicit timeout and is attempted exactly once.

pub mod contacts;
pub mod error;
pub mod files;
pub mod types;

pub use error::HubSpotError;
pub use types::{FileAccess, FileUpload, PropertyPatch, UploadedFile};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, HubSpotError>;

pub const DEFAULT_BASE_URL: &str = "https://api.hubapi.com";

/// Authenticated handle on the HubSpot API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HubSpotClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HubSpotClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, token)
    }

    /// Reuse an existing connection pool.
    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base_url}/{segments...}` with each segment percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| HubSpotError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| HubSpotError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Read the body of a non-success response for error reporting.
pub(crate) async fn status_error(resp: reqwest::Response) -> HubSpotError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    HubSpotError::Status { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segments() {
        let client = HubSpotClient::new("https://api.hubapi.com", "t");
        let url = client.endpoint(&["files", "v3", "files"]).unwrap();
        assert_eq!(url.as_str(), "https://api.hubapi.com/files/v3/files");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = HubSpotClient::new("http://127.0.0.1:9000/proxy/", "t");
        let url = client.endpoint(&["crm", "v3"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/proxy/crm/v3");
    }

    #[test]
    fn endpoint_rejects_garbage_base() {
        let client = HubSpotClient::new("not a url", "t");
        assert!(matches!(
            client.endpoint(&["x"]),
            Err(HubSpotError::InvalidUrl(_))
        ));
    }
}
