//! Upload-then-link orchestration.
//!
//! ```text
//! LinkRequest ──► claim stored image ──► upload to file store ──► patch contact
//!                        │                      │ fail                 │ fail
//!                        │                      ▼                      ▼
//!                        │              release claim,          logged, recorded as
//!                        │              Err(Upload)             ContactOutcome::Failed
//!                        ▼
//!               ReferenceNotFound (already linked or expired)
//! ```
//!
//! The upload is the primary outcome and must succeed; the contact patch is
//! best-effort and never fails the call. A finalize cancelled mid-upload drops
//! its [`Claim`](crate::store::Claim), which hands the image back.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use hubspot_client::{FileAccess, FileUpload, HubSpotClient, PropertyPatch};
use serde::{Deserialize, Serialize};

use crate::config::{Config, ContactProperties};
use crate::error::{Result, SignlinkError};
use crate::image::ImageType;
use crate::store::Storage;

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Remote file store the signature is pushed to.
pub trait RemoteFileStore: Send + Sync {
    fn upload(
        &self,
        file: RemoteUpload,
        timeout: Duration,
    ) -> impl Future<Output = Result<RemoteFile>> + Send;
}

/// CRM contacts addressed by email.
pub trait ContactDirectory: Send + Sync {
    fn update_by_email(
        &self,
        email: &str,
        patch: &PropertyPatch,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Resolve the contact behind a form submission.
pub trait SubmissionLookup: Send + Sync {
    fn email_for(&self, form_id: &str) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Lookup that never resolves a contact; the request's email hint is the
/// only source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl SubmissionLookup for NoLookup {
    async fn email_for(&self, _form_id: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

impl RemoteFileStore for HubSpotClient {
    async fn upload(&self, file: RemoteUpload, timeout: Duration) -> Result<RemoteFile> {
        let uploaded = self
            .upload_file(
                FileUpload {
                    bytes: file.bytes,
                    file_name: file.file_name,
                    mime: file.mime,
                    folder_id: file.folder_id,
                    access: FileAccess::Private,
                },
                timeout,
            )
            .await
            .map_err(|e| SignlinkError::Upload(e.to_string()))?;
        Ok(RemoteFile {
            id: uploaded.id,
            url: uploaded.url,
        })
    }
}

impl ContactDirectory for HubSpotClient {
    async fn update_by_email(
        &self,
        email: &str,
        patch: &PropertyPatch,
        timeout: Duration,
    ) -> Result<()> {
        self.update_contact_by_email(email, patch, timeout)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SignlinkError::ContactUpdate(format!("timed out after {timeout:?}"))
                } else {
                    SignlinkError::ContactUpdate(e.to_string())
                }
            })
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RemoteUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
    pub folder_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    pub form_id: String,
    pub reference: String,
    /// Contact email supplied by the caller; wins over the lookup.
    pub email: Option<String>,
}

/// What happened to the best-effort contact annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ContactOutcome {
    Updated { email: String },
    Skipped(String),
    Failed(String),
}

impl ContactOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, ContactOutcome::Updated { .. })
    }
}

/// Two-phase result: the uploaded file is always present, the contact step
/// reports separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOutcome {
    pub form_id: String,
    pub file: RemoteFile,
    pub contact: ContactOutcome,
}

impl LinkOutcome {
    pub fn message(&self) -> String {
        match &self.contact {
            ContactOutcome::Updated { .. } => {
                "Signature uploaded and contact updated".to_string()
            }
            ContactOutcome::Skipped(_) => "Signature uploaded".to_string(),
            ContactOutcome::Failed(_) => {
                "Signature uploaded; contact could not be updated".to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator<F, C, L> {
    config: Config,
    storage: Storage,
    files: F,
    contacts: C,
    lookup: L,
}

impl Orchestrator<HubSpotClient, HubSpotClient, NoLookup> {
    /// Wire the orchestrator to HubSpot using `config` credentials.
    pub fn hubspot(root: &Path, config: Config, http: reqwest::Client) -> Self {
        let client = HubSpotClient::with_http(http, &config.api_base_url, &config.api_token);
        let storage = Storage::from_config(root, &config);
        Self::new(config, storage, client.clone(), client, NoLookup)
    }
}

impl<F, C, L> Orchestrator<F, C, L>
where
    F: RemoteFileStore,
    C: ContactDirectory,
    L: SubmissionLookup,
{
    pub fn new(config: Config, storage: Storage, files: F, contacts: C, lookup: L) -> Self {
        Self {
            config,
            storage,
            files,
            contacts,
            lookup,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Upload the stored image named by `req.reference`, then annotate the
    /// submission's contact.
    pub async fn finalize(&self, req: LinkRequest) -> Result<LinkOutcome> {
        self.config.require_remote()?;

        let storage = self.storage.clone();
        let reference = req.reference.clone();
        let (claim, bytes) = tokio::task::spawn_blocking(move || {
            let claim = storage.claim(&reference)?;
            match claim.read() {
                Ok(bytes) => Ok::<_, SignlinkError>((claim, bytes)),
                Err(e) => {
                    if let Err(release_err) = claim.release() {
                        tracing::warn!(error = %release_err, "could not release signature claim");
                    }
                    Err(e)
                }
            }
        })
        .await
        .map_err(|e| SignlinkError::Io(std::io::Error::other(format!("task join error: {e}"))))??;

        let image_type: ImageType = claim.image_type();
        let upload = RemoteUpload {
            bytes,
            file_name: claim.filename().to_string(),
            mime: image_type.mime().to_string(),
            folder_id: self.config.folder_id.clone(),
        };

        let file = match self.files.upload(upload, self.config.upload_timeout()).await {
            Ok(file) => file,
            Err(e) => {
                tracing::error!(form_id = %req.form_id, file = claim.filename(), error = %e, "signature upload failed");
                if let Err(release_err) = blocking(move || claim.release()).await {
                    tracing::warn!(error = %release_err, "could not release signature claim");
                }
                return Err(e);
            }
        };
        tracing::info!(form_id = %req.form_id, file_id = %file.id, "signature uploaded");

        if let Err(e) = blocking(move || claim.consume()).await {
            tracing::warn!(error = %e, "uploaded signature could not be removed from storage");
        }

        let contact = self.annotate_contact(&req, &file).await;
        Ok(LinkOutcome {
            form_id: req.form_id,
            file,
            contact,
        })
    }

    async fn annotate_contact(&self, req: &LinkRequest, file: &RemoteFile) -> ContactOutcome {
        let email = match self.resolve_email(req).await {
            Ok(Some(email)) => email,
            Ok(None) => {
                return ContactOutcome::Skipped("no contact email for submission".to_string())
            }
            Err(e) => {
                tracing::warn!(form_id = %req.form_id, error = %e, "submission lookup failed");
                return ContactOutcome::Failed(e.to_string());
            }
        };

        let patch = signature_patch(
            &self.config.contact_properties,
            &file.id,
            chrono::Utc::now(),
        );
        match self
            .contacts
            .update_by_email(&email, &patch, self.config.patch_timeout())
            .await
        {
            Ok(()) => {
                tracing::info!(form_id = %req.form_id, %email, "contact annotated with signature");
                ContactOutcome::Updated { email }
            }
            Err(e) => {
                tracing::warn!(form_id = %req.form_id, %email, error = %e, "contact update failed");
                ContactOutcome::Failed(e.to_string())
            }
        }
    }

    async fn resolve_email(&self, req: &LinkRequest) -> Result<Option<String>> {
        if let Some(hint) = req.email.as_deref().map(str::trim) {
            if looks_like_email(hint) {
                return Ok(Some(hint.to_string()));
            }
            tracing::warn!(form_id = %req.form_id, "ignoring malformed email hint");
        }
        self.lookup.email_for(&req.form_id).await
    }
}

/// Property writes recorded on the contact for a linked signature.
pub fn signature_patch(
    names: &ContactProperties,
    file_id: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> PropertyPatch {
    PropertyPatch::new()
        .set(&names.file_id, file_id)
        .set(&names.date, now.format("%Y-%m-%d").to_string())
        .set(&names.status, &names.status_value)
        .set(&names.last_updated, now.timestamp_millis().to_string())
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

async fn blocking<T, G>(f: G) -> Result<T>
where
    G: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SignlinkError::Io(std::io::Error::other(format!("task join error: {e}"))))?
}
