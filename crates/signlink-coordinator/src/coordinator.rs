//! The capture-and-submit half: runs while the signer is on the form page.
//!
//! ```text
//! Host event            Handler                 Phase
//! ─────────────────     ─────────────────────   ─────────────────────────
//! form ready            on_form_ready           idle → capturing
//! stroke end / clear    on_stroke_end           capturing
//!                       clear_signature         awaiting_resubmit → capturing
//! submit pressed        on_before_submit        capturing → uploading
//! (Upload decision)     upload_then_resubmit    uploading → awaiting_resubmit
//! submit re-fired       on_before_submit        awaiting_resubmit (Proceed)
//! submission accepted   on_form_submitted       awaiting_resubmit
//! ```

use std::sync::Arc;

use signlink_core::wire::StoreRequest;

use crate::accessor::{
    CaptureSurface, EmbeddedFormAccessor, FormEmbed, FormEvent, FormRenderer, NodeId,
    StatusDisplay, SurfaceMount,
};
use crate::carrier::{CarriedSubmission, Carrier};
use crate::config::{CoordinatorConfig, SIGNED_VALUE};
use crate::error::{AccessError, CoordinatorError, InitError, InjectError};
use crate::phase::{Event, Phase};
use crate::service::SignatureService;
use crate::watcher::FinalizeWatcher;

pub const EMPTY_SIGNATURE_MESSAGE: &str = "Please provide your signature before submitting.";

/// Submission payload keys that may carry the platform's embed id, in order
/// of preference.
const EMBED_ID_KEYS: [&str; 3] = ["embedId", "conversionId", "submissionGuid"];

const EMAIL_FIELD: &str = "email";

/// Everything the host page must supply. The three third-party libraries are
/// optional here so `initialize` can refuse cleanly when one did not load.
pub struct Capabilities {
    pub capture_surface: Option<Arc<dyn CaptureSurface>>,
    pub dom_query: Option<Arc<dyn EmbeddedFormAccessor>>,
    pub form_renderer: Option<Arc<dyn FormRenderer>>,
    pub status: Arc<dyn StatusDisplay>,
    pub carrier: Arc<dyn Carrier>,
}

/// Answer to the form library's before-submit hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Let the native submit go through.
    Proceed,
    /// Stop this submit attempt.
    Cancel,
    /// Stop this submit attempt and call `upload_then_resubmit`.
    Upload,
}

impl SubmitDecision {
    pub fn allows_submit(self) -> bool {
        self == SubmitDecision::Proceed
    }
}

pub struct Coordinator<S> {
    config: CoordinatorConfig,
    form: Arc<dyn EmbeddedFormAccessor>,
    surface: Arc<dyn CaptureSurface>,
    status: Arc<dyn StatusDisplay>,
    carrier: Arc<dyn Carrier>,
    service: S,
    phase: Phase,
    marker: Option<NodeId>,
    reference: Option<String>,
}

impl<S: SignatureService> Coordinator<S> {
    /// Validate options and capabilities, then render the form. Nothing is
    /// rendered unless every check passes.
    pub fn initialize(
        config: CoordinatorConfig,
        caps: Capabilities,
        service: S,
    ) -> Result<Self, InitError> {
        let result = Self::try_initialize(config, caps, service);
        if let Err(e) = &result {
            tracing::error!(error = %e, "signature capture disabled");
        }
        result
    }

    fn try_initialize(
        config: CoordinatorConfig,
        caps: Capabilities,
        service: S,
    ) -> Result<Self, InitError> {
        let surface = caps
            .capture_surface
            .ok_or(InitError::MissingCapability("capture surface"))?;
        let form = caps
            .dom_query
            .ok_or(InitError::MissingCapability("DOM query helper"))?;
        let renderer = caps
            .form_renderer
            .ok_or(InitError::MissingCapability("form renderer"))?;
        if let Some(name) = config.missing_option() {
            return Err(InitError::MissingOption(name));
        }

        renderer
            .render(&FormEmbed {
                target: config.target.clone(),
                portal_id: config.portal_id.clone(),
                form_id: config.form_id.clone(),
            })
            .map_err(InitError::Render)?;
        tracing::info!(form_id = %config.form_id, target = %config.target, "signature form rendered");

        Ok(Self {
            config,
            form,
            surface,
            status: caps.status,
            carrier: caps.carrier,
            service,
            phase: Phase::Idle,
            marker: None,
            reference: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Reference returned by the last successful `store`.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    fn advance(&mut self, event: Event) -> Result<(), CoordinatorError> {
        let next = self.phase.transition(event)?;
        tracing::debug!(from = %self.phase, to = %next, ?event, "phase change");
        self.phase = next;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Injection
    // -----------------------------------------------------------------------

    /// Wait for the embedded form to settle, then swap the placeholder for
    /// the capture surface. Failure leaves the form usable without a
    /// signature.
    pub async fn on_form_ready(&mut self) -> Result<(), InjectError> {
        tokio::time::sleep(self.config.settle_delay()).await;
        let result = self.inject();
        if let Err(e) = &result {
            tracing::warn!(error = %e, "signature field not injected");
        }
        result
    }

    fn inject(&mut self) -> Result<(), InjectError> {
        let next = self.phase.transition(Event::SurfaceInjected)?;

        let placeholder = self
            .form
            .query(&self.config.placeholder_selector)
            .ok_or_else(|| InjectError::PlaceholderMissing(self.config.placeholder_selector.clone()))?;
        let marker_selector = self.config.marker_selector();
        let marker = self
            .form
            .query(&marker_selector)
            .ok_or(InjectError::MarkerFieldMissing(marker_selector))?;

        self.form.replace_node(
            placeholder,
            &SurfaceMount {
                width: self.config.width,
                height: self.config.height,
                show_clear_button: self.config.show_clear_button,
            },
        )?;
        if self.config.auto_hide_marker_field {
            self.form.hide(marker)?;
        }

        self.marker = Some(marker);
        self.phase = next;
        tracing::debug!("signature surface injected");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Capture
    // -----------------------------------------------------------------------

    /// Mirror the surface state into the marker field so the form's own
    /// required-field validation sees it.
    fn sync_marker(&self) -> Result<(), AccessError> {
        let Some(marker) = self.marker else {
            return Ok(());
        };
        let value = if self.surface.is_empty() {
            ""
        } else {
            SIGNED_VALUE
        };
        self.form.set_value(marker, value)?;
        for event in [FormEvent::Input, FormEvent::Change] {
            self.form.dispatch(marker, event)?;
        }
        Ok(())
    }

    pub fn on_stroke_end(&mut self) {
        self.discard_upload();
        if let Err(e) = self.sync_marker() {
            tracing::warn!(error = %e, "marker field not updated");
        }
    }

    /// Backs the clear button.
    pub fn clear_signature(&mut self) {
        self.surface.clear();
        self.discard_upload();
        if let Err(e) = self.sync_marker() {
            tracing::warn!(error = %e, "marker field not updated");
        }
    }

    /// The stored image no longer matches the drawing, so the next submit
    /// has to upload again.
    fn discard_upload(&mut self) {
        if self.phase != Phase::AwaitingResubmit {
            return;
        }
        if let Some(reference) = self.reference.take() {
            tracing::debug!(%reference, "signature changed after upload; stored image dropped");
        }
        if let Err(e) = self.advance(Event::SignatureChanged) {
            tracing::warn!(error = %e, "phase not reset after signature change");
        }
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    pub fn on_before_submit(&mut self) -> SubmitDecision {
        // Injection never happened; the form runs without a signature field.
        if self.phase == Phase::Idle {
            return SubmitDecision::Proceed;
        }
        if self.surface.is_empty() {
            self.form.show_inline_error(EMPTY_SIGNATURE_MESSAGE);
            if let Err(e) = self.sync_marker() {
                tracing::warn!(error = %e, "marker field not updated");
            }
            return SubmitDecision::Cancel;
        }
        if self.phase == Phase::AwaitingResubmit && self.reference.is_some() {
            return SubmitDecision::Proceed;
        }

        if let Err(e) = self.sync_marker() {
            tracing::warn!(error = %e, "marker field not updated");
        }
        match self.advance(Event::SubmitRequested) {
            Ok(()) => {
                self.form.clear_inline_error();
                SubmitDecision::Upload
            }
            Err(e) => {
                tracing::debug!(error = %e, "submit ignored");
                SubmitDecision::Cancel
            }
        }
    }

    /// Store the captured image, then fire the form's native submit again.
    /// On failure the signer sees an inline error and the form is not
    /// submitted.
    pub async fn upload_then_resubmit(&mut self) -> Result<String, CoordinatorError> {
        if self.phase != Phase::Uploading {
            return Err(CoordinatorError::InvalidTransition {
                from: self.phase,
                event: Event::StoreSucceeded,
            });
        }
        match self.upload().await {
            Ok(reference) => Ok(reference),
            Err(e) => {
                tracing::warn!(error = %e, "signature upload failed; form not submitted");
                self.reference = None;
                self.form.show_inline_error(&e.user_message());
                self.advance(Event::UploadFailed)?;
                Err(e)
            }
        }
    }

    async fn upload(&mut self) -> Result<String, CoordinatorError> {
        if self.surface.is_empty() {
            return Err(CoordinatorError::EmptyCapture);
        }
        let image = self.surface.to_data_url()?;
        let stored = self.service.store(&StoreRequest { image }).await?;
        self.advance(Event::StoreSucceeded)?;
        self.reference = Some(stored.filename.clone());
        tracing::info!(filename = %stored.filename, size = stored.size, "signature stored; resubmitting");

        self.form.submit()?;
        Ok(stored.filename)
    }

    /// Hand the accepted submission across the coming reload.
    pub fn on_form_submitted(&mut self, payload: &serde_json::Value) -> Result<(), CoordinatorError> {
        let result = self.hand_off(payload);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "submission not handed off; signature will not be linked");
        }
        result
    }

    fn hand_off(&self, payload: &serde_json::Value) -> Result<(), CoordinatorError> {
        if self.phase != Phase::AwaitingResubmit {
            return Err(CoordinatorError::NoStoredReference);
        }
        let reference = self
            .reference
            .clone()
            .ok_or(CoordinatorError::NoStoredReference)?;
        let form_id = embed_id(payload).ok_or(CoordinatorError::MissingEmbedId)?;

        let carried = CarriedSubmission {
            form_id,
            reference,
            email: submitter_email(payload),
        };
        self.carrier.put(
            &self.config.carrier.key,
            carried.encode(),
            &self.config.carrier.scope(),
        );
        tracing::info!(
            form_id = %carried.form_id,
            has_email = carried.email.is_some(),
            "submission handed off for finalize"
        );
        Ok(())
    }

    /// Watcher for this page load, sharing this coordinator's capabilities.
    pub fn finalize_watcher(&self, page_path: impl Into<String>) -> FinalizeWatcher<S>
    where
        S: Clone,
    {
        FinalizeWatcher::new(
            &self.config,
            page_path,
            self.service.clone(),
            Arc::clone(&self.carrier),
            Arc::clone(&self.surface),
            Arc::clone(&self.status),
        )
    }
}

fn embed_id(payload: &serde_json::Value) -> Option<String> {
    EMBED_ID_KEYS.iter().find_map(|key| match payload.get(*key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// The submitter's email, from `submissionValues` or the `fields` list.
fn submitter_email(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("submissionValues")
        .and_then(|values| values.get(EMAIL_FIELD))
        .and_then(serde_json::Value::as_str)
        .or_else(|| field_value(payload, EMAIL_FIELD))
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
}

fn field_value<'a>(payload: &'a serde_json::Value, name: &str) -> Option<&'a str> {
    payload
        .get("fields")?
        .as_array()?
        .iter()
        .find(|field| field.get("name").and_then(serde_json::Value::as_str) == Some(name))?
        .get("value")?
        .as_str()
}
