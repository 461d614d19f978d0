//! The post-reload half: polls the carrier for a handed-off submission and
//! finalizes it once.

use std::sync::Arc;
use std::time::Duration;

use signlink_core::wire::{FinalizeRequest, FinalizeResponse};
use tokio::time::MissedTickBehavior;

use crate::accessor::{CaptureSurface, StatusDisplay};
use crate::carrier::{CarriedSubmission, Carrier};
use crate::config::CoordinatorConfig;
use crate::error::CoordinatorError;
use crate::phase::{Event, Phase};
use crate::service::SignatureService;

pub struct FinalizeWatcher<S> {
    service: S,
    carrier: Arc<dyn Carrier>,
    surface: Arc<dyn CaptureSurface>,
    status: Arc<dyn StatusDisplay>,
    key: String,
    page_path: String,
    poll_interval: Duration,
    success_display: Duration,
    phase: Phase,
}

impl<S: SignatureService> FinalizeWatcher<S> {
    pub fn new(
        config: &CoordinatorConfig,
        page_path: impl Into<String>,
        service: S,
        carrier: Arc<dyn Carrier>,
        surface: Arc<dyn CaptureSurface>,
        status: Arc<dyn StatusDisplay>,
    ) -> Self {
        Self {
            service,
            carrier,
            surface,
            status,
            key: config.carrier.key.clone(),
            page_path: page_path.into(),
            poll_interval: config.poll_interval(),
            success_display: config.success_display(),
            phase: Phase::WatchingForIdentifier,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Poll until a submission shows up, then finalize it. Dropping the
    /// future (page abandoned) stops polling.
    pub async fn run(&mut self) -> Result<FinalizeResponse, CoordinatorError> {
        if self.phase != Phase::WatchingForIdentifier {
            return Err(CoordinatorError::InvalidTransition {
                from: self.phase,
                event: Event::IdentifierFound,
            });
        }
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Some(result) = self.poll_once().await {
                return result;
            }
        }
    }

    /// One poll. `None` when nothing is carried or the watcher is finished.
    pub async fn poll_once(&mut self) -> Option<Result<FinalizeResponse, CoordinatorError>> {
        if self.phase != Phase::WatchingForIdentifier {
            return None;
        }
        // `take` removes the value, so no later poll can see it again.
        let raw = self.carrier.take(&self.key, &self.page_path)?;
        Some(self.finalize(&raw).await)
    }

    async fn finalize(&mut self, raw: &str) -> Result<FinalizeResponse, CoordinatorError> {
        self.phase = self.phase.transition(Event::IdentifierFound)?;

        let carried = match CarriedSubmission::decode(raw) {
            Ok(c) => c,
            Err(e) => return self.fail(CoordinatorError::Carrier(e.to_string())),
        };
        tracing::info!(form_id = %carried.form_id, "finalizing signature");

        self.status.show_loading();
        let result = self
            .service
            .finalize(&FinalizeRequest {
                form_id: carried.form_id,
                reference: carried.reference,
                email: carried.email,
            })
            .await;
        self.status.hide_loading();

        match result {
            Ok(resp) => {
                self.surface.clear();
                self.status.show_success(self.success_display);
                self.phase = self.phase.transition(Event::FinalizeSucceeded)?;
                tracing::info!(
                    form_id = %resp.form_id,
                    file_id = %resp.file_id,
                    contact_updated = resp.contact_updated,
                    "signature linked"
                );
                Ok(resp)
            }
            Err(e) => self.fail(e.into()),
        }
    }

    fn fail(&mut self, e: CoordinatorError) -> Result<FinalizeResponse, CoordinatorError> {
        tracing::error!(error = %e, "signature finalize failed");
        self.status.alert(&e.user_message());
        self.phase = self
            .phase
            .transition(Event::FinalizeFailed)
            .unwrap_or(Phase::Error);
        Err(e)
    }
}
