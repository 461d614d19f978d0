//! Per-page-load lifecycle of the coordinator.
//!
//! ```text
//! Idle ──SurfaceInjected──► Capturing ──SubmitRequested──► Uploading
//!                             ▲   ▲                            │
//!                             │   └────────UploadFailed────────┤
//!                             │                                ▼ StoreSucceeded
//!                             └──────SignatureChanged───── AwaitingResubmit
//!                                                              │ (reload)
//! Idle ──PageLoaded──► WatchingForIdentifier ──IdentifierFound──► Finalizing
//!                                                              │
//!                                   FinalizeSucceeded ◄────────┴────► FinalizeFailed
//!                                          Done                        Error
//! ```
//!
//! There is no edge from `Capturing` to `AwaitingResubmit` and no edge into
//! `Finalizing` except through `IdentifierFound`.

use serde::Serialize;
use std::fmt;

use crate::error::CoordinatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Capturing,
    Uploading,
    AwaitingResubmit,
    WatchingForIdentifier,
    Finalizing,
    Done,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    SurfaceInjected,
    SubmitRequested,
    StoreSucceeded,
    UploadFailed,
    /// The drawing changed after its image was stored.
    SignatureChanged,
    PageLoaded,
    IdentifierFound,
    FinalizeSucceeded,
    FinalizeFailed,
}

impl Phase {
    pub fn transition(self, event: Event) -> Result<Phase, CoordinatorError> {
        use Event::*;
        use Phase::*;
        let next = match (self, event) {
            (Idle, SurfaceInjected) => Capturing,
            (Capturing, SubmitRequested) => Uploading,
            (Uploading, StoreSucceeded) => AwaitingResubmit,
            (Uploading | AwaitingResubmit, UploadFailed) => Capturing,
            (AwaitingResubmit, SignatureChanged) => Capturing,
            (Idle, PageLoaded) => WatchingForIdentifier,
            (WatchingForIdentifier, IdentifierFound) => Finalizing,
            (Finalizing, FinalizeSucceeded) => Done,
            (Finalizing, FinalizeFailed) => Error,
            (from, event) => return Err(CoordinatorError::InvalidTransition { from, event }),
        };
        Ok(next)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Error)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Capturing => "capturing",
            Phase::Uploading => "uploading",
            Phase::AwaitingResubmit => "awaiting_resubmit",
            Phase::WatchingForIdentifier => "watching_for_identifier",
            Phase::Finalizing => "finalizing",
            Phase::Done => "done",
            Phase::Error => "error",
        };
        f.write_str(s)
    }
}
