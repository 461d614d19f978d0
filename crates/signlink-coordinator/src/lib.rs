//! `signlink-coordinator`: drives a signature field inside a third-party
//! embedded form.
//!
//! ```text
//! page load 1                                 page load 2 (after reload)
//! ───────────                                 ──────────────────────────
//! Coordinator::initialize                     Coordinator::initialize
//!   on_form_ready      inject surface           finalize_watcher(path).run()
//!   on_stroke_end      sync marker field          poll Carrier every 2s
//!   on_before_submit   gate on empty              take() hit ─► finalize
//!   upload_then_resubmit ─► store ─► submit       show success / alert
//!   on_form_submitted  ─► Carrier.put ─────────►
//! ```
//!
//! The host page supplies the foreign-form access, the signature widget and
//! the page chrome through the traits in [`accessor`].

pub mod accessor;
pub mod carrier;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod phase;
pub mod service;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use accessor::{
    CaptureSurface, EmbeddedFormAccessor, FormEmbed, FormEvent, FormRenderer, NodeId,
    StatusDisplay, SurfaceMount,
};
pub use carrier::{CarriedSubmission, Carrier, CarrierScope, MemoryCarrier};
pub use config::CoordinatorConfig;
pub use coordinator::{Capabilities, Coordinator, SubmitDecision};
pub use error::{AccessError, CoordinatorError, InitError, InjectError, ServiceError};
pub use phase::{Event, Phase};
pub use service::{HttpSignatureService, SignatureService};
pub use watcher::FinalizeWatcher;
