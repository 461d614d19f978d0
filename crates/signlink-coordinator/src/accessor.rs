//! Capabilities the host page provides.
//!
//! The coordinator never touches a document directly. Everything it needs
//! from the embedded form, the signature widget and the page chrome goes
//! through these traits, so the same state machine drives a browser binding
//! or a test fake.

use std::time::Duration;

use crate::error::AccessError;

/// Opaque handle to a node inside the embedded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Synthetic events dispatched so the form's own validation notices a
/// programmatic value change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Input,
    Change,
}

impl FormEvent {
    pub fn name(self) -> &'static str {
        match self {
            FormEvent::Input => "input",
            FormEvent::Change => "change",
        }
    }
}

/// How the capture surface is mounted in place of the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceMount {
    pub width: u32,
    pub height: u32,
    pub show_clear_button: bool,
}

/// Where and which form the renderer should create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEmbed {
    pub target: String,
    pub portal_id: String,
    pub form_id: String,
}

/// Query-and-mutate access into the foreign form document.
pub trait EmbeddedFormAccessor: Send + Sync {
    fn query(&self, selector: &str) -> Option<NodeId>;
    fn replace_node(&self, node: NodeId, mount: &SurfaceMount) -> Result<(), AccessError>;
    fn set_value(&self, node: NodeId, value: &str) -> Result<(), AccessError>;
    fn dispatch(&self, node: NodeId, event: FormEvent) -> Result<(), AccessError>;
    fn hide(&self, node: NodeId) -> Result<(), AccessError>;
    fn show_inline_error(&self, message: &str);
    fn clear_inline_error(&self);
    /// Trigger the form's native submit.
    fn submit(&self) -> Result<(), AccessError>;
}

/// The signature widget: a bitmap that can be cleared and exported.
pub trait CaptureSurface: Send + Sync {
    fn is_empty(&self) -> bool;
    fn clear(&self);
    /// Export as `data:image/<type>;base64,...`.
    fn to_data_url(&self) -> Result<String, AccessError>;
}

/// The library that renders the foreign form into the page.
pub trait FormRenderer: Send + Sync {
    fn render(&self, embed: &FormEmbed) -> Result<(), AccessError>;
}

/// Page-level feedback outside the form.
pub trait StatusDisplay: Send + Sync {
    fn show_loading(&self);
    fn hide_loading(&self);
    /// Show a success notice that hides itself after `duration`.
    fn show_success(&self, duration: Duration);
    /// Blocking alert.
    fn alert(&self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_match_dom() {
        assert_eq!(FormEvent::Input.name(), "input");
        assert_eq!(FormEvent::Change.name(), "change");
    }
}
