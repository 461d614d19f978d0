//! In-memory fakes for the host capabilities and the signature service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use signlink_core::image::ImageType;
use signlink_core::wire::{FinalizeRequest, FinalizeResponse, StoreRequest, StoreResponse};

use crate::accessor::{
    CaptureSurface, EmbeddedFormAccessor, FormEmbed, FormEvent, FormRenderer, NodeId,
    StatusDisplay, SurfaceMount,
};
use crate::carrier::MemoryCarrier;
use crate::coordinator::Capabilities;
use crate::error::{AccessError, ServiceError};
use crate::service::SignatureService;

pub(crate) const PLACEHOLDER: NodeId = NodeId(1);
pub(crate) const MARKER: NodeId = NodeId(2);
pub(crate) const STORED_FILENAME: &str = "signature_1700000000_abcDEF123456.png";

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct FakeForm {
    nodes: HashMap<String, NodeId>,
    replaced: Mutex<Vec<(NodeId, u32, u32)>>,
    hidden: Mutex<Vec<NodeId>>,
    values: Mutex<HashMap<NodeId, String>>,
    dispatched: Mutex<Vec<&'static str>>,
    inline_error: Mutex<Option<String>>,
    submits: AtomicUsize,
}

impl FakeForm {
    pub(crate) fn complete() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert("#signature-pad-placeholder".to_string(), PLACEHOLDER);
        nodes.insert(r#"input[name="signature_signed"]"#.to_string(), MARKER);
        Self {
            nodes,
            ..Self::default()
        }
    }

    pub(crate) fn without_placeholder() -> Self {
        let mut form = Self::complete();
        form.nodes.remove("#signature-pad-placeholder");
        form
    }

    pub(crate) fn without_marker() -> Self {
        let mut form = Self::complete();
        form.nodes.remove(r#"input[name="signature_signed"]"#);
        form
    }

    pub(crate) fn replaced(&self) -> Vec<(NodeId, u32, u32)> {
        self.replaced.lock().unwrap().clone()
    }

    pub(crate) fn hidden(&self) -> Vec<NodeId> {
        self.hidden.lock().unwrap().clone()
    }

    pub(crate) fn value(&self, node: NodeId) -> Option<String> {
        self.values.lock().unwrap().get(&node).cloned()
    }

    pub(crate) fn dispatched(&self) -> Vec<&'static str> {
        self.dispatched.lock().unwrap().clone()
    }

    pub(crate) fn inline_error(&self) -> Option<String> {
        self.inline_error.lock().unwrap().clone()
    }

    pub(crate) fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }
}

impl EmbeddedFormAccessor for FakeForm {
    fn query(&self, selector: &str) -> Option<NodeId> {
        self.nodes.get(selector).copied()
    }

    fn replace_node(&self, node: NodeId, mount: &SurfaceMount) -> Result<(), AccessError> {
        self.replaced
            .lock()
            .unwrap()
            .push((node, mount.width, mount.height));
        Ok(())
    }

    fn set_value(&self, node: NodeId, value: &str) -> Result<(), AccessError> {
        self.values.lock().unwrap().insert(node, value.to_string());
        Ok(())
    }

    fn dispatch(&self, _node: NodeId, event: FormEvent) -> Result<(), AccessError> {
        self.dispatched.lock().unwrap().push(event.name());
        Ok(())
    }

    fn hide(&self, node: NodeId) -> Result<(), AccessError> {
        self.hidden.lock().unwrap().push(node);
        Ok(())
    }

    fn show_inline_error(&self, message: &str) {
        *self.inline_error.lock().unwrap() = Some(message.to_string());
    }

    fn clear_inline_error(&self) {
        *self.inline_error.lock().unwrap() = None;
    }

    fn submit(&self) -> Result<(), AccessError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Surface, renderer, status
// ---------------------------------------------------------------------------

pub(crate) struct FakeSurface {
    empty: AtomicBool,
}

impl FakeSurface {
    pub(crate) fn draw(&self) {
        self.empty.store(false, Ordering::SeqCst);
    }
}

impl Default for FakeSurface {
    fn default() -> Self {
        Self {
            empty: AtomicBool::new(true),
        }
    }
}

impl CaptureSurface for FakeSurface {
    fn is_empty(&self) -> bool {
        self.empty.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.empty.store(true, Ordering::SeqCst);
    }

    fn to_data_url(&self) -> Result<String, AccessError> {
        Ok("data:image/png;base64,c2ln".to_string())
    }
}

#[derive(Default)]
pub(crate) struct FakeRenderer {
    rendered: Mutex<Vec<FormEmbed>>,
}

impl FakeRenderer {
    pub(crate) fn rendered(&self) -> Vec<FormEmbed> {
        self.rendered.lock().unwrap().clone()
    }
}

impl FormRenderer for FakeRenderer {
    fn render(&self, embed: &FormEmbed) -> Result<(), AccessError> {
        self.rendered.lock().unwrap().push(embed.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeStatus {
    events: Mutex<Vec<String>>,
}

impl FakeStatus {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl StatusDisplay for FakeStatus {
    fn show_loading(&self) {
        self.push("loading".into());
    }

    fn hide_loading(&self) {
        self.push("hide_loading".into());
    }

    fn show_success(&self, duration: Duration) {
        self.push(format!("success:{}ms", duration.as_millis()));
    }

    fn alert(&self, message: &str) {
        self.push(format!("alert:{message}"));
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ServiceState {
    store_failure: Option<String>,
    finalize_failure: Option<String>,
    store_calls: usize,
    finalize_calls: Vec<FinalizeRequest>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeService {
    state: Arc<Mutex<ServiceState>>,
}

impl FakeService {
    pub(crate) fn fail_store(&self, message: &str) {
        self.state.lock().unwrap().store_failure = Some(message.to_string());
    }

    pub(crate) fn fail_finalize(&self, message: &str) {
        self.state.lock().unwrap().finalize_failure = Some(message.to_string());
    }

    pub(crate) fn store_calls(&self) -> usize {
        self.state.lock().unwrap().store_calls
    }

    pub(crate) fn finalize_calls(&self) -> Vec<FinalizeRequest> {
        self.state.lock().unwrap().finalize_calls.clone()
    }
}

impl SignatureService for FakeService {
    async fn store(&self, _req: &StoreRequest) -> Result<StoreResponse, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.store_calls += 1;
        if let Some(message) = state.store_failure.clone() {
            return Err(ServiceError::Rejected {
                status: 400,
                message,
            });
        }
        Ok(StoreResponse {
            success: true,
            url: format!("https://forms.example.com/sig/{STORED_FILENAME}"),
            path: format!("/srv/signatures/{STORED_FILENAME}"),
            filename: STORED_FILENAME.to_string(),
            size: 3,
            image_type: ImageType::Png,
        })
    }

    async fn finalize(&self, req: &FinalizeRequest) -> Result<FinalizeResponse, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.finalize_calls.push(req.clone());
        if let Some(message) = state.finalize_failure.clone() {
            return Err(ServiceError::Rejected {
                status: 502,
                message,
            });
        }
        Ok(FinalizeResponse {
            success: true,
            form_id: req.form_id.clone(),
            file_id: "file-1".into(),
            file_url: "https://files.example/file-1.png".into(),
            contact_updated: true,
            message: "Signature uploaded and contact updated".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub(crate) struct Harness {
    pub form: Arc<FakeForm>,
    pub surface: Arc<FakeSurface>,
    pub renderer: Arc<FakeRenderer>,
    pub status: Arc<FakeStatus>,
    pub carrier: Arc<MemoryCarrier>,
    pub service: FakeService,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_form(FakeForm::complete())
    }

    pub(crate) fn with_form(form: FakeForm) -> Self {
        Self {
            form: Arc::new(form),
            surface: Arc::new(FakeSurface::default()),
            renderer: Arc::new(FakeRenderer::default()),
            status: Arc::new(FakeStatus::default()),
            carrier: Arc::new(MemoryCarrier::new()),
            service: FakeService::default(),
        }
    }

    pub(crate) fn capabilities(&self) -> Capabilities {
        Capabilities {
            capture_surface: Some(self.surface.clone() as Arc<dyn CaptureSurface>),
            dom_query: Some(self.form.clone() as Arc<dyn EmbeddedFormAccessor>),
            form_renderer: Some(self.renderer.clone() as Arc<dyn FormRenderer>),
            status: self.status.clone(),
            carrier: self.carrier.clone(),
        }
    }
}
