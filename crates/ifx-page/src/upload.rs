//! Image upload workflow: file selection, local preview, round-trip to the
//! processing backend, remote preview.

use crate::notice::NoticeLog;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ifx_dom::Document;
use ifx_dom::NodeId;
use ifx_net::FilePayload;
use ifx_net::UploadClient;
use ifx_net::transport::Transport;
use ifx_resolve::Role;

pub const UPLOAD_ENDPOINT: &str = "http://127.0.0.1:8000/upload";

pub const MSG_NO_FILE: &str = "Please choose a file first.";
pub const MSG_UPLOAD_FAILED: &str = "Image processing failed. Please try again.";
pub const MSG_UPLOAD_DONE: &str = "Processing complete.";

const LOCAL_PREVIEW_ID: &str = "before-img";
const REMOTE_PREVIEW_ID: &str = "after-img";

/// Where the workflow stands. Transitions only move forward until a new
/// file selection resets the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    FilePicked,
    LocalPreviewReady,
    Uploading,
    RemotePreviewReady,
    Failed,
}

#[derive(Debug)]
pub struct UploadWorkflow {
    input: NodeId,
    trigger: NodeId,
    local_preview: NodeId,
    remote_preview: NodeId,
    phase: UploadPhase,
    pending: Option<FilePayload>,
}

/// Binds the workflow when both the file input and the trigger control are
/// present. Preview images are created next to the trigger when the page
/// does not ship its own.
pub fn bind_upload(doc: &mut Document) -> Option<UploadWorkflow> {
    let input = ifx_resolve::resolve(doc, Role::FileInput)?;
    let trigger = ifx_resolve::resolve(doc, Role::UploadTrigger)?;

    let local_preview = ifx_resolve::resolve(doc, Role::LocalPreview)
        .unwrap_or_else(|| create_preview(doc, trigger, LOCAL_PREVIEW_ID));
    let remote_preview = ifx_resolve::resolve(doc, Role::RemotePreview)
        .unwrap_or_else(|| create_preview(doc, trigger, REMOTE_PREVIEW_ID));

    Some(UploadWorkflow {
        input,
        trigger,
        local_preview,
        remote_preview,
        phase: UploadPhase::Idle,
        pending: None,
    })
}

fn create_preview(doc: &mut Document, trigger: NodeId, id: &str) -> NodeId {
    let img = doc.create_element("img");
    doc.set_attribute(img, "id", id);
    doc.set_attribute(img, "alt", "");
    doc.set_style_property(img, "display", "none");
    if let Some(parent) = doc.parent(trigger).or_else(|| doc.root()) {
        doc.append_child(parent, img);
    }
    img
}

impl UploadWorkflow {
    pub fn input(&self) -> NodeId {
        self.input
    }

    pub fn trigger(&self) -> NodeId {
        self.trigger
    }

    pub fn local_preview(&self) -> NodeId {
        self.local_preview
    }

    pub fn remote_preview(&self) -> NodeId {
        self.remote_preview
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// A new file selection only stashes the payload and restarts the
    /// cycle. Nothing renders until the trigger is clicked.
    pub fn select_file(&mut self, filename: &str, bytes: Vec<u8>) {
        let content_type = sniff_content_type(&bytes);
        self.pending = Some(FilePayload {
            filename: filename.to_owned(),
            content_type: content_type.to_owned(),
            bytes,
        });
        self.phase = UploadPhase::FilePicked;
    }

    /// Trigger click: local preview first, then the round-trip, then the
    /// remote preview. Ignored outright while an upload is in flight, so a
    /// second click can never start an overlapping request.
    pub fn trigger_click<T: Transport>(
        &mut self,
        doc: &mut Document,
        client: &mut UploadClient<T>,
        notices: &mut NoticeLog,
    ) {
        if self.phase == UploadPhase::Uploading {
            tracing::debug!("upload already in flight; trigger ignored");
            return;
        }

        let Some(payload) = self.pending.clone() else {
            notices.error(MSG_NO_FILE);
            return;
        };

        render_preview(doc, self.local_preview, &payload.content_type, &payload.bytes);
        clear_preview(doc, self.remote_preview);
        // LocalPreviewReady is passed through synchronously; the POST starts
        // in the same click.
        self.phase = UploadPhase::LocalPreviewReady;
        self.phase = UploadPhase::Uploading;
        match client.upload(UPLOAD_ENDPOINT, &payload) {
            Ok(processed) => {
                let content_type = sniff_content_type(&processed);
                render_preview(doc, self.remote_preview, content_type, &processed);
                self.phase = UploadPhase::RemotePreviewReady;
                notices.success(MSG_UPLOAD_DONE);
            }
            Err(error) => {
                tracing::warn!(%error, "upload round-trip failed");
                self.phase = UploadPhase::Failed;
                notices.error(MSG_UPLOAD_FAILED);
            }
        }
    }

    #[cfg(test)]
    fn force_phase(&mut self, phase: UploadPhase) {
        self.phase = phase;
    }
}

fn render_preview(doc: &mut Document, preview: NodeId, content_type: &str, bytes: &[u8]) {
    doc.set_attribute(preview, "src", &data_url(content_type, bytes));
    doc.set_style_property(preview, "display", "block");
}

fn clear_preview(doc: &mut Document, preview: NodeId) {
    doc.remove_attribute(preview, "src");
    doc.set_style_property(preview, "display", "none");
}

/// Sniffs the image format from the bytes themselves; the filename is not
/// trusted. Unrecognized content falls back to the generic binary type.
fn sniff_content_type(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type(),
        Err(_) => "application/octet-stream",
    }
}

fn data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}
