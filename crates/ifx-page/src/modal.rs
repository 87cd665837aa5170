//! Modal dialog: open and close triggers, escape handling, focus movement.

use ifx_dom::Document;
use ifx_dom::NodeId;
use ifx_resolve::GroupRole;
use ifx_resolve::Role;

#[derive(Debug)]
pub struct ModalController {
    modal: NodeId,
    open_triggers: Vec<NodeId>,
    close_triggers: Vec<NodeId>,
    restore_focus: Option<NodeId>,
}

/// Binds the page's modal and normalizes it to the closed state.
pub fn bind_modal(doc: &mut Document) -> Option<ModalController> {
    let modal = ifx_resolve::resolve(doc, Role::Modal)?;
    let open_triggers = ifx_resolve::resolve_all(doc, GroupRole::ModalOpenTrigger);
    let close_triggers = ifx_resolve::resolve_all(doc, GroupRole::ModalCloseTrigger);

    doc.set_style_property(modal, "display", "none");
    doc.set_attribute(modal, "aria-hidden", "true");

    Some(ModalController {
        modal,
        open_triggers,
        close_triggers,
        restore_focus: None,
    })
}

impl ModalController {
    pub fn modal(&self) -> NodeId {
        self.modal
    }

    pub fn open_triggers(&self) -> &[NodeId] {
        &self.open_triggers
    }

    pub fn close_triggers(&self) -> &[NodeId] {
        &self.close_triggers
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.is_displayed(self.modal)
    }

    /// Opens the dialog and moves focus inside it. Opening an already open
    /// dialog changes nothing.
    pub fn open(&mut self, doc: &mut Document) {
        if self.is_open(doc) {
            return;
        }

        self.restore_focus = doc.focused();
        doc.set_style_property(self.modal, "display", "block");
        doc.set_attribute(self.modal, "aria-hidden", "false");

        let first_focusable = doc
            .descendant_elements(self.modal)
            .into_iter()
            .find(|id| doc.is_focusable(*id));
        if let Some(target) = first_focusable {
            doc.focus(target);
        }
    }

    /// Closes the dialog and hands focus back to whatever held it before.
    pub fn close(&mut self, doc: &mut Document) {
        if !self.is_open(doc) {
            return;
        }

        doc.set_style_property(self.modal, "display", "none");
        doc.set_attribute(self.modal, "aria-hidden", "true");

        if let Some(previous) = self.restore_focus.take() {
            doc.focus(previous);
        }
    }

    /// Escape closes the dialog when it is open; otherwise nothing happens.
    pub fn press_escape(&mut self, doc: &mut Document) {
        if self.is_open(doc) {
            self.close(doc);
        }
    }
}
