//! Collapsible navigation menu driven by a hamburger toggle.

use ifx_dom::Document;
use ifx_dom::NodeId;
use ifx_resolve::Role;

const OPEN_CLASS: &str = "open";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavToggle {
    toggle: NodeId,
    menu: NodeId,
}

pub fn bind_nav_toggle(doc: &Document) -> Option<NavToggle> {
    let toggle = ifx_resolve::resolve(doc, Role::NavToggle)?;
    let menu = ifx_resolve::resolve(doc, Role::NavMenu)?;
    Some(NavToggle { toggle, menu })
}

impl NavToggle {
    pub fn toggle(&self) -> NodeId {
        self.toggle
    }

    pub fn menu(&self) -> NodeId {
        self.menu
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.has_class(self.menu, OPEN_CLASS)
    }

    /// Flips the menu between open and collapsed.
    pub fn click(&self, doc: &mut Document) {
        if self.is_open(doc) {
            doc.remove_class(self.menu, OPEN_CLASS);
        } else {
            doc.add_class(self.menu, OPEN_CLASS);
        }
    }
}
