//! DOM tree data structures.

/// ID used to address nodes in the DOM arena.
pub type NodeId = usize;

const FOCUSABLE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea"];

/// Node payload: an element with attributes, or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

/// Single node in the DOM arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Mutable document model backing the page runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    focused: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        if id < self.nodes.len() {
            self.root = Some(id);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_owned()))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent >= self.nodes.len() || child >= self.nodes.len() || parent == child {
            return;
        }

        self.nodes[child].parent = Some(parent);
        if !self.nodes[parent].children.contains(&child) {
            self.nodes[parent].children.push(child);
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id).map(|node| &node.kind),
            Some(NodeKind::Element { .. })
        )
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id).map(|node| &node.kind) {
            Some(NodeKind::Element { tag, .. }) => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.nodes.get(id).map(|node| &node.kind) {
            Some(NodeKind::Element { attributes, .. }) => attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let normalized = name.to_ascii_lowercase();
        if let Some(NodeKind::Element { attributes, .. }) =
            self.nodes.get_mut(id).map(|node| &mut node.kind)
        {
            if let Some(entry) = attributes.iter_mut().find(|(key, _)| *key == normalized) {
                entry.1 = value.to_owned();
            } else {
                attributes.push((normalized, value.to_owned()));
            }
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(NodeKind::Element { attributes, .. }) =
            self.nodes.get_mut(id).map(|node| &mut node.kind)
        {
            attributes.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        }
    }

    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, "id")
    }

    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|id| self.attribute(*id, "id") == Some(value))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .map(|list| list.split_whitespace().any(|entry| entry == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }

        let merged = match self.attribute(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.set_attribute(id, "class", &merged);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(existing) = self.attribute(id, "class") else {
            return;
        };

        let remaining = existing
            .split_whitespace()
            .filter(|entry| *entry != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(id, "class", &remaining);
    }

    /// Reads one property out of the element's inline `style` attribute.
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.attribute(id, "style")?;
        for declaration in style.split(';') {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case(property) {
                return Some(value.trim().to_owned());
            }
        }

        None
    }

    /// Rewrites the inline `style` attribute with the property set to `value`.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        let mut declarations: Vec<(String, String)> = Vec::new();
        if let Some(style) = self.attribute(id, "style") {
            for declaration in style.split(';') {
                if let Some((name, old_value)) = declaration.split_once(':') {
                    let name = name.trim().to_ascii_lowercase();
                    if !name.is_empty() && name != property.to_ascii_lowercase() {
                        declarations.push((name, old_value.trim().to_owned()));
                    }
                }
            }
        }
        declarations.push((property.to_ascii_lowercase(), value.trim().to_owned()));

        let rendered = declarations
            .iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect::<Vec<_>>()
            .join(";");
        self.set_attribute(id, "style", &rendered);
    }

    /// Visibility derived from the element's own display state.
    pub fn is_displayed(&self, id: NodeId) -> bool {
        self.style_property(id, "display")
            .map(|value| !value.eq_ignore_ascii_case("none"))
            .unwrap_or(true)
    }

    /// Pre-order walk of the subtree rooted at `id`, elements only,
    /// excluding `id` itself.
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(id)
            .map(|node| node.children.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(current) = stack.pop() {
            if self.is_element(current) {
                out.push(current);
            }
            if let Some(node) = self.nodes.get(current) {
                for child in node.children.iter().rev() {
                    stack.push(*child);
                }
            }
        }

        out
    }

    /// All elements in document order, root included.
    pub fn elements(&self) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return Vec::new();
        };

        let mut out = Vec::new();
        if self.is_element(root) {
            out.push(root);
        }
        out.extend(self.descendant_elements(root));
        out
    }

    /// Concatenated descendant text with whitespace collapsed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        self.collect_text(id, &mut parts);
        parts
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn collect_text(&self, id: NodeId, out: &mut Vec<String>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };

        if let NodeKind::Text(text) = &node.kind {
            out.push(text.clone());
        }

        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// Replaces the subtree below `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if id >= self.nodes.len() {
            return;
        }

        self.nodes[id].children.clear();
        let child = self.create_text(text);
        self.append_child(id, child);
    }

    pub fn focus(&mut self, id: NodeId) {
        if id < self.nodes.len() {
            self.focused = Some(id);
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn is_focusable(&self, id: NodeId) -> bool {
        let Some(tag) = self.tag(id) else {
            return false;
        };

        FOCUSABLE_TAGS.contains(&tag) && self.attribute(id, "disabled").is_none()
    }
}
