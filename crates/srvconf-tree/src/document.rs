//! Arena-backed configuration document

use crate::error::Result;
use crate::node::{ConfigNode, NodeId, OuterMarkup};
use crate::xml;

/// A configuration document owning exactly one root element.
///
/// Every node lives in the document's arena; parents refer to children by
/// [`NodeId`]. Nodes are never removed, so ids stay valid for the life of the
/// document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<ConfigNode>,
    root: NodeId,
    prolog: Vec<OuterMarkup>,
    epilogue: Vec<OuterMarkup>,
    revision: u64,
}

impl Document {
    /// Create a document holding only an empty root element.
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![ConfigNode::element(root_tag, None)],
            root: NodeId(0),
            prolog: Vec::new(),
            epilogue: Vec::new(),
            revision: 0,
        }
    }

    pub(crate) fn from_parts(
        nodes: Vec<ConfigNode>,
        root: NodeId,
        prolog: Vec<OuterMarkup>,
        epilogue: Vec<OuterMarkup>,
    ) -> Self {
        Self {
            nodes,
            root,
            prolog,
            epilogue,
            revision: 0,
        }
    }

    /// Parse an XML configuration document.
    pub fn parse(source: &str) -> Result<Self> {
        xml::parse(source)
    }

    /// Serialize the document back to XML.
    pub fn render(&self) -> Result<String> {
        xml::render(self)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Comments, instructions and DOCTYPE preceding the root element.
    pub fn prolog(&self) -> &[OuterMarkup] {
        &self.prolog
    }

    /// Comments and instructions following the root element.
    pub fn epilogue(&self) -> &[OuterMarkup] {
        &self.epilogue
    }

    /// Number of effective mutations applied since the document was built.
    ///
    /// Writes that leave a value as it was do not count.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node(&self, id: NodeId) -> &ConfigNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut ConfigNode {
        &mut self.nodes[id.0]
    }

    pub fn tag(&self, id: NodeId) -> &str {
        self.node(id).tag()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attribute(name)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text()
    }

    /// Set an attribute on a node. Returns `true` if the document changed.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let changed = self.node_mut(id).set_attribute(name, value);
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Replace a node's text content. Returns `true` if the document changed.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        let changed = self.node_mut(id).set_text(Some(text.to_string()));
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Append a new, empty element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.push_node(ConfigNode::element(tag, Some(parent)));
        self.node_mut(parent).push_child(id);
        self.revision += 1;
        id
    }

    pub(crate) fn push_node(&mut self, node: ConfigNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// All children of a node, comments included.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// Direct element children of `parent` with the given tag, in order.
    pub fn child_elements(&self, parent: NodeId, tag: &str) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|&child| self.is_element_named(child, tag))
            .collect()
    }

    /// Elements with the given tag anywhere in the document.
    ///
    /// The root is visited first, then its descendants in document order.
    pub fn descendants(&self, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            if self.is_element_named(id, tag) {
                found.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }

        found
    }

    fn is_element_named(&self, id: NodeId, tag: &str) -> bool {
        let node = self.node(id);
        node.is_element() && node.tag() == tag
    }
}
