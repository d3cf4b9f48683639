//! Node records stored in a document arena

/// Handle to a node inside a [`crate::Document`].
///
/// Ids are only meaningful for the document that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in its document's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A named configuration element.
    Element,
    /// An operator comment, kept so it survives a load/save cycle.
    Comment,
    /// A processing instruction; the text holds target and content.
    Instruction,
}

/// Markup before or after the root element.
///
/// The XML declaration is not kept; rendering always writes its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OuterMarkup {
    Comment(String),
    Instruction(String),
    /// Everything between `<!DOCTYPE` and the closing `>`.
    DocType(String),
}

/// A single node of the configuration tree.
///
/// Attributes keep their insertion order and never hold the same key twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNode {
    kind: NodeKind,
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<NodeId>,
    text: Option<String>,
    parent: Option<NodeId>,
}

impl ConfigNode {
    pub(crate) fn element(tag: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
            parent,
        }
    }

    pub(crate) fn comment(text: impl Into<String>, parent: NodeId) -> Self {
        Self::leaf(NodeKind::Comment, text.into(), parent)
    }

    pub(crate) fn instruction(text: impl Into<String>, parent: NodeId) -> Self {
        Self::leaf(NodeKind::Instruction, text.into(), parent)
    }

    fn leaf(kind: NodeKind, text: String, parent: NodeId) -> Self {
        Self {
            kind,
            tag: String::new(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: Some(text),
            parent: Some(parent),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Element name. Empty for comments and instructions.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Text content, or the body of a comment or instruction.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Set an attribute, replacing the value in place when the key exists.
    ///
    /// Returns `true` if the stored value changed.
    pub(crate) fn set_attribute(&mut self, name: &str, value: &str) -> bool {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) if existing == value => false,
            Some((_, existing)) => {
                *existing = value.to_string();
                true
            }
            None => {
                self.attributes.push((name.to_string(), value.to_string()));
                true
            }
        }
    }

    pub(crate) fn set_text(&mut self, text: Option<String>) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text;
        true
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }
}
