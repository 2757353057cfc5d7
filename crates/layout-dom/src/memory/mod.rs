//! In-memory document used by the CLI replayer and the tests.
//!
//! Nodes are shared handles (`Arc<RwLock<..>>`) compared by pointer, so the
//! tracker's side tables key on identity exactly like they would on a live
//! document.

mod query;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use pagemirror_core_types::Attributes;
use parking_lot::RwLock;

use crate::errors::{LayoutError, LayoutResult};
use crate::model::NodeInfo;
use crate::node::{DomNode, NodeKind};

pub use query::{SelectorList, Subject};

#[derive(Debug, Clone)]
enum FrameAccess {
    Empty,
    Document(MemoryNode),
    Denied,
}

struct Inner {
    kind: NodeKind,
    tag: String,
    attributes: Attributes,
    text: Option<String>,
    parent: Weak<RwLock<Inner>>,
    children: Vec<MemoryNode>,
    host: Weak<RwLock<Inner>>,
    frame: FrameAccess,
    image_loaded: bool,
}

#[derive(Clone)]
pub struct MemoryNode(Arc<RwLock<Inner>>);

impl MemoryNode {
    fn with_kind(kind: NodeKind, tag: String, text: Option<String>) -> Self {
        Self(Arc::new(RwLock::new(Inner {
            kind,
            tag,
            attributes: Attributes::new(),
            text,
            parent: Weak::new(),
            children: Vec::new(),
            host: Weak::new(),
            frame: FrameAccess::Empty,
            image_loaded: true,
        })))
    }

    pub fn document() -> Self {
        Self::with_kind(NodeKind::Document, String::new(), None)
    }

    pub fn doctype(name: &str) -> Self {
        Self::with_kind(NodeKind::DocumentType, name.to_string(), None)
    }

    pub fn element(tag: &str) -> Self {
        Self::with_kind(NodeKind::Element, tag.to_ascii_uppercase(), None)
    }

    pub fn element_with(tag: &str, attributes: &[(&str, &str)]) -> Self {
        let node = Self::element(tag);
        for (name, value) in attributes {
            node.set_attribute(name, value);
        }
        node
    }

    pub fn text(content: &str) -> Self {
        Self::with_kind(NodeKind::Text, String::new(), Some(content.to_string()))
    }

    pub fn comment(content: &str) -> Self {
        Self::with_kind(NodeKind::Comment, String::new(), Some(content.to_string()))
    }

    /// Creates a shadow root attached to `host`.
    pub fn shadow_root(host: &MemoryNode) -> Self {
        let root = Self::with_kind(NodeKind::DocumentFragment, String::new(), None);
        root.0.write().host = Arc::downgrade(&host.0);
        root
    }

    pub fn parent(&self) -> Option<MemoryNode> {
        self.0.read().parent.upgrade().map(MemoryNode)
    }

    pub fn children(&self) -> Vec<MemoryNode> {
        self.0.read().children.clone()
    }

    pub fn host(&self) -> Option<MemoryNode> {
        self.0.read().host.upgrade().map(MemoryNode)
    }

    pub fn append_child(&self, child: &MemoryNode) {
        self.insert_before(child, None);
    }

    /// Inserts `child` before `reference` (appends when `reference` is not a
    /// child). A child that already has a parent is moved.
    pub fn insert_before(&self, child: &MemoryNode, reference: Option<&MemoryNode>) {
        child.detach();
        {
            let mut inner = self.0.write();
            let index = reference
                .and_then(|r| inner.children.iter().position(|c| c == r))
                .unwrap_or(inner.children.len());
            inner.children.insert(index, child.clone());
        }
        child.0.write().parent = Arc::downgrade(&self.0);
    }

    /// Removes this node from its parent.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.0.write().children.retain(|c| c != self);
        }
        self.0.write().parent = Weak::new();
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.read().attributes.get(name).cloned()
    }

    pub fn remove_attribute(&self, name: &str) {
        self.0.write().attributes.remove(name);
    }

    pub fn set_text(&self, content: &str) {
        self.0.write().text = Some(content.to_string());
    }

    pub fn set_content_document(&self, doc: &MemoryNode) {
        self.0.write().frame = FrameAccess::Document(doc.clone());
    }

    /// Makes the frame's content unreadable, as for a cross-origin frame.
    pub fn deny_content_access(&self) {
        self.0.write().frame = FrameAccess::Denied;
    }

    pub fn set_image_loaded(&self, loaded: bool) {
        self.0.write().image_loaded = loaded;
    }

    /// Descriptor a mutation source would report for this node.
    pub fn info(&self) -> NodeInfo {
        let inner = self.0.read();
        match inner.kind {
            NodeKind::Element => {
                NodeInfo::new(inner.tag.clone()).with_attributes(inner.attributes.clone())
            }
            NodeKind::Text | NodeKind::Comment => {
                let mut info = NodeInfo::new(inner.kind.pseudo_tag().unwrap_or_default());
                info.value = inner.text.clone();
                info
            }
            NodeKind::DocumentType => {
                let mut info = NodeInfo::new(inner.kind.pseudo_tag().unwrap_or_default());
                info.value = Some(inner.tag.clone());
                info
            }
            NodeKind::Document | NodeKind::DocumentFragment => {
                NodeInfo::new(inner.kind.pseudo_tag().unwrap_or_default())
            }
        }
    }

    /// Pre-order walk of the subtree below this node.
    pub fn descendants(&self) -> Vec<MemoryNode> {
        let mut output = Vec::new();
        let mut stack: Vec<MemoryNode> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            output.push(node);
        }
        output
    }

    fn collect_text(&self, out: &mut String) {
        let inner = self.0.read();
        match inner.kind {
            NodeKind::Text => {
                if let Some(text) = &inner.text {
                    out.push_str(text);
                }
            }
            NodeKind::Element | NodeKind::DocumentFragment => {
                for child in &inner.children {
                    child.collect_text(out);
                }
            }
            _ => {}
        }
    }
}

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MemoryNode {}

impl Hash for MemoryNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.read();
        f.debug_struct("MemoryNode")
            .field("kind", &inner.kind)
            .field("tag", &inner.tag)
            .field("children", &inner.children.len())
            .finish()
    }
}

impl Subject for MemoryNode {
    fn tag(&self) -> Option<String> {
        self.tag_name()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.attribute(name)
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent()
            .filter(|parent| parent.kind() == NodeKind::Element)
    }
}

impl DomNode for MemoryNode {
    fn kind(&self) -> NodeKind {
        self.0.read().kind
    }

    fn tag_name(&self) -> Option<String> {
        let inner = self.0.read();
        (inner.kind == NodeKind::Element).then(|| inner.tag.clone())
    }

    fn previous_sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        let siblings = parent.0.read();
        let index = siblings.children.iter().position(|c| c == self)?;
        index.checked_sub(1).map(|i| siblings.children[i].clone())
    }

    fn is_shadow_root(&self) -> bool {
        let inner = self.0.read();
        inner.kind == NodeKind::DocumentFragment && inner.host.upgrade().is_some()
    }

    fn text_content(&self) -> Option<String> {
        match self.kind() {
            NodeKind::Document | NodeKind::DocumentType => None,
            NodeKind::Text | NodeKind::Comment => self.0.read().text.clone(),
            NodeKind::Element | NodeKind::DocumentFragment => {
                let mut out = String::new();
                self.collect_text(&mut out);
                Some(out)
            }
        }
    }

    fn query_all(&self, selector: &str) -> LayoutResult<Vec<Self>> {
        if !self.supports_query() {
            return Err(LayoutError::Unsupported("query on a leaf node"));
        }
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants()
            .into_iter()
            .filter(|node| node.kind() == NodeKind::Element && list.matches(node))
            .collect())
    }

    fn content_document(&self) -> LayoutResult<Option<Self>> {
        match &self.0.read().frame {
            FrameAccess::Empty => Ok(None),
            FrameAccess::Document(doc) => Ok(Some(doc.clone())),
            FrameAccess::Denied => Err(LayoutError::CrossOrigin),
        }
    }

    fn image_loaded(&self) -> bool {
        self.0.read().image_loaded
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .write()
            .attributes
            .insert(name.to_string(), value.to_string());
    }
}
