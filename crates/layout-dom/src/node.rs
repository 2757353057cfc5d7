//! Handle abstraction over the observed document.
//!
//! The tracker never owns the document. It holds cloned handles keyed by
//! identity (`Eq + Hash` must compare the underlying node, not its content)
//! and drops them only when a removal purges them.

use std::hash::Hash;

use crate::errors::LayoutResult;

pub const IFRAME_TAG: &str = "IFRAME";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Document,
    DocumentType,
    /// Shadow roots and detached fragments.
    DocumentFragment,
}

impl NodeKind {
    /// Pseudo tag used in descriptors for non-element nodes.
    pub fn pseudo_tag(&self) -> Option<&'static str> {
        match self {
            NodeKind::Element => None,
            NodeKind::Text => Some("*T"),
            NodeKind::Comment => Some("*C"),
            NodeKind::Document => Some("*D"),
            NodeKind::DocumentType => Some("*M"),
            NodeKind::DocumentFragment => Some("*S"),
        }
    }
}

pub trait DomNode: Clone + Eq + Hash + 'static {
    fn kind(&self) -> NodeKind;

    /// Upper-case tag name for elements, `None` otherwise.
    fn tag_name(&self) -> Option<String>;

    fn previous_sibling(&self) -> Option<Self>;

    /// Fragment attached to a host element.
    fn is_shadow_root(&self) -> bool;

    fn text_content(&self) -> Option<String>;

    /// All descendants matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> LayoutResult<Vec<Self>>;

    /// Document of a frame element. `Err` when the frame cannot be read.
    fn content_document(&self) -> LayoutResult<Option<Self>>;

    /// Whether an image element has finished loading with a known size.
    fn image_loaded(&self) -> bool {
        true
    }

    fn set_attribute(&self, name: &str, value: &str);

    fn supports_query(&self) -> bool {
        matches!(
            self.kind(),
            NodeKind::Element | NodeKind::Document | NodeKind::DocumentFragment
        )
    }

    fn is_frame(&self) -> bool {
        self.kind() == NodeKind::Element
            && self
                .tag_name()
                .map(|tag| tag.eq_ignore_ascii_case(IFRAME_TAG))
                .unwrap_or(false)
    }
}
