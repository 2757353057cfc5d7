use pagemirror_core_types::{Attributes, NodeId, Privacy, SelectorVariant};
use serde::{Deserialize, Serialize};

/// One selector (or hash) per [`SelectorVariant`], indexed by
/// [`SelectorVariant::index`].
pub type SelectorPair = [Option<String>; 2];

/// Descriptor the mutation source reports for a node.
///
/// `attributes` and `value` are optional so that a partial descriptor only
/// overwrites the fields it carries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl NodeInfo {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: None,
            value: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(name))
            .map(String::as_str)
    }

    /// Copies every field present in `incoming` that differs from the stored
    /// one. Attribute maps are compared key by key in both directions.
    /// Returns whether anything changed.
    pub fn merge(&mut self, incoming: NodeInfo) -> bool {
        let mut changed = false;
        if self.tag != incoming.tag {
            self.tag = incoming.tag;
            changed = true;
        }
        if let Some(attributes) = incoming.attributes {
            if !attributes_equal(self.attributes.as_ref(), &attributes) {
                self.attributes = Some(attributes);
                changed = true;
            }
        }
        if let Some(value) = incoming.value {
            if self.value.as_deref() != Some(value.as_str()) {
                self.value = Some(value);
                changed = true;
            }
        }
        changed
    }
}

fn attributes_equal(current: Option<&Attributes>, incoming: &Attributes) -> bool {
    let Some(current) = current else {
        return false;
    };
    current
        .iter()
        .all(|(key, value)| incoming.get(key) == Some(value))
        && incoming
            .iter()
            .all(|(key, value)| current.get(key) == Some(value))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMeta {
    pub active: bool,
    pub suspend: bool,
    pub privacy: Privacy,
    /// 1-based ordinal among preceding same-tag siblings.
    pub position: Option<u32>,
    /// Checksum group inherited from the closest configured ancestor.
    pub fraud: Option<u32>,
    /// Box size, only tracked for masked images.
    pub size: Option<Vec<u32>>,
}

/// Shadow record of one tracked node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeValue {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub previous: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeInfo,
    pub selector: Option<SelectorPair>,
    pub hash: Option<SelectorPair>,
    pub region: Option<NodeId>,
    pub metadata: NodeMeta,
}

impl NodeValue {
    pub fn selector_of(&self, variant: SelectorVariant) -> Option<&str> {
        self.selector
            .as_ref()
            .and_then(|pair| pair[variant.index()].as_deref())
    }

    pub fn hash_of(&self, variant: SelectorVariant) -> Option<&str> {
        self.hash
            .as_ref()
            .and_then(|pair| pair[variant.index()].as_deref())
    }
}

/// Input handed to the selector collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorInput {
    pub id: NodeId,
    pub tag: String,
    /// Selectors of the parent record.
    pub prefix: Option<SelectorPair>,
    pub position: u32,
    pub attributes: Option<Attributes>,
}

impl SelectorInput {
    pub fn prefix_of(&self, variant: SelectorVariant) -> Option<&str> {
        self.prefix
            .as_ref()
            .and_then(|pair| pair[variant.index()].as_deref())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(name))
            .map(String::as_str)
    }
}

/// Content of a same-origin frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameContent<N> {
    pub doc: N,
}
