use pagemirror_core_types::{Attributes, Privacy};

/// Everything the classifier may look at for one node.
#[derive(Debug, Clone, Copy)]
pub struct PrivacyInput<'a> {
    pub tag: &'a str,
    pub attributes: Option<&'a Attributes>,
    /// Level inherited from the parent (or the session default).
    pub current: Privacy,
    /// Level registered for this node by a configured selector.
    pub explicit: Option<Privacy>,
    /// Whether the node belongs to a configured checksum group.
    pub checksum: bool,
    pub parent_tag: Option<&'a str>,
    /// Alpha selector of the parent record.
    pub parent_selector: Option<&'a str>,
}

impl<'a> PrivacyInput<'a> {
    pub fn new(tag: &'a str, current: Privacy) -> Self {
        Self {
            tag,
            attributes: None,
            current,
            explicit: None,
            checksum: false,
            parent_tag: None,
            parent_selector: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes
            .and_then(|attrs| attrs.get(name))
            .map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .map(|attrs| attrs.contains_key(name))
            .unwrap_or(false)
    }
}
