use serde::{Deserialize, Serialize};

/// Attribute that forces text and image masking on an element.
pub const MASK_ATTR: &str = "data-mirror-mask";
/// Attribute that lifts masking from an element.
pub const UNMASK_ATTR: &str = "data-mirror-unmask";

pub const DEFAULT_MASK_TAGS: &[&str] = &["INPUT", "SELECT", "TEXTAREA"];
pub const DEFAULT_MASK_EXCLUDE: &[&str] =
    &["password", "secret", "pass", "social", "ssn", "code", "hidden"];
pub const DEFAULT_MASK_DISABLE: &[&str] =
    &["radio", "checkbox", "range", "button", "reset", "submit"];
pub const DEFAULT_MASK_TEXT: &[&str] = &["address", "password", "contact"];

/// Token lists consulted by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MaskPolicy {
    /// Tags whose user input is always masked (upper-case).
    pub mask_tags: Vec<String>,
    /// Substrings of a masked control's attribute values that drop it entirely.
    pub mask_exclude: Vec<String>,
    /// `type` values of `INPUT` controls that keep their inherited level.
    pub mask_disable: Vec<String>,
    /// Class-name substrings that escalate sensitive content to text masking.
    pub mask_text: Vec<String>,
    /// Selector substrings whose text children are always captured.
    pub override_tokens: Vec<String>,
}

impl Default for MaskPolicy {
    fn default() -> Self {
        Self {
            mask_tags: to_owned(DEFAULT_MASK_TAGS),
            mask_exclude: to_owned(DEFAULT_MASK_EXCLUDE),
            mask_disable: to_owned(DEFAULT_MASK_DISABLE),
            mask_text: to_owned(DEFAULT_MASK_TEXT),
            override_tokens: Vec::new(),
        }
    }
}

impl MaskPolicy {
    pub fn is_mask_tag(&self, tag: &str) -> bool {
        self.mask_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_mask_disabled(&self, input_type: &str) -> bool {
        self.mask_disable
            .iter()
            .any(|t| t.eq_ignore_ascii_case(input_type))
    }

    pub fn has_exclude_token(&self, haystack: &str) -> bool {
        contains_any(haystack, &self.mask_exclude)
    }

    pub fn has_mask_text_token(&self, class: &str) -> bool {
        contains_any(class, &self.mask_text)
    }

    pub fn has_override_token(&self, selector: &str) -> bool {
        contains_any(selector, &self.override_tokens)
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| !needle.is_empty() && haystack.contains(needle.as_str()))
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
