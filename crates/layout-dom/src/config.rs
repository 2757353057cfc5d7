use layout_privacy::MaskPolicy;
use serde::{Deserialize, Serialize};

use crate::ports::DEFAULT_HASH_LENGTH;

/// Checksum group applied to every node matching `selector`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecksumRule {
    pub group: u32,
    pub selector: String,
}

/// Region label applied to every node matching `selector`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionRule {
    pub label: String,
    pub selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    pub masking: MaskPolicy,
    /// Selectors whose matches are masked (text and images).
    pub mask: Vec<String>,
    /// Selectors whose matches are unmasked. Entries containing `!` are
    /// override tokens: text under a parent whose selector contains the token
    /// is captured.
    pub unmask: Vec<String>,
    pub checksum: Vec<ChecksumRule>,
    pub regions: Vec<RegionRule>,
    /// Mask sensitive content by default instead of masking everything.
    pub content: bool,
    pub lean: bool,
    pub lite: bool,
    pub hash_length: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            masking: MaskPolicy::default(),
            mask: Vec::new(),
            unmask: Vec::new(),
            checksum: Vec::new(),
            regions: Vec::new(),
            content: true,
            lean: false,
            lite: false,
            hash_length: DEFAULT_HASH_LENGTH,
        }
    }
}

impl LayoutConfig {
    /// Lean and lite together disable change tracking.
    pub fn low_fidelity(&self) -> bool {
        self.lean && self.lite
    }
}
