use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

/// Attribute name to value, ordered so that descriptors compare and serialise
/// deterministically.
pub type Attributes = BTreeMap<String, String>;

/// Stable identity of a tracked node. Allocation starts at 1 and ids are
/// never reused within a session.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const FIRST: NodeId = NodeId(1);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn next(self) -> NodeId {
        NodeId(self.0 + 1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content suppression level, from least to most strict.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Privacy {
    None,
    Sensitive,
    Text,
    TextImage,
    Exclude,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::None => "none",
            Privacy::Sensitive => "sensitive",
            Privacy::Text => "text",
            Privacy::TextImage => "text-image",
            Privacy::Exclude => "exclude",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of mutation that led to an `add`/`update` call.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Source {
    Discover,
    ChildListAdd,
    ChildListRemove,
    Attributes,
    CharacterData,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SelectorVariant {
    Alpha,
    Beta,
}

impl SelectorVariant {
    pub const ALL: [SelectorVariant; 2] = [SelectorVariant::Alpha, SelectorVariant::Beta];

    pub fn index(self) -> usize {
        match self {
            SelectorVariant::Alpha => 0,
            SelectorVariant::Beta => 1,
        }
    }
}
