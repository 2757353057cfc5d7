//! Mutation scripts replayed by `pagemirror replay`.
//!
//! A script describes an initial document and a list of steps that mutate
//! it. Nodes are addressed by the `key` given in their spec.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub key: Option<String>,
    /// Element tag. Exactly one of `tag`, `text`, `comment` is expected.
    pub tag: Option<String>,
    pub text: Option<String>,
    pub comment: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<NodeSpec>,
    /// Children of an attached shadow root.
    pub shadow: Option<Vec<NodeSpec>>,
    /// Content document of an `iframe`.
    pub frame: Option<Box<NodeSpec>>,
    /// Frame content cannot be read.
    pub cross_origin: bool,
    /// Image still loading; a `load` step completes it.
    pub pending: bool,
}

impl NodeSpec {
    pub fn element(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            ..Self::default()
        }
    }

    pub fn keyed(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Step {
    Insert {
        parent: String,
        node: NodeSpec,
        #[serde(default)]
        before: Option<String>,
    },
    Remove {
        target: String,
    },
    Move {
        target: String,
        parent: String,
        #[serde(default)]
        before: Option<String>,
    },
    SetAttr {
        target: String,
        name: String,
        value: String,
    },
    RemoveAttr {
        target: String,
        name: String,
    },
    SetText {
        target: String,
        text: String,
    },
    /// Completes a pending image load.
    Load {
        target: String,
    },
    Drain,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Insert { .. } => "insert",
            Step::Remove { .. } => "remove",
            Step::Move { .. } => "move",
            Step::SetAttr { .. } => "set-attr",
            Step::RemoveAttr { .. } => "remove-attr",
            Step::SetText { .. } => "set-text",
            Step::Load { .. } => "load",
            Step::Drain => "drain",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    /// Children of the document node.
    pub document: Vec<NodeSpec>,
    pub steps: Vec<Step>,
}

impl ReplayScript {
    /// Parses YAML; JSON documents parse as well.
    pub fn parse(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Failed to parse replay script")
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}
