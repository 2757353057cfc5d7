//! Script replayer
//!
//! Builds the in-memory document described by a [`ReplayScript`] and plays
//! its steps, reporting every mutation to a [`LayoutDom`] the way a live
//! mutation observer would.

mod ports;

use std::collections::HashMap;

use layout_dom::{
    DomNode, LayoutConfig, LayoutDom, MemoryNode, MetricSnapshot, NodeKind, NodeValue, Ports,
    Source,
};
use pagemirror_core_types::SessionId;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::script::{NodeSpec, ReplayScript, Step};

pub use ports::{ScriptLoads, ScriptObservers};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("unknown node key `{0}`")]
    UnknownKey(String),
    #[error("node key `{0}` is used twice")]
    DuplicateKey(String),
    #[error("node spec needs a tag, text or comment")]
    EmptyNode,
    #[error("step {index} ({op}): {reason}")]
    InvalidStep {
        index: usize,
        op: &'static str,
        reason: String,
    },
}

pub type ReplayResult<T> = Result<T, ReplayError>;

/// Records drained after one step.
#[derive(Debug, Clone, Serialize)]
pub struct Changelist {
    /// Step that triggered the drain; `None` for discovery and the final flush.
    pub step: Option<usize>,
    pub op: String,
    pub records: Vec<NodeValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub session: SessionId,
    pub changelists: Vec<Changelist>,
    /// Session counters; cleared when metrics output is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricSnapshot>,
    pub unobserved_frames: usize,
}

pub struct Replayer {
    dom: LayoutDom<MemoryNode>,
    document: MemoryNode,
    keys: HashMap<String, MemoryNode>,
    shadows: HashMap<MemoryNode, MemoryNode>,
    loads: ScriptLoads,
    observers: ScriptObservers,
    changelists: Vec<Changelist>,
}

impl Replayer {
    pub fn new(config: LayoutConfig) -> Self {
        let loads = ScriptLoads::default();
        let observers = ScriptObservers::default();
        let ports = Ports::standard(config.hash_length)
            .with_loads(loads.clone())
            .with_observers(observers.clone());
        Self {
            dom: LayoutDom::new(config, ports),
            document: MemoryNode::document(),
            keys: HashMap::new(),
            shadows: HashMap::new(),
            loads,
            observers,
            changelists: Vec::new(),
        }
    }

    pub fn dom(&self) -> &LayoutDom<MemoryNode> {
        &self.dom
    }

    /// Node registered under `key`.
    pub fn node(&self, key: &str) -> ReplayResult<&MemoryNode> {
        self.keys
            .get(key)
            .ok_or_else(|| ReplayError::UnknownKey(key.to_string()))
    }

    pub fn run(mut self, script: &ReplayScript) -> ReplayResult<ReplayReport> {
        let document = self.document.clone();
        for spec in &script.document {
            let node = self.build(spec)?;
            document.append_child(&node);
        }
        self.dom.start(&document);
        self.observe_subtree(&document, Source::Discover);
        self.flush(None, "discover");
        info!(
            session = %self.dom.session_id(),
            steps = script.steps.len(),
            "replaying mutation script"
        );

        for (index, step) in script.steps.iter().enumerate() {
            debug!(index, op = step.name(), "replay step");
            self.apply(index, step)?;
        }
        self.flush(None, "final");

        let report = ReplayReport {
            session: self.dom.session_id().clone(),
            changelists: std::mem::take(&mut self.changelists),
            metrics: Some(self.dom.metrics()),
            unobserved_frames: self.observers.count(),
        };
        self.dom.stop();
        Ok(report)
    }

    fn apply(&mut self, index: usize, step: &Step) -> ReplayResult<()> {
        match step {
            Step::Insert {
                parent,
                node,
                before,
            } => {
                let parent = self.node(parent)?.clone();
                let before = self.optional(before.as_deref())?;
                let node = self.build(node)?;
                parent.insert_before(&node, before.as_ref());
                self.dom.parse(&parent, false);
                self.observe_subtree(&node, Source::ChildListAdd);
            }
            Step::Remove { target } => {
                let target = self.node(target)?.clone();
                if target.parent().is_none() {
                    return Err(invalid(index, step, "node is already detached"));
                }
                target.detach();
                self.observe(&target, Source::ChildListRemove);
            }
            Step::Move {
                target,
                parent,
                before,
            } => {
                let target = self.node(target)?.clone();
                let parent = self.node(parent)?.clone();
                if parent == target || target.descendants().contains(&parent) {
                    return Err(invalid(index, step, "cannot move a node into itself"));
                }
                let before = self.optional(before.as_deref())?;
                parent.insert_before(&target, before.as_ref());
                self.dom.parse(&parent, false);
                self.observe_subtree(&target, Source::ChildListAdd);
            }
            Step::SetAttr {
                target,
                name,
                value,
            } => {
                let target = self.node(target)?.clone();
                target.set_attribute(name, value);
                self.observe(&target, Source::Attributes);
            }
            Step::RemoveAttr { target, name } => {
                let target = self.node(target)?.clone();
                target.remove_attribute(name);
                self.observe(&target, Source::Attributes);
            }
            Step::SetText { target, text } => {
                let target = self.node(target)?.clone();
                if !matches!(target.kind(), NodeKind::Text | NodeKind::Comment) {
                    return Err(invalid(index, step, "target is not a text node"));
                }
                target.set_text(text);
                self.observe(&target, Source::CharacterData);
            }
            Step::Load { target } => {
                let target = self.node(target)?.clone();
                if !self.loads.complete(&target) {
                    return Err(invalid(index, step, "no pending load for node"));
                }
                self.observe(&target, Source::Attributes);
            }
            Step::Drain => self.flush(Some(index), step.name()),
        }
        Ok(())
    }

    fn optional(&self, key: Option<&str>) -> ReplayResult<Option<MemoryNode>> {
        key.map(|key| self.node(key).cloned()).transpose()
    }

    /// Creates the nodes of `spec`, registering keyed ones.
    fn build(&mut self, spec: &NodeSpec) -> ReplayResult<MemoryNode> {
        let node = match (&spec.tag, &spec.text, &spec.comment) {
            (Some(tag), _, _) => {
                let node = MemoryNode::element(tag);
                for (name, value) in &spec.attributes {
                    node.set_attribute(name, value);
                }
                node
            }
            (None, Some(text), _) => MemoryNode::text(text),
            (None, None, Some(comment)) => MemoryNode::comment(comment),
            (None, None, None) => return Err(ReplayError::EmptyNode),
        };
        if let Some(key) = &spec.key {
            if self.keys.insert(key.clone(), node.clone()).is_some() {
                return Err(ReplayError::DuplicateKey(key.clone()));
            }
        }
        if spec.pending {
            node.set_image_loaded(false);
        }
        for child in &spec.children {
            let child = self.build(child)?;
            node.append_child(&child);
        }
        if let Some(children) = &spec.shadow {
            let root = MemoryNode::shadow_root(&node);
            for child in children {
                let child = self.build(child)?;
                root.append_child(&child);
            }
            self.shadows.insert(node.clone(), root);
        }
        if spec.cross_origin {
            node.deny_content_access();
        } else if let Some(frame) = &spec.frame {
            let doc = MemoryNode::document();
            let content = self.build(frame)?;
            doc.append_child(&content);
            node.set_content_document(&doc);
        }
        Ok(node)
    }

    /// Reports `node` under its current parent. Shadow roots report their
    /// host and frame documents their frame element.
    fn observe(&mut self, node: &MemoryNode, source: Source) {
        let parent = match node.kind() {
            NodeKind::DocumentFragment => node.host(),
            NodeKind::Document => self.dom.iframe(node).cloned(),
            _ => node.parent(),
        };
        let info = node.info();
        if self.dom.id_of(node).is_some() {
            self.dom.update(node, parent.as_ref(), info, source);
        } else {
            self.dom.add(node, parent.as_ref(), info, source);
        }
    }

    /// Reports `root` and everything below it, descending into shadow roots
    /// and readable frames.
    fn observe_subtree(&mut self, root: &MemoryNode, source: Source) {
        let mut stack = vec![root.clone()];
        while let Some(node) = stack.pop() {
            self.observe(&node, source);
            for child in node.children().into_iter().rev() {
                stack.push(child);
            }
            if let Some(shadow) = self.shadows.get(&node) {
                stack.push(shadow.clone());
            }
            if node.is_frame() && self.dom.same_origin(&node) {
                if let Some(content) = self.dom.iframe_content(&node) {
                    stack.push(content.doc.clone());
                }
            }
        }
    }

    fn flush(&mut self, step: Option<usize>, op: &str) {
        let records = self.dom.updates();
        if records.is_empty() {
            return;
        }
        self.changelists.push(Changelist {
            step,
            op: op.to_string(),
            records,
        });
    }
}

fn invalid(index: usize, step: &Step, reason: &str) -> ReplayError {
    ReplayError::InvalidStep {
        index,
        op: step.name(),
        reason: reason.to_string(),
    }
}
