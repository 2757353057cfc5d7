use std::collections::HashMap;

use crate::model::FrameContent;
use crate::node::{DomNode, NodeKind};

/// Links between same-origin frame elements and their documents.
#[derive(Debug)]
pub struct FrameTracker<N> {
    hosts: HashMap<N, N>,
    contents: HashMap<N, FrameContent<N>>,
}

impl<N> Default for FrameTracker<N> {
    fn default() -> Self {
        Self {
            hosts: HashMap::new(),
            contents: HashMap::new(),
        }
    }
}

impl<N: DomNode> FrameTracker<N> {
    pub fn register(&mut self, frame: &N, doc: N) {
        self.hosts.insert(doc.clone(), frame.clone());
        self.contents.insert(frame.clone(), FrameContent { doc });
    }

    /// Frame element hosting `doc`.
    pub fn host(&self, doc: &N) -> Option<&N> {
        if doc.kind() != NodeKind::Document {
            return None;
        }
        self.hosts.get(doc)
    }

    pub fn content(&self, frame: &N) -> Option<&FrameContent<N>> {
        self.contents.get(frame)
    }

    pub fn remove(&mut self, frame: &N, doc: &N) {
        self.contents.remove(frame);
        self.hosts.remove(doc);
    }

    pub fn clear(&mut self) {
        self.hosts.clear();
        self.contents.clear();
    }
}
