#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use layout_dom::{
    DomNode, LayoutConfig, LayoutDom, LoadPort, MemoryNode, NodeId, ObserverPort, Ports, Source,
};

pub fn session() -> LayoutDom<MemoryNode> {
    LayoutDom::with_config(LayoutConfig::default())
}

/// Adds `root` and its whole subtree the way an initial discovery pass would.
pub fn discover(dom: &mut LayoutDom<MemoryNode>, root: &MemoryNode) {
    dom.add(root, root.parent().as_ref(), root.info(), Source::Discover);
    for node in root.descendants() {
        dom.add(&node, node.parent().as_ref(), node.info(), Source::Discover);
    }
}

/// Reports `node` under its current parent, as a child-list mutation would.
pub fn moved(dom: &mut LayoutDom<MemoryNode>, node: &MemoryNode, source: Source) {
    dom.update(node, node.parent().as_ref(), node.info(), source);
}

pub fn id(dom: &LayoutDom<MemoryNode>, node: &MemoryNode) -> NodeId {
    dom.id_of(node).expect("node is tracked")
}

pub fn children(dom: &LayoutDom<MemoryNode>, node: &MemoryNode) -> Vec<NodeId> {
    dom.get(node).expect("node has a record").children.clone()
}

type PendingLoad = (MemoryNode, Box<dyn FnOnce()>);

/// Load port that holds callbacks until the test fires them.
#[derive(Clone, Default)]
pub struct LoadRecorder {
    pending: Rc<RefCell<Vec<PendingLoad>>>,
}

impl LoadRecorder {
    pub fn bound(&self) -> Vec<MemoryNode> {
        self.pending
            .borrow()
            .iter()
            .map(|(node, _)| node.clone())
            .collect()
    }

    pub fn fire_all(&self) {
        let pending: Vec<PendingLoad> = self.pending.borrow_mut().drain(..).collect();
        for (node, callback) in pending {
            node.set_image_loaded(true);
            callback();
        }
    }
}

impl LoadPort<MemoryNode> for LoadRecorder {
    fn bind_load(&mut self, node: &MemoryNode, callback: Box<dyn FnOnce()>) {
        self.pending.borrow_mut().push((node.clone(), callback));
    }
}

/// Observer port that records every frame it is asked to stop observing.
#[derive(Clone, Default)]
pub struct ObserverRecorder {
    removed: Rc<RefCell<Vec<MemoryNode>>>,
}

impl ObserverRecorder {
    pub fn removed(&self) -> Vec<MemoryNode> {
        self.removed.borrow().clone()
    }
}

impl ObserverPort<MemoryNode> for ObserverRecorder {
    fn remove_observer(&mut self, node: &MemoryNode) {
        assert!(node.is_frame());
        self.removed.borrow_mut().push(node.clone());
    }
}

pub fn session_with(loads: LoadRecorder, observers: ObserverRecorder) -> LayoutDom<MemoryNode> {
    let config = LayoutConfig::default();
    let ports = Ports::standard(config.hash_length)
        .with_loads(loads)
        .with_observers(observers);
    LayoutDom::new(config, ports)
}
