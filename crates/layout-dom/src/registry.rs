use std::collections::HashMap;

use pagemirror_core_types::NodeId;

use crate::node::DomNode;

/// Node <-> id bindings.
///
/// `ids` is the identity side table: once a node is bound its id never
/// changes, and removal does not unbind it, so a node that comes back after
/// being detached keeps its id. `nodes` is the lookup by id, purged on
/// removal.
#[derive(Debug)]
pub struct IdRegistry<N> {
    next: NodeId,
    ids: HashMap<N, NodeId>,
    nodes: HashMap<NodeId, N>,
}

impl<N> Default for IdRegistry<N> {
    fn default() -> Self {
        Self {
            next: NodeId::FIRST,
            ids: HashMap::new(),
            nodes: HashMap::new(),
        }
    }
}

impl<N: DomNode> IdRegistry<N> {
    pub fn get(&self, node: &N) -> Option<NodeId> {
        self.ids.get(node).copied()
    }

    /// Existing id of `node`, or a freshly allocated one when `autogen` is set.
    pub fn get_id(&mut self, node: &N, autogen: bool) -> Option<NodeId> {
        match self.get(node) {
            Some(id) => Some(id),
            None if autogen => Some(self.assign(node)),
            None => None,
        }
    }

    fn assign(&mut self, node: &N) -> NodeId {
        let id = self.next;
        self.next = id.next();
        self.ids.insert(node.clone(), id);
        id
    }

    pub fn bind_node(&mut self, id: NodeId, node: N) {
        self.nodes.insert(id, node);
    }

    pub fn node(&self, id: NodeId) -> Option<&N> {
        self.nodes.get(&id)
    }

    pub fn unbind_node(&mut self, id: NodeId) -> Option<N> {
        self.nodes.remove(&id)
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn reset(&mut self) {
        self.next = NodeId::FIRST;
        self.ids.clear();
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryNode;

    #[test]
    fn ids_are_sequential_and_stable() {
        let mut registry = IdRegistry::default();
        let a = MemoryNode::element("DIV");
        let b = MemoryNode::element("DIV");

        assert_eq!(registry.get_id(&a, false), None);
        assert_eq!(registry.get_id(&a, true), Some(NodeId(1)));
        assert_eq!(registry.get_id(&b, true), Some(NodeId(2)));
        assert_eq!(registry.get_id(&a, true), Some(NodeId(1)));
        assert_eq!(registry.get_id(&a, false), Some(NodeId(1)));
    }

    #[test]
    fn unbinding_lookup_keeps_identity() {
        let mut registry = IdRegistry::default();
        let a = MemoryNode::element("DIV");
        let id = registry.get_id(&a, true).unwrap();
        registry.bind_node(id, a.clone());
        assert!(registry.has_node(id));

        registry.unbind_node(id);
        assert!(registry.node(id).is_none());
        assert_eq!(registry.get(&a), Some(id));
    }

    #[test]
    fn reset_restarts_allocation() {
        let mut registry = IdRegistry::default();
        let a = MemoryNode::element("DIV");
        registry.get_id(&a, true);
        registry.reset();
        assert_eq!(registry.get(&a), None);
        let b = MemoryNode::element("SPAN");
        assert_eq!(registry.get_id(&b, true), Some(NodeId(1)));
    }
}
