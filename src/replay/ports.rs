use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use layout_dom::{LoadPort, MemoryNode, ObserverPort};
use tracing::{debug, warn};

type Callback = Box<dyn FnOnce()>;

/// Holds image-load callbacks until a `load` step completes the image.
#[derive(Clone, Default)]
pub struct ScriptLoads {
    pending: Rc<RefCell<HashMap<MemoryNode, Callback>>>,
}

impl ScriptLoads {
    /// Marks `node` loaded and runs its callback. Returns whether a load was
    /// pending.
    pub fn complete(&self, node: &MemoryNode) -> bool {
        let callback = self.pending.borrow_mut().remove(node);
        node.set_image_loaded(true);
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl LoadPort<MemoryNode> for ScriptLoads {
    fn bind_load(&mut self, node: &MemoryNode, callback: Callback) {
        if self
            .pending
            .borrow_mut()
            .insert(node.clone(), callback)
            .is_some()
        {
            warn!("image load rebound before completion");
        }
    }
}

/// Counts frames whose nested observation was torn down.
#[derive(Clone, Default)]
pub struct ScriptObservers {
    removed: Rc<RefCell<usize>>,
}

impl ScriptObservers {
    pub fn count(&self) -> usize {
        *self.removed.borrow()
    }
}

impl ObserverPort<MemoryNode> for ScriptObservers {
    fn remove_observer(&mut self, node: &MemoryNode) {
        *self.removed.borrow_mut() += 1;
        debug!(?node, "stopped observing frame");
    }
}
