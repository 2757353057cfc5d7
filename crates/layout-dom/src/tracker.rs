use pagemirror_core_types::{NodeId, Source};

/// Ordered queue of ids changed since the last drain.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    queue: Vec<NodeId>,
    muted: bool,
}

impl ChangeTracker {
    /// A muted tracker ignores every change (low-fidelity capture).
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn track(&mut self, id: NodeId, source: Source, changed: bool, parent_changed: bool) {
        if self.muted {
            return;
        }
        match self.queue.iter().position(|queued| *queued == id) {
            // A node moved under a parent discovered after it must be
            // replayed after that parent.
            Some(index) if source == Source::ChildListAdd && parent_changed => {
                self.queue.remove(index);
                self.queue.push(id);
            }
            None if changed => self.queue.push(id),
            _ => {}
        }
    }

    pub fn drain(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.queue)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.queue.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
