use std::collections::HashMap;

use layout_privacy::short_hash;
use pagemirror_core_types::SelectorVariant;
use tracing::trace;

use crate::model::SelectorInput;
use crate::node::DomNode;
use crate::selector::StructuralSelector;

pub const DEFAULT_HASH_LENGTH: usize = 8;

/// Builds selector strings for a node descriptor.
pub trait SelectorPort {
    fn get(&self, input: &SelectorInput, variant: SelectorVariant) -> Option<String>;

    fn reset(&mut self) {}
}

pub trait RegionPort<N> {
    fn exists(&self, node: &N) -> bool;
    fn observe(&mut self, node: &N, label: &str);

    fn reset(&mut self) {}
}

/// One-way, deterministic hashing of selector strings.
pub trait HashPort {
    fn hash(&self, input: &str) -> String;
}

/// Binds a one-shot callback to the load event of an image node.
pub trait LoadPort<N> {
    fn bind_load(&mut self, node: &N, callback: Box<dyn FnOnce()>);
}

/// Controls nested mutation observation (frames).
pub trait ObserverPort<N> {
    fn remove_observer(&mut self, node: &N);
}

/// Collaborators a session delegates to.
pub struct Ports<N> {
    pub selector: Box<dyn SelectorPort>,
    pub regions: Box<dyn RegionPort<N>>,
    pub hasher: Box<dyn HashPort>,
    pub loads: Box<dyn LoadPort<N>>,
    pub observers: Box<dyn ObserverPort<N>>,
}

impl<N: DomNode> Ports<N> {
    pub fn standard(hash_length: usize) -> Self {
        Self {
            selector: Box::new(StructuralSelector),
            regions: Box::new(RegionSet::default()),
            hasher: Box::new(ShortHasher::new(hash_length)),
            loads: Box::new(NoopLoads),
            observers: Box::new(NoopObservers),
        }
    }

    pub fn with_regions(mut self, regions: impl RegionPort<N> + 'static) -> Self {
        self.regions = Box::new(regions);
        self
    }

    pub fn with_loads(mut self, loads: impl LoadPort<N> + 'static) -> Self {
        self.loads = Box::new(loads);
        self
    }

    pub fn with_observers(mut self, observers: impl ObserverPort<N> + 'static) -> Self {
        self.observers = Box::new(observers);
        self
    }

    pub fn with_selector(mut self, selector: impl SelectorPort + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn with_hasher(mut self, hasher: impl HashPort + 'static) -> Self {
        self.hasher = Box::new(hasher);
        self
    }
}

impl<N: DomNode> Default for Ports<N> {
    fn default() -> Self {
        Self::standard(DEFAULT_HASH_LENGTH)
    }
}

#[derive(Debug, Clone)]
pub struct ShortHasher {
    length: usize,
}

impl ShortHasher {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for ShortHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_LENGTH)
    }
}

impl HashPort for ShortHasher {
    fn hash(&self, input: &str) -> String {
        short_hash(input, self.length)
    }
}

/// In-process region registry: remembers the label of every observed node.
#[derive(Debug)]
pub struct RegionSet<N> {
    labels: HashMap<N, String>,
}

impl<N> Default for RegionSet<N> {
    fn default() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }
}

impl<N: DomNode> RegionSet<N> {
    pub fn label(&self, node: &N) -> Option<&str> {
        self.labels.get(node).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<N: DomNode> RegionPort<N> for RegionSet<N> {
    fn exists(&self, node: &N) -> bool {
        self.labels.contains_key(node)
    }

    fn observe(&mut self, node: &N, label: &str) {
        self.labels.insert(node.clone(), label.to_string());
    }

    fn reset(&mut self) {
        self.labels.clear();
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLoads;

impl<N> LoadPort<N> for NoopLoads {
    fn bind_load(&mut self, _node: &N, _callback: Box<dyn FnOnce()>) {
        trace!("image load binding skipped");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObservers;

impl<N> ObserverPort<N> for NoopObservers {
    fn remove_observer(&mut self, _node: &N) {}
}
