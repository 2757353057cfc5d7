pub mod config;
pub mod dom;
pub mod errors;
pub mod events;
pub mod frames;
pub mod memory;
pub mod metrics;
pub mod model;
pub mod node;
pub mod ports;
pub mod registry;
pub mod selector;
pub mod tracker;

pub use config::{ChecksumRule, LayoutConfig, RegionRule};
pub use dom::{LayoutDom, LOADED_ATTR, REGION_ATTR};
pub use errors::{LayoutError, LayoutResult};
pub use memory::MemoryNode;
pub use metrics::MetricSnapshot;
pub use model::{FrameContent, NodeInfo, NodeMeta, NodeValue, SelectorInput, SelectorPair};
pub use node::{DomNode, NodeKind};
pub use pagemirror_core_types::{Attributes, NodeId, Privacy, SelectorVariant, Source};
pub use ports::{
    HashPort, LoadPort, NoopLoads, NoopObservers, ObserverPort, Ports, RegionPort, RegionSet,
    SelectorPort, ShortHasher,
};
pub use selector::StructuralSelector;
