//! Shadow tree session.
//!
//! `LayoutDom` owns every piece of per-session state: identity bindings,
//! shadow records, the hash index, the change queue and the frame links.
//! The mutation source drives it through [`LayoutDom::add`] and
//! [`LayoutDom::update`]; consumers drain it through [`LayoutDom::updates`].

use std::collections::HashMap;
use std::time::Instant;

use layout_privacy::classify::IMAGE_TAG;
use layout_privacy::{classify, truncate_chars, MaskPolicy, PrivacyInput};
use pagemirror_core_types::{NodeId, Privacy, SelectorVariant, SessionId, Source};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::LayoutConfig;
use crate::errors::LayoutResult;
use crate::events;
use crate::frames::FrameTracker;
use crate::metrics::{LayoutMetrics, MetricSnapshot};
use crate::model::{FrameContent, NodeInfo, NodeMeta, NodeValue, SelectorInput, SelectorPair};
use crate::node::{DomNode, NodeKind};
use crate::ports::Ports;
use crate::registry::IdRegistry;
use crate::selector;
use crate::tracker::ChangeTracker;

/// Attribute that turns an element into a region root labelled by its value.
pub const REGION_ATTR: &str = "data-mirror-region";
/// Attribute written once a masked image finishes loading.
pub const LOADED_ATTR: &str = "data-mirror-loaded";
/// Characters of text returned by [`LayoutDom::hash_text`].
pub const CLICK_TEXT_LENGTH: usize = 25;

pub struct LayoutDom<N: DomNode> {
    session: SessionId,
    config: LayoutConfig,
    ports: Ports<N>,
    policy: MaskPolicy,
    unmask: Vec<String>,
    registry: IdRegistry<N>,
    values: Vec<Option<NodeValue>>,
    hashes: HashMap<String, NodeId>,
    tracker: ChangeTracker,
    frames: FrameTracker<N>,
    privacy_map: HashMap<N, Privacy>,
    fraud_map: HashMap<N, u32>,
    metrics: LayoutMetrics,
}

impl<N: DomNode> LayoutDom<N> {
    pub fn new(config: LayoutConfig, ports: Ports<N>) -> Self {
        let mut dom = Self {
            session: SessionId::new(),
            policy: config.masking.clone(),
            config,
            ports,
            unmask: Vec::new(),
            registry: IdRegistry::default(),
            values: Vec::new(),
            hashes: HashMap::new(),
            tracker: ChangeTracker::default(),
            frames: FrameTracker::default(),
            privacy_map: HashMap::new(),
            fraud_map: HashMap::new(),
            metrics: LayoutMetrics::default(),
        };
        dom.reset();
        dom
    }

    /// Session with the built-in collaborators.
    pub fn with_config(config: LayoutConfig) -> Self {
        let ports = Ports::standard(config.hash_length);
        Self::new(config, ports)
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn ports(&self) -> &Ports<N> {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut Ports<N> {
        &mut self.ports
    }

    pub fn start(&mut self, root: &N) {
        self.reset();
        self.parse(root, true);
        debug!(session = %self.session, "layout tracking started");
    }

    pub fn stop(&mut self) {
        debug!(session = %self.session, "layout tracking stopped");
        self.reset();
    }

    fn reset(&mut self) {
        self.session = SessionId::new();
        self.policy = self.config.masking.clone();
        self.unmask.clear();
        self.registry.reset();
        self.values.clear();
        self.hashes.clear();
        self.tracker.clear();
        self.tracker.set_muted(self.config.low_fidelity());
        self.frames.clear();
        self.privacy_map.clear();
        self.fraud_map.clear();
        self.metrics.reset();
        self.ports.selector.reset();
        self.ports.regions.reset();
    }

    /// Scans `root` for configured regions, masks, checksum groups and
    /// unmasks. A malformed selector is logged and ends the scan; it never
    /// fails the caller.
    pub fn parse(&mut self, root: &N, init: bool) {
        if init {
            for entry in &self.config.unmask {
                if entry.contains('!') {
                    self.policy
                        .override_tokens
                        .push(entry.chars().skip(1).collect());
                } else {
                    self.unmask.push(entry.clone());
                }
            }
        }
        if let Err(err) = self.scan(root) {
            warn!(code = "selector", name = err.name(), %err, "layout selector scan failed");
        }
    }

    fn scan(&mut self, root: &N) -> LayoutResult<()> {
        if !root.supports_query() {
            return Ok(());
        }
        for rule in &self.config.regions {
            for node in root.query_all(&rule.selector)? {
                self.ports.regions.observe(&node, &rule.label);
            }
        }
        for selector in &self.config.mask {
            for node in root.query_all(selector)? {
                self.privacy_map.insert(node, Privacy::TextImage);
            }
        }
        for rule in &self.config.checksum {
            for node in root.query_all(&rule.selector)? {
                self.fraud_map.insert(node, rule.group);
            }
        }
        for selector in &self.unmask {
            for node in root.query_all(selector)? {
                self.privacy_map.insert(node, Privacy::None);
            }
        }
        Ok(())
    }

    /// Id of `node`, allocating one when `autogen` is set.
    pub fn get_id(&mut self, node: &N, autogen: bool) -> Option<NodeId> {
        self.registry.get_id(node, autogen)
    }

    /// Id of `node` without allocating.
    pub fn id_of(&self, node: &N) -> Option<NodeId> {
        self.registry.get(node)
    }

    pub fn add(&mut self, node: &N, parent: Option<&N>, data: NodeInfo, source: Source) {
        let started = Instant::now();
        let parent_id = parent.and_then(|p| self.registry.get(p));

        // Detached subtrees are not tracked.
        let detached = parent.is_some() && parent_id.is_none();
        if detached && !node.is_shadow_root() && node.kind() != NodeKind::DocumentType {
            events::emit_add_rejected(&mut self.metrics, &self.session, source);
            return;
        }

        let Some(id) = self.registry.get_id(node, true) else {
            return;
        };
        let previous = self.previous_id(node);
        let mut region = self.ports.regions.exists(node).then_some(id);
        let mut fraud = self.fraud_map.get(node).copied();
        let mut privacy = if self.config.content {
            Privacy::Sensitive
        } else {
            Privacy::TextImage
        };

        if let Some(parent_value) = parent_id.and_then(|pid| self.value_mut(pid)) {
            if !parent_value.children.contains(&id) {
                parent_value.children.push(id);
            }
            region = region.or(parent_value.region);
            fraud = fraud.or(parent_value.metadata.fraud);
            privacy = parent_value.metadata.privacy;
        }

        if let Some(label) = data.attribute(REGION_ATTR) {
            self.ports.regions.observe(node, label);
            region = Some(id);
        }

        self.registry.bind_node(id, node.clone());
        self.store(NodeValue {
            id,
            parent: parent_id,
            previous,
            children: Vec::new(),
            data,
            selector: None,
            hash: None,
            region,
            metadata: NodeMeta {
                active: true,
                suspend: false,
                privacy,
                position: None,
                fraud,
                size: None,
            },
        });

        self.apply_privacy(node, id);
        self.update_selector(id);
        self.update_image_size(id);
        self.tracker.track(id, source, true, false);
        events::emit_add(&mut self.metrics, &self.session, id, source, started.elapsed());
    }

    pub fn update(&mut self, node: &N, parent: Option<&N>, data: NodeInfo, source: Source) {
        let started = Instant::now();
        let Some(id) = self.registry.get(node).filter(|id| self.value(*id).is_some()) else {
            events::emit_update_ignored(&mut self.metrics, &self.session, source);
            return;
        };
        let parent_id = parent.and_then(|p| self.registry.get(p));
        let live_parent = parent_id.is_some_and(|pid| self.registry.has_node(pid));
        let bound = self.registry.has_node(id);
        let previous = self.previous_id(node);
        let mut changed = false;
        let mut parent_changed = false;

        let old_parent = match self.value_mut(id) {
            Some(value) => {
                // A purged node only comes back under a live parent.
                if (live_parent || bound) && !value.metadata.active {
                    value.metadata.active = true;
                    changed = true;
                }
                if value.previous != previous {
                    changed = true;
                    value.previous = previous;
                }
                value.parent
            }
            None => return,
        };

        if old_parent != parent_id {
            changed = true;
            if let Some(value) = self.value_mut(id) {
                value.parent = parent_id;
            }
            match parent_id {
                Some(pid) => self.attach(node, id, pid, previous),
                None => self.remove(id, source),
            }
            if let Some(old) = old_parent.and_then(|opid| self.value_mut(opid)) {
                old.children.retain(|child| *child != id);
            }
            parent_changed = true;
        }

        // Descendants of a re-inserted subtree keep their parent link, so
        // the lookup is restored here rather than on reparent only.
        if live_parent && !self.registry.has_node(id) {
            self.registry.bind_node(id, node.clone());
        }

        if let Some(value) = self.value_mut(id) {
            if value.data.merge(data) {
                changed = true;
            }
        }

        self.update_selector(id);
        self.tracker.track(id, source, changed, parent_changed);
        events::emit_update(
            &mut self.metrics,
            &self.session,
            id,
            changed,
            parent_changed,
            started.elapsed(),
        );
    }

    /// Splices `id` into `parent_id`'s children right after `previous`.
    fn attach(&mut self, node: &N, id: NodeId, parent_id: NodeId, previous: Option<NodeId>) {
        let region_root = self.ports.regions.exists(node);
        let parent_region = match self.value_mut(parent_id) {
            Some(parent) => {
                if !parent.children.contains(&id) {
                    let index = previous
                        .and_then(|prev| parent.children.iter().position(|c| *c == prev))
                        .map(|index| index + 1)
                        .unwrap_or(0);
                    parent.children.insert(index, id);
                }
                parent.region
            }
            None => return,
        };
        if let Some(value) = self.value_mut(id) {
            value.region = if region_root { Some(id) } else { parent_region };
        }
    }

    fn remove(&mut self, id: NodeId, source: Source) {
        let Some(value) = self.value_mut(id) else {
            return;
        };
        value.metadata.active = false;
        value.parent = None;
        self.tracker.track(id, source, true, false);
        let purged = self.purge_lookup(id);
        events::emit_remove(&mut self.metrics, &self.session, id, purged);
    }

    /// Drops the id -> node lookup of `id` and of every stored descendant and
    /// marks them inactive. Shadow roots stay resolvable together with their
    /// subtree: their mutations keep flowing while the host is detached.
    fn purge_lookup(&mut self, id: NodeId) -> usize {
        let mut purged = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.registry.node(current) {
                if node.kind() == NodeKind::DocumentFragment {
                    continue;
                }
                if node.is_frame() {
                    self.ports.observers.remove_observer(node);
                }
            }
            if self.registry.unbind_node(current).is_some() {
                purged += 1;
            }
            if let Some(value) = self.value_mut(current) {
                value.metadata.active = false;
                stack.extend(value.children.iter().rev().copied());
            }
        }
        purged
    }

    fn apply_privacy(&mut self, node: &N, id: NodeId) {
        let Some(value) = self.value(id) else {
            return;
        };
        let parent = value.parent.and_then(|pid| self.value(pid));
        let mut input = PrivacyInput::new(&value.data.tag, value.metadata.privacy);
        input.attributes = value.data.attributes.as_ref();
        input.explicit = self.privacy_map.get(node).copied();
        input.checksum = self.fraud_map.contains_key(node);
        input.parent_tag = parent.map(|p| p.data.tag.as_str());
        input.parent_selector = parent.and_then(|p| p.selector_of(SelectorVariant::Alpha));
        let level = classify(&input, &self.policy);

        if let Some(value) = self.value_mut(id) {
            value.metadata.privacy = level;
        }
    }

    fn update_selector(&mut self, id: NodeId) {
        let Some(value) = self.value(id) else {
            return;
        };
        let parent = value.parent.and_then(|pid| self.value(pid));
        let position = selector::position(parent, value, |sibling| self.value(sibling));
        let input = SelectorInput {
            id,
            tag: value.data.tag.clone(),
            prefix: parent.and_then(|p| p.selector.clone()),
            position,
            attributes: value.data.attributes.clone(),
        };

        let selectors: SelectorPair =
            SelectorVariant::ALL.map(|variant| self.ports.selector.get(&input, variant));
        let hashes: SelectorPair = selectors
            .clone()
            .map(|s| s.map(|s| self.ports.hasher.hash(&s)));
        for hash in hashes.iter().flatten() {
            self.hashes.insert(hash.clone(), id);
        }

        if let Some(value) = self.value_mut(id) {
            value.metadata.position = Some(position);
            value.selector = Some(selectors);
            value.hash = Some(hashes);
        }
    }

    /// Masked images report their box once loaded; until then a one-shot
    /// load callback marks the element so the next mutation cycle picks the
    /// size up.
    fn update_image_size(&mut self, id: NodeId) {
        let Some(value) = self.value_mut(id) else {
            return;
        };
        if !value.data.tag.eq_ignore_ascii_case(IMAGE_TAG)
            || value.metadata.privacy != Privacy::TextImage
        {
            return;
        }
        value.metadata.size = Some(Vec::new());

        let Some(node) = self.registry.node(id) else {
            return;
        };
        if !node.image_loaded() {
            let target = node.clone();
            self.ports.loads.bind_load(
                node,
                Box::new(move || target.set_attribute(LOADED_ATTR, &shortid())),
            );
        }
    }

    fn previous_id(&self, node: &N) -> Option<NodeId> {
        // Siblings not reported yet have no id; walk past them.
        let mut cursor = node.previous_sibling();
        while let Some(sibling) = cursor {
            if let Some(id) = self.registry.get(&sibling) {
                return Some(id);
            }
            cursor = sibling.previous_sibling();
        }
        None
    }

    fn store(&mut self, value: NodeValue) {
        let index = value.id.index();
        if self.values.len() <= index {
            self.values.resize_with(index + 1, || None);
        }
        self.values[index] = Some(value);
    }

    fn value(&self, id: NodeId) -> Option<&NodeValue> {
        self.values.get(id.index()).and_then(Option::as_ref)
    }

    fn value_mut(&mut self, id: NodeId) -> Option<&mut NodeValue> {
        self.values.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn get(&self, node: &N) -> Option<&NodeValue> {
        self.registry.get(node).and_then(|id| self.value(id))
    }

    /// Shadow record of `id`, including records of removed nodes.
    pub fn get_value(&self, id: NodeId) -> Option<&NodeValue> {
        self.value(id)
    }

    /// Live node of `id`; `None` once the node was removed.
    pub fn get_node(&self, id: NodeId) -> Option<&N> {
        self.registry.node(id)
    }

    pub fn lookup(&self, hash: &str) -> Option<NodeId> {
        self.hashes.get(hash).copied()
    }

    pub fn has(&self, node: &N) -> bool {
        self.registry
            .get(node)
            .map(|id| self.registry.has_node(id))
            .unwrap_or(false)
    }

    /// Drains the change queue, returning the records in queued order.
    pub fn updates(&mut self) -> Vec<NodeValue> {
        let output: Vec<NodeValue> = self
            .tracker
            .drain()
            .into_iter()
            .filter_map(|id| self.value(id).cloned())
            .collect();
        events::emit_drain(&mut self.metrics, &self.session, output.len());
        output
    }

    /// Leading text of the node whose selector hashes to `hash`.
    pub fn hash_text(&self, hash: &str) -> String {
        self.lookup(hash)
            .and_then(|id| self.get_node(id))
            .and_then(|node| node.text_content())
            .map(|text| truncate_chars(&text, CLICK_TEXT_LENGTH))
            .unwrap_or_default()
    }

    /// Whether `node` is a frame whose document can be read. Readable frames
    /// are linked to their document.
    pub fn same_origin(&mut self, node: &N) -> bool {
        if !node.is_frame() {
            return false;
        }
        match node.content_document() {
            Ok(Some(doc)) => {
                self.frames.register(node, doc);
                true
            }
            Ok(None) => false,
            Err(err) => {
                trace!(%err, "frame treated as cross-origin");
                false
            }
        }
    }

    pub fn iframe(&self, doc: &N) -> Option<&N> {
        self.frames.host(doc)
    }

    pub fn iframe_content(&self, frame: &N) -> Option<&FrameContent<N>> {
        self.frames.content(frame)
    }

    pub fn remove_iframe(&mut self, frame: &N, doc: &N) {
        self.frames.remove(frame, doc);
    }

    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    pub fn metrics(&self) -> MetricSnapshot {
        self.metrics.snapshot()
    }
}

fn shortid() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
