use std::time::Duration;

use pagemirror_core_types::{NodeId, SessionId, Source};
use tracing::{debug, trace};

use crate::metrics::LayoutMetrics;

pub fn emit_add(
    metrics: &mut LayoutMetrics,
    session: &SessionId,
    id: NodeId,
    source: Source,
    duration: Duration,
) {
    metrics.record_add(duration);
    trace!(
        target: "layout.events",
        %session,
        %id,
        ?source,
        "layout.node.added"
    );
}

pub fn emit_add_rejected(metrics: &mut LayoutMetrics, session: &SessionId, source: Source) {
    metrics.record_rejected_add();
    trace!(
        target: "layout.events",
        %session,
        ?source,
        "layout.node.detached; add skipped"
    );
}

pub fn emit_update(
    metrics: &mut LayoutMetrics,
    session: &SessionId,
    id: NodeId,
    changed: bool,
    parent_changed: bool,
    duration: Duration,
) {
    metrics.record_update(duration);
    trace!(
        target: "layout.events",
        %session,
        %id,
        changed,
        parent_changed,
        "layout.node.updated"
    );
}

pub fn emit_update_ignored(metrics: &mut LayoutMetrics, session: &SessionId, source: Source) {
    metrics.record_ignored_update();
    trace!(
        target: "layout.events",
        %session,
        ?source,
        "layout.node.untracked; update skipped"
    );
}

pub fn emit_remove(metrics: &mut LayoutMetrics, session: &SessionId, id: NodeId, purged: usize) {
    metrics.record_remove();
    debug!(
        target: "layout.events",
        %session,
        %id,
        purged,
        "layout.node.removed"
    );
}

pub fn emit_drain(metrics: &mut LayoutMetrics, session: &SessionId, count: usize) {
    metrics.record_drain(count);
    if count > 0 {
        debug!(target: "layout.events", %session, count, "layout.updates.drained");
    }
}
