use std::fmt::Write as _;

use layout_dom::{NodeValue, SelectorVariant};

use crate::replay::{Changelist, ReplayReport};

/// Plain-text rendering used by `--output human`.
pub fn render_human(report: &ReplayReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Session {}", report.session);
    for changelist in &report.changelists {
        let _ = writeln!(out, "{}", heading(changelist));
        for record in &changelist.records {
            let _ = writeln!(out, "  {}", render_record(record));
        }
    }
    if let Some(metrics) = &report.metrics {
        let _ = writeln!(out, "Metrics:");
        let _ = writeln!(
            out,
            "- adds: {} (avg {:.3}ms, rejected {})",
            metrics.add.total, metrics.add.avg_ms, metrics.rejected_adds
        );
        let _ = writeln!(
            out,
            "- updates: {} (avg {:.3}ms, ignored {})",
            metrics.update.total, metrics.update.avg_ms, metrics.ignored_updates
        );
        let _ = writeln!(
            out,
            "- removes: {}, drained records: {}, frames unobserved: {}",
            metrics.removes, metrics.drained, report.unobserved_frames
        );
    }
    out
}

fn heading(changelist: &Changelist) -> String {
    match changelist.step {
        Some(step) => format!(
            "[step {step}] {} ({} records)",
            changelist.op,
            changelist.records.len()
        ),
        None => format!("[{}] ({} records)", changelist.op, changelist.records.len()),
    }
}

/// One line per record: id, tag, links, privacy, then the optional parts.
pub fn render_record(record: &NodeValue) -> String {
    let mut line = format!(
        "#{} {} parent={} prev={} privacy={}",
        record.id,
        record.data.tag,
        optional(record.parent),
        optional(record.previous),
        record.metadata.privacy
    );
    if !record.metadata.active {
        line.push_str(" inactive");
    }
    if let Some(selector) = record.selector_of(SelectorVariant::Alpha) {
        let _ = write!(line, " selector={selector}");
    }
    if let Some(hash) = record.hash_of(SelectorVariant::Alpha) {
        let _ = write!(line, " hash={hash}");
    }
    if let Some(region) = record.region {
        let _ = write!(line, " region={region}");
    }
    if let Some(group) = record.metadata.fraud {
        let _ = write!(line, " checksum={group}");
    }
    if let Some(value) = &record.data.value {
        let _ = write!(line, " value={value:?}");
    }
    line
}

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string())
}
