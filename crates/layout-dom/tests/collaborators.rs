//! Image-load hooks, frame links and nested observer teardown.

mod common;

use common::{discover, id, moved, session, session_with, LoadRecorder, ObserverRecorder};
use layout_dom::{MemoryNode, Privacy, Source, LOADED_ATTR};
use layout_privacy::MASK_ATTR;
use pretty_assertions::assert_eq;

#[test]
fn masked_image_marks_itself_once_loaded() {
    let loads = LoadRecorder::default();
    let mut dom = session_with(loads.clone(), ObserverRecorder::default());
    let body = MemoryNode::element("body");
    let gallery = MemoryNode::element_with("div", &[(MASK_ATTR, "")]);
    let pending = MemoryNode::element_with("img", &[("src", "/a.png")]);
    let ready = MemoryNode::element_with("img", &[("src", "/b.png")]);
    pending.set_image_loaded(false);
    body.append_child(&gallery);
    gallery.append_child(&pending);
    gallery.append_child(&ready);

    discover(&mut dom, &body);

    assert_eq!(dom.get(&pending).unwrap().metadata.privacy, Privacy::TextImage);
    assert_eq!(dom.get(&pending).unwrap().metadata.size, Some(Vec::new()));
    assert_eq!(loads.bound(), vec![pending.clone()]);
    assert_eq!(pending.attribute(LOADED_ATTR), None);

    loads.fire_all();

    let marker = pending.attribute(LOADED_ATTR).expect("marker written");
    assert_eq!(marker.len(), 8);
    assert_eq!(ready.attribute(LOADED_ATTR), None);

    dom.updates();
    moved(&mut dom, &pending, Source::Attributes);
    let drained = dom.updates();
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].data.attribute(LOADED_ATTR), Some(marker.as_str()));
}

#[test]
fn readable_frames_link_both_ways() {
    let mut dom = session();
    let frame = MemoryNode::element("iframe");
    let inner = MemoryNode::document();
    frame.set_content_document(&inner);

    assert!(dom.same_origin(&frame));
    assert_eq!(dom.iframe(&inner), Some(&frame));
    assert_eq!(dom.iframe_content(&frame).map(|c| &c.doc), Some(&inner));

    dom.remove_iframe(&frame, &inner);
    assert_eq!(dom.iframe(&inner), None);
    assert_eq!(dom.iframe_content(&frame), None);
}

#[test]
fn unreadable_or_non_frame_nodes_are_not_same_origin() {
    let mut dom = session();
    let blocked = MemoryNode::element("iframe");
    blocked.deny_content_access();
    let empty = MemoryNode::element("iframe");
    let div = MemoryNode::element("div");

    assert!(!dom.same_origin(&blocked));
    assert!(!dom.same_origin(&empty));
    assert!(!dom.same_origin(&div));
    assert_eq!(dom.iframe_content(&blocked), None);
}

#[test]
fn iframe_lookup_only_answers_documents() {
    let mut dom = session();
    let frame = MemoryNode::element("iframe");
    let inner = MemoryNode::document();
    frame.set_content_document(&inner);
    dom.same_origin(&frame);

    assert_eq!(dom.iframe(&frame), None);
    assert_eq!(dom.iframe(&MemoryNode::element("div")), None);
}

#[test]
fn removing_a_subtree_stops_observing_its_frames() {
    let observers = ObserverRecorder::default();
    let mut dom = session_with(LoadRecorder::default(), observers.clone());
    let html = MemoryNode::element("html");
    let wrapper = MemoryNode::element("div");
    let frame = MemoryNode::element("iframe");
    html.append_child(&wrapper);
    wrapper.append_child(&frame);
    discover(&mut dom, &html);
    let frame_id = id(&dom, &frame);

    wrapper.detach();
    moved(&mut dom, &wrapper, Source::ChildListRemove);

    assert_eq!(observers.removed(), vec![frame]);
    assert_eq!(dom.get_node(frame_id), None);
}
