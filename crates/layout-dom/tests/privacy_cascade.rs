mod common;

use common::{discover, moved, session};
use layout_dom::{
    ChecksumRule, DomNode, LayoutConfig, LayoutDom, MemoryNode, NodeInfo, Privacy, Source,
};
use layout_privacy::{MASK_ATTR, UNMASK_ATTR};
use pretty_assertions::assert_eq;

fn privacy(dom: &LayoutDom<MemoryNode>, node: &MemoryNode) -> Privacy {
    dom.get(node).expect("tracked").metadata.privacy
}

fn started(config: LayoutConfig, root: &MemoryNode) -> LayoutDom<MemoryNode> {
    let mut dom = LayoutDom::with_config(config);
    dom.start(root);
    discover(&mut dom, root);
    dom
}

#[test]
fn masked_inputs_respect_type_exception_and_exclusions() {
    let mut dom = session();
    let html = MemoryNode::element("html");
    let form = MemoryNode::element_with("form", &[(UNMASK_ATTR, "")]);
    let checkbox =
        MemoryNode::element_with("input", &[("type", "checkbox"), ("name", "remember")]);
    let city = MemoryNode::element_with("input", &[("type", "text"), ("name", "city")]);
    let secret = MemoryNode::element_with("input", &[("type", "text"), ("name", "user-password")]);
    let secret_toggle = MemoryNode::element_with(
        "input",
        &[("type", "checkbox"), ("name", "remember-password")],
    );
    html.append_child(&form);
    for input in [&checkbox, &city, &secret, &secret_toggle] {
        form.append_child(input);
    }

    discover(&mut dom, &html);

    assert_eq!(privacy(&dom, &html), Privacy::Sensitive);
    assert_eq!(privacy(&dom, &form), Privacy::None);
    assert_eq!(privacy(&dom, &checkbox), Privacy::None);
    assert_eq!(privacy(&dom, &city), Privacy::Text);
    assert_eq!(privacy(&dom, &secret), Privacy::Exclude);
    assert_eq!(privacy(&dom, &secret_toggle), Privacy::None);
}

#[test]
fn checkbox_keeps_inherited_sensitive_level() {
    let mut dom = session();
    let body = MemoryNode::element("body");
    let checkbox = MemoryNode::element_with("input", &[("type", "checkbox")]);
    body.append_child(&checkbox);

    discover(&mut dom, &body);

    assert_eq!(privacy(&dom, &checkbox), Privacy::Sensitive);
}

#[test]
fn mask_attribute_cascades_to_text() {
    let mut dom = session();
    let body = MemoryNode::element("body");
    let card = MemoryNode::element_with("div", &[(MASK_ATTR, "")]);
    let text = MemoryNode::text("4111 1111 1111 1111");
    body.append_child(&card);
    card.append_child(&text);

    discover(&mut dom, &body);

    assert_eq!(privacy(&dom, &card), Privacy::TextImage);
    assert_eq!(privacy(&dom, &text), Privacy::TextImage);
}

#[test]
fn style_text_is_captured() {
    let mut dom = session();
    let html = MemoryNode::element("html");
    let style = MemoryNode::element("style");
    let rules = MemoryNode::text("body { color: red }");
    html.append_child(&style);
    style.append_child(&rules);

    discover(&mut dom, &html);

    assert_eq!(privacy(&dom, &style), Privacy::Sensitive);
    assert_eq!(privacy(&dom, &rules), Privacy::None);
}

#[test]
fn override_tokens_unmask_text_under_matching_selectors() {
    let doc = MemoryNode::document();
    let card = MemoryNode::element_with("div", &[("class", "card")]);
    let panel = MemoryNode::element_with("div", &[("class", "panel")]);
    let card_text = MemoryNode::text("visible");
    let panel_text = MemoryNode::text("masked");
    doc.append_child(&card);
    doc.append_child(&panel);
    card.append_child(&card_text);
    panel.append_child(&panel_text);

    let config = LayoutConfig {
        unmask: vec!["!card".into()],
        ..LayoutConfig::default()
    };
    let dom = started(config, &doc);

    assert_eq!(privacy(&dom, &card_text), Privacy::None);
    assert_eq!(privacy(&dom, &panel_text), Privacy::Sensitive);
}

#[test]
fn configured_selectors_set_explicit_levels() {
    let doc = MemoryNode::document();
    let private = MemoryNode::element_with("div", &[("class", "private")]);
    let public = MemoryNode::element_with("p", &[("id", "public")]);
    doc.append_child(&private);
    private.append_child(&public);

    let config = LayoutConfig {
        mask: vec![".private".into()],
        unmask: vec!["#public".into()],
        ..LayoutConfig::default()
    };
    let dom = started(config, &doc);

    assert_eq!(privacy(&dom, &private), Privacy::TextImage);
    assert_eq!(privacy(&dom, &public), Privacy::None);
}

#[test]
fn rescanning_a_mutation_target_covers_inserted_nodes() {
    let doc = MemoryNode::document();
    let body = MemoryNode::element("body");
    doc.append_child(&body);
    let config = LayoutConfig {
        mask: vec![".private".into()],
        ..LayoutConfig::default()
    };
    let mut dom = started(config, &doc);

    let late = MemoryNode::element_with("div", &[("class", "private")]);
    body.append_child(&late);
    dom.parse(&body, false);
    dom.add(&late, Some(&body), late.info(), Source::ChildListAdd);

    assert_eq!(privacy(&dom, &late), Privacy::TextImage);
}

#[test]
fn checksum_groups_mask_text_and_inherit() {
    let doc = MemoryNode::document();
    let pay = MemoryNode::element_with("section", &[("id", "pay")]);
    let amount = MemoryNode::element("span");
    doc.append_child(&pay);
    pay.append_child(&amount);

    let config = LayoutConfig {
        checksum: vec![ChecksumRule {
            group: 7,
            selector: "#pay".into(),
        }],
        ..LayoutConfig::default()
    };
    let dom = started(config, &doc);

    let pay_value = dom.get(&pay).unwrap();
    assert_eq!(pay_value.metadata.fraud, Some(7));
    assert_eq!(pay_value.metadata.privacy, Privacy::Text);
    let amount_value = dom.get(&amount).unwrap();
    assert_eq!(amount_value.metadata.fraud, Some(7));
    assert_eq!(amount_value.metadata.privacy, Privacy::Text);
}

#[test]
fn content_flag_off_masks_everything_by_default() {
    let config = LayoutConfig {
        content: false,
        ..LayoutConfig::default()
    };
    let mut dom = LayoutDom::with_config(config);
    let html = MemoryNode::element("html");
    let text = MemoryNode::text("hidden");
    html.append_child(&text);

    discover(&mut dom, &html);

    assert_eq!(privacy(&dom, &html), Privacy::TextImage);
    assert_eq!(privacy(&dom, &text), Privacy::TextImage);
}

#[test]
fn sensitive_class_names_mask_text() {
    let mut dom = session();
    let body = MemoryNode::element("body");
    let contact = MemoryNode::element_with("div", &[("class", "contact-card")]);
    body.append_child(&contact);

    discover(&mut dom, &body);

    assert_eq!(privacy(&dom, &contact), Privacy::Text);
}

#[test]
fn blob_images_are_masked_outside_sensitive_mode() {
    let mut dom = session();
    let body = MemoryNode::element_with("body", &[(UNMASK_ATTR, "")]);
    let blob = MemoryNode::element_with("img", &[("src", "blob:https://example.com/1")]);
    let plain = MemoryNode::element_with("img", &[("src", "/logo.png")]);
    body.append_child(&blob);
    body.append_child(&plain);

    discover(&mut dom, &body);

    assert_eq!(privacy(&dom, &blob), Privacy::TextImage);
    assert_eq!(dom.get(&blob).unwrap().metadata.size, Some(Vec::new()));
    assert_eq!(privacy(&dom, &plain), Privacy::None);
    assert_eq!(dom.get(&plain).unwrap().metadata.size, None);
}

#[test]
fn sensitive_mode_takes_precedence_over_blob_check() {
    let mut dom = session();
    let body = MemoryNode::element("body");
    let blob = MemoryNode::element_with("img", &[("src", "blob:https://example.com/2")]);
    body.append_child(&blob);

    discover(&mut dom, &body);

    assert_eq!(privacy(&dom, &blob), Privacy::Sensitive);
    assert_eq!(dom.get(&blob).unwrap().metadata.size, None);
}

#[test]
fn privacy_is_decided_once_on_add() {
    let mut dom = session();
    let body = MemoryNode::element("body");
    let div = MemoryNode::element("div");
    body.append_child(&div);
    discover(&mut dom, &body);

    div.set_attribute(MASK_ATTR, "");
    moved(&mut dom, &div, Source::Attributes);

    let value = dom.get(&div).unwrap();
    assert_eq!(value.data.attribute(MASK_ATTR), Some(""));
    assert_eq!(value.metadata.privacy, Privacy::Sensitive);
}

#[test]
fn re_adding_an_unchanged_node_classifies_identically() {
    let mut dom = session();
    let body = MemoryNode::element_with("body", &[(UNMASK_ATTR, "")]);
    let field = MemoryNode::element_with("textarea", &[("name", "notes")]);
    body.append_child(&field);
    discover(&mut dom, &body);
    let first = privacy(&dom, &field);

    let info = NodeInfo::new("TEXTAREA").with_attribute("name", "notes");
    dom.add(&field, Some(&body), info, Source::ChildListAdd);

    assert_eq!(first, Privacy::Text);
    assert_eq!(privacy(&dom, &field), first);
}
