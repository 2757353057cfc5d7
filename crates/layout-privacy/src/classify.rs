use pagemirror_core_types::Privacy;
use tracing::trace;

use crate::context::PrivacyInput;
use crate::policy::{MaskPolicy, MASK_ATTR, UNMASK_ATTR};

pub const TEXT_TAG: &str = "*T";
pub const IMAGE_TAG: &str = "IMG";
pub const INPUT_TAG: &str = "INPUT";

/// Parent tags whose text children are never masked.
const CAPTURED_TEXT_PARENTS: &[&str] = &["STYLE", "TITLE", "svg:style"];
/// Attributes left out of the masked-control scan.
const SCAN_SKIP_ATTRS: &[&str] = &["class", "style"];

/// A rule returns `Some(level)` when it claims the node. Claiming with the
/// current level is how a rule retains the inherited classification while
/// still shadowing every rule below it.
type Rule = fn(&PrivacyInput<'_>, &MaskPolicy) -> Option<Privacy>;

/// Evaluated top to bottom; the first rule that claims the node decides.
const RULES: &[(&str, Rule)] = &[
    ("masked-tag", masked_tag),
    ("mask-attribute", mask_attribute),
    ("unmask-attribute", unmask_attribute),
    ("configured-level", configured_level),
    ("checksum-group", checksum_group),
    ("text-node", text_node),
    ("sensitive-class", sensitive_class),
    ("blob-image", blob_image),
];

/// Computes the privacy level of one node. Pure: identical input yields the
/// identical level.
pub fn classify(input: &PrivacyInput<'_>, policy: &MaskPolicy) -> Privacy {
    for (name, rule) in RULES {
        if let Some(level) = rule(input, policy) {
            trace!(rule = *name, tag = input.tag, %level, "privacy rule matched");
            return level;
        }
    }
    input.current
}

fn masked_tag(input: &PrivacyInput<'_>, policy: &MaskPolicy) -> Option<Privacy> {
    if !policy.is_mask_tag(input.tag) {
        return None;
    }
    let disabled = input.tag.eq_ignore_ascii_case(INPUT_TAG)
        && input
            .attribute("type")
            .map(|kind| policy.is_mask_disabled(kind))
            .unwrap_or(false);
    if disabled {
        return Some(input.current);
    }

    let mut scan = String::new();
    if let Some(attrs) = input.attributes {
        for (name, value) in attrs {
            if SCAN_SKIP_ATTRS.contains(&name.as_str()) {
                continue;
            }
            scan.push_str(&value.to_lowercase());
        }
    }
    if policy.has_exclude_token(&scan) {
        Some(Privacy::Exclude)
    } else {
        Some(Privacy::Text)
    }
}

fn mask_attribute(input: &PrivacyInput<'_>, _: &MaskPolicy) -> Option<Privacy> {
    input
        .has_attribute(MASK_ATTR)
        .then_some(Privacy::TextImage)
}

fn unmask_attribute(input: &PrivacyInput<'_>, _: &MaskPolicy) -> Option<Privacy> {
    input.has_attribute(UNMASK_ATTR).then_some(Privacy::None)
}

fn configured_level(input: &PrivacyInput<'_>, _: &MaskPolicy) -> Option<Privacy> {
    input.explicit
}

fn checksum_group(input: &PrivacyInput<'_>, _: &MaskPolicy) -> Option<Privacy> {
    input.checksum.then_some(Privacy::Text)
}

fn text_node(input: &PrivacyInput<'_>, policy: &MaskPolicy) -> Option<Privacy> {
    if input.tag != TEXT_TAG {
        return None;
    }
    let parent_tag = input.parent_tag.unwrap_or_default();
    let parent_selector = input.parent_selector.unwrap_or_default();
    if CAPTURED_TEXT_PARENTS.contains(&parent_tag) || policy.has_override_token(parent_selector)
    {
        Some(Privacy::None)
    } else {
        Some(input.current)
    }
}

fn sensitive_class(input: &PrivacyInput<'_>, policy: &MaskPolicy) -> Option<Privacy> {
    if input.current != Privacy::Sensitive {
        return None;
    }
    match input.attribute("class") {
        Some(class) if policy.has_mask_text_token(class) => Some(Privacy::Text),
        _ => Some(input.current),
    }
}

fn blob_image(input: &PrivacyInput<'_>, _: &MaskPolicy) -> Option<Privacy> {
    if !input.tag.eq_ignore_ascii_case(IMAGE_TAG) {
        return None;
    }
    match input.attribute("src") {
        Some(src) if src.starts_with("blob:") => Some(Privacy::TextImage),
        _ => Some(input.current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemirror_core_types::Attributes;
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn level(tag: &str, attributes: &Attributes, current: Privacy) -> Privacy {
        let mut input = PrivacyInput::new(tag, current);
        input.attributes = Some(attributes);
        classify(&input, &MaskPolicy::default())
    }

    #[test]
    fn plain_input_is_text_masked() {
        let a = attrs(&[("type", "text"), ("name", "city")]);
        assert_eq!(level("INPUT", &a, Privacy::None), Privacy::Text);
    }

    #[test]
    fn excluded_field_wins_over_text_mask() {
        let a = attrs(&[("type", "text"), ("name", "user-Password")]);
        assert_eq!(level("INPUT", &a, Privacy::None), Privacy::Exclude);
    }

    #[test]
    fn disabled_type_wins_over_excluded_field() {
        let a = attrs(&[("type", "checkbox"), ("name", "remember-password")]);
        assert_eq!(level("INPUT", &a, Privacy::Sensitive), Privacy::Sensitive);
    }

    #[test]
    fn disabled_type_only_applies_to_inputs() {
        let a = attrs(&[("type", "checkbox")]);
        assert_eq!(level("SELECT", &a, Privacy::None), Privacy::Text);
    }

    #[test]
    fn class_and_style_are_not_scanned() {
        let a = attrs(&[("class", "password"), ("style", "secret"), ("type", "email")]);
        assert_eq!(level("TEXTAREA", &a, Privacy::None), Privacy::Text);
    }

    #[test]
    fn mask_attribute_precedes_unmask_attribute() {
        let a = attrs(&[(MASK_ATTR, ""), (UNMASK_ATTR, "")]);
        assert_eq!(level("DIV", &a, Privacy::None), Privacy::TextImage);
        let b = attrs(&[(UNMASK_ATTR, "")]);
        assert_eq!(level("DIV", &b, Privacy::TextImage), Privacy::None);
    }

    #[test]
    fn configured_level_precedes_checksum_group() {
        let a = Attributes::new();
        let mut input = PrivacyInput::new("DIV", Privacy::TextImage);
        input.attributes = Some(&a);
        input.explicit = Some(Privacy::None);
        input.checksum = true;
        let policy = MaskPolicy::default();
        assert_eq!(classify(&input, &policy), Privacy::None);
        input.explicit = None;
        assert_eq!(classify(&input, &policy), Privacy::Text);
    }

    #[test]
    fn text_under_style_or_override_is_captured() {
        let mut policy = MaskPolicy::default();
        policy.override_tokens = vec!["#bio".into()];

        let mut input = PrivacyInput::new(TEXT_TAG, Privacy::TextImage);
        input.parent_tag = Some("TITLE");
        assert_eq!(classify(&input, &policy), Privacy::None);

        input.parent_tag = Some("DIV");
        input.parent_selector = Some("body>div#bio");
        assert_eq!(classify(&input, &policy), Privacy::None);

        input.parent_selector = Some("body>div#other");
        assert_eq!(classify(&input, &policy), Privacy::TextImage);
    }

    #[test]
    fn sensitive_mode_escalates_on_class_tokens() {
        let a = attrs(&[("class", "shipping-address")]);
        assert_eq!(level("SPAN", &a, Privacy::Sensitive), Privacy::Text);
        let b = attrs(&[("class", "headline")]);
        assert_eq!(level("SPAN", &b, Privacy::Sensitive), Privacy::Sensitive);
    }

    #[test]
    fn sensitive_mode_shadows_blob_images() {
        let a = attrs(&[("src", "blob:https://example.com/1")]);
        assert_eq!(level("IMG", &a, Privacy::Sensitive), Privacy::Sensitive);
        assert_eq!(level("IMG", &a, Privacy::None), Privacy::TextImage);
    }

    #[test]
    fn unmatched_nodes_keep_current_level() {
        let a = attrs(&[("id", "main")]);
        assert_eq!(level("DIV", &a, Privacy::Text), Privacy::Text);
    }

    #[test]
    fn classification_is_idempotent() {
        let a = attrs(&[("type", "text"), ("name", "ssn")]);
        let first = level("INPUT", &a, Privacy::None);
        assert_eq!(first, level("INPUT", &a, Privacy::None));
    }
}
