use pagemirror_core_types::{NodeId, SelectorVariant};

use crate::model::{NodeValue, SelectorInput};
use crate::ports::SelectorPort;

/// Ordinal of `child` among the same-tag siblings that precede it in
/// `parent.children`: the nearest such sibling's ordinal plus one, or 1.
pub fn position<'a, F>(parent: Option<&NodeValue>, child: &NodeValue, lookup: F) -> u32
where
    F: Fn(NodeId) -> Option<&'a NodeValue>,
{
    let Some(parent) = parent else {
        return 1;
    };
    let Some(index) = parent.children.iter().position(|id| *id == child.id) else {
        return 1;
    };
    parent.children[..index]
        .iter()
        .rev()
        .filter_map(|id| lookup(*id))
        .find(|sibling| sibling.data.tag == child.data.tag)
        .map(|sibling| sibling.metadata.position.unwrap_or(0) + 1)
        .unwrap_or(1)
}

/// Default selector builder.
///
/// `Alpha` renders `tag#id.class:nth-of-type(n)` segments and changes when
/// identifying attributes change. `Beta` renders `tag:nth-of-type(n)` only and
/// survives attribute edits. Pseudo tags (`*T`, `*D`, ...) have no selector.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralSelector;

impl StructuralSelector {
    fn segment(input: &SelectorInput, variant: SelectorVariant) -> String {
        let mut segment = input.tag.to_ascii_lowercase();
        if variant == SelectorVariant::Alpha {
            if let Some(id) = input.attribute("id").filter(|id| !id.is_empty()) {
                segment.push('#');
                segment.push_str(id);
            }
            if let Some(class) = input.attribute("class") {
                for name in class.split_whitespace() {
                    segment.push('.');
                    segment.push_str(name);
                }
            }
        }
        if input.position > 1 {
            segment.push_str(&format!(":nth-of-type({})", input.position));
        }
        segment
    }
}

impl SelectorPort for StructuralSelector {
    fn get(&self, input: &SelectorInput, variant: SelectorVariant) -> Option<String> {
        if input.tag.is_empty() || input.tag.starts_with('*') {
            return None;
        }
        let segment = Self::segment(input, variant);
        match input.prefix_of(variant) {
            Some(prefix) => Some(format!("{prefix}>{segment}")),
            None => Some(segment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeInfo, NodeMeta};
    use pagemirror_core_types::Privacy;

    fn record(id: u32, tag: &str, position: Option<u32>) -> NodeValue {
        NodeValue {
            id: NodeId(id),
            parent: None,
            previous: None,
            children: Vec::new(),
            data: NodeInfo::new(tag),
            selector: None,
            hash: None,
            region: None,
            metadata: NodeMeta {
                active: true,
                suspend: false,
                privacy: Privacy::None,
                position,
                fraud: None,
                size: None,
            },
        }
    }

    #[test]
    fn position_counts_same_tag_siblings_only() {
        let mut parent = record(1, "UL", Some(1));
        parent.children = vec![NodeId(2), NodeId(3), NodeId(4)];
        let first = record(2, "LI", Some(1));
        let other = record(3, "P", Some(1));
        let second = record(4, "LI", None);
        let siblings = [first.clone(), other.clone(), second.clone()];
        let lookup = |id: NodeId| siblings.iter().find(|s| s.id == id);

        assert_eq!(position(Some(&parent), &first, lookup), 1);
        assert_eq!(position(Some(&parent), &other, lookup), 1);
        assert_eq!(position(Some(&parent), &second, lookup), 2);
        assert_eq!(position(None, &second, lookup), 1);
    }

    #[test]
    fn variants_differ_on_attributes() {
        let input = SelectorInput {
            id: NodeId(5),
            tag: "DIV".into(),
            prefix: Some([Some("body".into()), Some("body".into())]),
            position: 2,
            attributes: Some(
                [("id", "main"), ("class", "a b")]
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        };
        let selector = StructuralSelector;
        assert_eq!(
            selector.get(&input, SelectorVariant::Alpha).as_deref(),
            Some("body>div#main.a.b:nth-of-type(2)")
        );
        assert_eq!(
            selector.get(&input, SelectorVariant::Beta).as_deref(),
            Some("body>div:nth-of-type(2)")
        );
    }

    #[test]
    fn pseudo_tags_have_no_selector() {
        let input = SelectorInput {
            id: NodeId(9),
            tag: "*T".into(),
            prefix: None,
            position: 1,
            attributes: None,
        };
        assert_eq!(StructuralSelector.get(&input, SelectorVariant::Alpha), None);
    }
}
