//! Property tests over generated template trees

use crate::ast::{RawForest, RawNode, Template};
use crate::locator::locate;
use crate::normalize::{denormalize, normalize};
use proptest::collection::vec;
use proptest::prelude::*;

fn arb_raw_node() -> impl Strategy<Value = RawNode> {
    let leaf = "[a-z {}.-]{0,12}".prop_map(|text| RawNode::text(text));
    leaf.prop_recursive(4, 48, 3, |inner| {
        (
            vec(inner.clone(), 0..3),
            vec(inner.clone(), 0..3),
            vec(inner, 0..3),
        )
            .prop_map(|(condition, then, otherwise)| RawNode::conditional(condition, then, otherwise))
    })
}

fn arb_raw_forest() -> impl Strategy<Value = RawForest> {
    vec(arb_raw_node(), 0..5)
}

/// What normalization is expected to turn a raw forest into
fn with_defaults(raw: &[RawNode]) -> RawForest {
    if raw.is_empty() {
        return vec![RawNode::text("")];
    }
    raw.iter()
        .map(|node| match node {
            RawNode::Text { text } => RawNode::text(text.as_str()),
            RawNode::Conditional {
                condition,
                then,
                otherwise,
            } => RawNode::conditional(
                with_defaults(condition),
                with_defaults(then),
                with_defaults(otherwise),
            ),
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_round_trip_up_to_defaults(raw in arb_raw_forest()) {
        let once = denormalize(&normalize(Some(raw.as_slice())));
        prop_assert_eq!(&once, &with_defaults(&raw));

        let twice = denormalize(&normalize(Some(once.as_slice())));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_reindex_is_idempotent(raw in arb_raw_forest()) {
        let template = Template::from_raw(Some(raw.as_slice()));
        let once = template.clone().reindexed();
        let twice = once.clone().reindexed();

        prop_assert_eq!(&template, &once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_every_address_locates_its_node(raw in arb_raw_forest()) {
        let template = Template::from_raw(Some(raw.as_slice()));
        let mut addresses = Vec::new();

        template.walk(&mut |_, node| {
            let found = locate(template.nodes(), node.address()).expect("reindexed address resolves");
            assert!(std::ptr::eq(found.node, node));
            addresses.push(node.address().clone());
        });

        let total = addresses.len();
        addresses.sort();
        addresses.dedup();
        prop_assert_eq!(addresses.len(), total, "addresses are unique");
    }
}
