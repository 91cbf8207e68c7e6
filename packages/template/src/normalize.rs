//! # Builder / Normalizer
//!
//! Converts between the raw (persisted) forest and the addressed working
//! forest, and recomputes derived fields after structural edits.
//!
//! Normalization substitutes a single empty text node for every absent or
//! empty forest, so no conditional branch is ever empty. Denormalization emits
//! exactly what the working tree holds.

use crate::address::Address;
use crate::ast::{Branch, ConditionalNode, Forest, Node, NodeKind, RawForest, RawNode, TextNode};
use tracing::trace;

/// Build an addressed working forest from a raw forest
pub fn normalize(raw: Option<&[RawNode]>) -> Forest {
    normalize_forest(raw.unwrap_or_default(), &Address::root())
}

fn normalize_forest(raw: &[RawNode], prefix: &Address) -> Forest {
    if raw.is_empty() {
        let mut node = TextNode::new("");
        node.set_address(prefix.child(0, NodeKind::Text));
        return vec![Node::Text(node)];
    }

    raw.iter()
        .enumerate()
        .map(|(index, node)| {
            let address = prefix.child(index, node.kind());
            match node {
                RawNode::Text { text } => {
                    let mut text_node = TextNode::new(text.as_str());
                    text_node.set_address(address);
                    Node::Text(text_node)
                }
                RawNode::Conditional {
                    condition,
                    then,
                    otherwise,
                } => {
                    let mut conditional = ConditionalNode::with_branches(
                        normalize_forest(condition, &address.branch(Branch::Condition)),
                        normalize_forest(then, &address.branch(Branch::Then)),
                        normalize_forest(otherwise, &address.branch(Branch::Else)),
                    );
                    conditional.set_address(address);
                    Node::Conditional(conditional)
                }
            }
        })
        .collect()
}

/// Strip derived fields, producing the raw shape used for persistence
pub fn denormalize(forest: &[Node]) -> RawForest {
    forest
        .iter()
        .map(|node| match node {
            Node::Text(text) => RawNode::text(text.text()),
            Node::Conditional(conditional) => RawNode::conditional(
                denormalize(conditional.condition()),
                denormalize(conditional.then()),
                denormalize(conditional.otherwise()),
            ),
        })
        .collect()
}

/// Recompute every address and text fingerprint from current structure.
///
/// Content is left untouched. Running it twice gives the same tree as once.
pub fn reindex(forest: &mut [Node]) {
    trace!(roots = forest.len(), "Reindexing template");
    reindex_forest(forest, &Address::root());
}

fn reindex_forest(forest: &mut [Node], prefix: &Address) {
    for (index, node) in forest.iter_mut().enumerate() {
        let address = prefix.child(index, node.kind());
        match node {
            Node::Text(text) => {
                text.refresh_fingerprint();
                text.set_address(address);
            }
            Node::Conditional(conditional) => {
                for branch in Branch::ALL {
                    let forest = conditional.branch_mut(branch);
                    if forest.is_empty() {
                        forest.push(Node::text(""));
                    }
                    reindex_forest(forest, &address.branch(branch));
                }
                conditional.set_address(address);
            }
        }
    }
}
