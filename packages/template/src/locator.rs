//! # Node Locator
//!
//! Resolves an address by walking it segment by segment from the root
//! forest. Cost is proportional to the address depth, not the tree size.

use crate::address::{Address, Segment};
use crate::ast::{Branch, Forest, Node, NodeKind};
use crate::error::{AddressError, AddressResult};

/// A resolved node together with the forest that owns it
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub node: &'a Node,
    pub parent: &'a [Node],
    pub index: usize,
}

/// Mutable resolution: the owning forest and the node's position in it.
///
/// Splicing `parent` is a structural change; reindex afterwards.
#[derive(Debug)]
pub struct LocatedMut<'a> {
    pub parent: &'a mut Forest,
    pub index: usize,
}

impl<'a> LocatedMut<'a> {
    pub fn node(&mut self) -> &mut Node {
        &mut self.parent[self.index]
    }
}

/// Find the node at `address` without mutating the forest
pub fn locate<'a>(forest: &'a [Node], address: &Address) -> AddressResult<Located<'a>> {
    let segments = address.segments()?;
    let (target, path) = split_target(address, &segments)?;

    let mut forest = forest;
    let mut prefix = Address::root();

    for segment in path {
        let at = check(forest, &prefix, segment)?;
        forest = match &forest[segment.index] {
            Node::Conditional(conditional) => {
                let branch = descend(address, segment)?;
                prefix = at.branch(branch);
                conditional.branch(branch)
            }
            Node::Text(_) => return Err(mismatch(at, segment.kind, NodeKind::Text)),
        };
    }

    check(forest, &prefix, target)?;
    Ok(Located {
        node: &forest[target.index],
        parent: forest,
        index: target.index,
    })
}

/// Find the node at `address`, returning mutable access to its owning forest
pub fn locate_mut<'a>(forest: &'a mut Forest, address: &Address) -> AddressResult<LocatedMut<'a>> {
    let segments = address.segments()?;
    let (target, path) = split_target(address, &segments)?;

    let mut forest = forest;
    let mut prefix = Address::root();

    for segment in path {
        let at = check(forest, &prefix, segment)?;
        let current = forest;
        forest = match &mut current[segment.index] {
            Node::Conditional(conditional) => {
                let branch = descend(address, segment)?;
                prefix = at.branch(branch);
                conditional.branch_mut(branch)
            }
            Node::Text(_) => return Err(mismatch(at, segment.kind, NodeKind::Text)),
        };
    }

    check(forest, &prefix, target)?;
    Ok(LocatedMut {
        parent: forest,
        index: target.index,
    })
}

fn split_target<'s>(address: &Address, segments: &'s [Segment]) -> AddressResult<(&'s Segment, &'s [Segment])> {
    segments
        .split_last()
        .ok_or_else(|| AddressError::malformed(address.as_str(), "no segments"))
}

/// Verify the segment's index is in range and its kind matches the node there
fn check(forest: &[Node], prefix: &Address, segment: &Segment) -> AddressResult<Address> {
    let at = prefix.child(segment.index, segment.kind);
    let node = forest.get(segment.index).ok_or_else(|| AddressError::IndexOutOfRange {
        at: at.clone(),
        index: segment.index,
        len: forest.len(),
    })?;

    if node.kind() != segment.kind {
        return Err(mismatch(at, segment.kind, node.kind()));
    }
    Ok(at)
}

fn descend(address: &Address, segment: &Segment) -> AddressResult<Branch> {
    segment
        .branch
        .ok_or_else(|| AddressError::malformed(address.as_str(), "missing branch suffix"))
}

fn mismatch(at: Address, expected: NodeKind, found: NodeKind) -> AddressError {
    AddressError::KindMismatch { at, expected, found }
}
