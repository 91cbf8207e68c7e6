//! # Node Addresses
//!
//! A node's address is the path of sibling positions leading to it:
//!
//! ```text
//! path    := ( "/" index "-" kind branch? )*
//! kind    := "text" | "if"
//! branch  := "-cond" | "-then" | "-else"      (only on "if", only before another segment)
//! ```
//!
//! `/1-if-then/0-text` is the first node of the `then` branch of the
//! conditional at root position 1. The root forest has the empty prefix.
//!
//! Addresses are derived, not stored identities: any insert or delete changes
//! the addresses of the nodes after it, so an address is only valid against
//! the template value it was read from.

use crate::ast::{Branch, NodeKind};
use crate::error::{AddressError, AddressResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

/// One decoded `/index-kind[-branch]` step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub kind: NodeKind,
    /// Branch to continue into; present on every segment except the last
    pub branch: Option<Branch>,
}

impl Address {
    /// Empty prefix of the root forest (addresses no node)
    pub fn root() -> Self {
        Address(String::new())
    }

    /// Address of the first root text node, where editing starts
    pub fn first_text() -> Self {
        Address::root().child(0, NodeKind::Text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Append the segment for the node at `index` of the forest this prefix names
    pub fn child(&self, index: usize, kind: NodeKind) -> Address {
        Address(format!("{}/{}-{}", self.0, index, kind))
    }

    /// Prefix for the children of one branch of the conditional at this address
    pub fn branch(&self, branch: Branch) -> Address {
        Address(format!("{}-{}", self.0, branch.suffix()))
    }

    /// Address of another node in the same forest
    pub fn sibling(&self, index: usize, kind: NodeKind) -> Address {
        let prefix = match self.0.rfind('/') {
            Some(pos) => Address(self.0[..pos].to_string()),
            None => Address::root(),
        };
        prefix.child(index, kind)
    }

    /// Decode into segments, validating the grammar
    pub fn segments(&self) -> AddressResult<Vec<Segment>> {
        let raw = self.0.as_str();
        let tail = raw
            .strip_prefix('/')
            .ok_or_else(|| AddressError::malformed(raw, "must start with '/'"))?;

        let parts: Vec<&str> = tail.split('/').collect();
        let last = parts.len() - 1;

        parts
            .iter()
            .enumerate()
            .map(|(position, part)| {
                let segment = Segment::parse(part).ok_or_else(|| {
                    AddressError::malformed(raw, format!("invalid segment '{}'", part))
                })?;

                match (segment.branch, position == last) {
                    (Some(branch), true) => Err(AddressError::malformed(
                        raw,
                        format!("ends inside the '{}' branch", branch),
                    )),
                    (None, false) => Err(AddressError::malformed(
                        raw,
                        format!("segment '{}' has no branch to descend into", part),
                    )),
                    _ => Ok(segment),
                }
            })
            .collect()
    }

    /// Number of segments (0 for the root prefix or an undecodable address)
    pub fn depth(&self) -> usize {
        self.segments().map(|segments| segments.len()).unwrap_or(0)
    }
}

impl Segment {
    fn parse(part: &str) -> Option<Segment> {
        let (index, rest) = part.split_once('-')?;
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // one spelling per position: "/01-text" is not "/1-text"
        if index.len() > 1 && index.starts_with('0') {
            return None;
        }
        let index = index.parse().ok()?;

        let (kind, branch) = match rest {
            "text" => (NodeKind::Text, None),
            "if" => (NodeKind::Conditional, None),
            _ => {
                let suffix = rest.strip_prefix("if-")?;
                (NodeKind::Conditional, Some(Branch::from_suffix(suffix)?))
            }
        };

        Some(Segment { index, kind, branch })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}-{}", self.index, self.kind)?;
        if let Some(branch) = self.branch {
            write!(f, "-{}", branch)?;
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = Address(s.to_string());
        address.segments()?;
        Ok(address)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Address(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Address {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
