//! # Template Mutations
//!
//! The four structural edits a message template supports.
//!
//! ## Design Principles
//!
//! 1. **Value semantics**: every edit clones the input, changes the clone and
//!    returns it; the caller's template is never touched
//! 2. **Reindexed output**: splits and merges reindex before returning, so
//!    every address in the result is current
//! 3. **Not-found is normal**: an address from before another edit may no
//!    longer resolve; that comes back as `Err(MutationError)`, never a panic
//!
//! ## Mutation Semantics
//!
//! ### InsertText / ReplaceText
//! - Target must be a text node
//! - Only the node's text and fingerprint change; no reindex needed
//!
//! ### InsertConditional
//! - Splits the target text at the caret into `before`, a new empty
//!   conditional, and `after`
//! - Focus moves to the first text of the new condition branch
//!
//! ### DeleteConditional
//! - Merges `[prev text?] + conditional + [next text?]` into one text node
//! - Always leaves a text node at the seam, even if both neighbours are
//!   conditionals
//! - Focus lands where the conditional used to be

use missive_template::{
    locate, locate_mut, Address, AddressError, Branch, Node, NodeKind, Template,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Structural edits, addressed against a specific template value.
///
/// `caret` counts chars (Unicode scalar values) and is clamped to the end of
/// the text. Hosts that track UTF-16 offsets convert with [`caret_from_utf16`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Splice a literal into a text node at a caret offset
    InsertText {
        address: Address,
        caret: usize,
        text: String,
    },

    /// Set a text node's text verbatim
    ReplaceText { address: Address, text: String },

    /// Split a text node around a new empty conditional
    InsertConditional { address: Address, caret: usize },

    /// Remove a conditional, merging its neighbouring text
    DeleteConditional { address: Address },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("Node is not text: {0}")]
    NotText(Address),

    #[error("Node is not a conditional: {0}")]
    NotConditional(Address),
}

impl MutationError {
    pub fn is_malformed_address(&self) -> bool {
        matches!(self, MutationError::Address(err) if err.is_malformed())
    }

    /// The address did not resolve, or resolved to the wrong kind of node
    pub fn is_structural_mismatch(&self) -> bool {
        !self.is_malformed_address()
    }
}

/// Where editing should continue after a mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Focus {
    pub address: Address,
    pub caret: usize,
}

impl Focus {
    pub fn new(address: Address, caret: usize) -> Self {
        Self { address, caret }
    }
}

/// New template produced by [`Mutation::apply`]
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub template: Template,
    pub focus: Option<Focus>,
}

/// Result of applying a mutation to a [`crate::Document`]
#[derive(Debug, Clone)]
pub struct MutationResult {
    /// New version number
    pub version: u64,

    /// Where the caret belongs in the new version, if the edit decides it
    pub focus: Option<Focus>,
}

/// Result of [`insert_conditional`]
#[derive(Debug, Clone)]
pub struct Inserted {
    pub template: Template,
    /// First text node of the new conditional's condition branch
    pub focus: Address,
}

/// Result of [`delete_conditional`]
#[derive(Debug, Clone)]
pub struct Deleted {
    pub template: Template,
    /// The merged text node
    pub focus: Address,
    /// Offset of the seam inside the merged text
    pub caret: usize,
}

impl Mutation {
    pub fn address(&self) -> &Address {
        match self {
            Mutation::InsertText { address, .. }
            | Mutation::ReplaceText { address, .. }
            | Mutation::InsertConditional { address, .. }
            | Mutation::DeleteConditional { address } => address,
        }
    }

    /// Get a debug name for this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertText { .. } => "insert_text",
            Mutation::ReplaceText { .. } => "replace_text",
            Mutation::InsertConditional { .. } => "insert_conditional",
            Mutation::DeleteConditional { .. } => "delete_conditional",
        }
    }

    /// Apply to a template, producing a new one
    pub fn apply(&self, template: &Template) -> Result<MutationOutcome, MutationError> {
        let result = match self {
            Mutation::InsertText {
                address,
                caret,
                text,
            } => splice_text(template, address, *caret, text).map(|(template, caret)| {
                MutationOutcome {
                    template,
                    focus: Some(Focus::new(address.clone(), caret)),
                }
            }),

            Mutation::ReplaceText { address, text } => {
                replace_text(template, address, text).map(|template| MutationOutcome {
                    template,
                    focus: None,
                })
            }

            Mutation::InsertConditional { address, caret } => {
                insert_conditional(template, address, *caret).map(|inserted| MutationOutcome {
                    template: inserted.template,
                    focus: Some(Focus::new(inserted.focus, 0)),
                })
            }

            Mutation::DeleteConditional { address } => {
                delete_conditional(template, address).map(|deleted| MutationOutcome {
                    template: deleted.template,
                    focus: Some(Focus::new(deleted.focus, deleted.caret)),
                })
            }
        };

        match &result {
            Ok(_) => debug!(op = self.name(), address = %self.address(), "Applied mutation"),
            Err(err) => warn!(op = self.name(), address = %self.address(), error = %err, "Mutation did not apply"),
        }
        result
    }

    /// Check that this mutation would apply, without building a new template
    pub fn validate(&self, template: &Template) -> Result<(), MutationError> {
        let address = self.address();
        let found = locate(template.nodes(), address)?;

        match (self, found.node) {
            (Mutation::DeleteConditional { .. }, Node::Conditional(_)) => Ok(()),
            (Mutation::DeleteConditional { .. }, Node::Text(_)) => {
                Err(MutationError::NotConditional(address.clone()))
            }
            (_, Node::Text(_)) => Ok(()),
            (_, Node::Conditional(_)) => Err(MutationError::NotText(address.clone())),
        }
    }
}

/// Byte index of the `caret`-th char, clamped to the end of the text
fn byte_offset(text: &str, caret: usize) -> usize {
    text.char_indices()
        .nth(caret)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Convert a UTF-16 code unit offset into `text` to a char caret.
///
/// An offset inside a surrogate pair rounds down to the char it splits;
/// offsets past the end clamp to the char count.
pub fn caret_from_utf16(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (caret, ch) in text.chars().enumerate() {
        seen += ch.len_utf16();
        if seen > units {
            return caret;
        }
    }
    text.chars().count()
}

/// Insert `literal` into the text node at `address`
pub fn insert_text(
    template: &Template,
    address: &Address,
    caret: usize,
    literal: &str,
) -> Result<Template, MutationError> {
    splice_text(template, address, caret, literal).map(|(template, _)| template)
}

/// Returns the new template and the caret just after the inserted literal
fn splice_text(
    template: &Template,
    address: &Address,
    caret: usize,
    literal: &str,
) -> Result<(Template, usize), MutationError> {
    let mut edited = template.clone();
    let mut found = locate_mut(edited.nodes_mut(), address)?;
    let node = found
        .node()
        .as_text_mut()
        .ok_or_else(|| MutationError::NotText(address.clone()))?;

    let at = byte_offset(node.text(), caret);
    let mut text = node.text().to_string();
    text.insert_str(at, literal);
    let caret = text[..at].chars().count() + literal.chars().count();
    node.set_text(text);

    Ok((edited, caret))
}

/// Set the text node at `address` to `text`
pub fn replace_text(
    template: &Template,
    address: &Address,
    text: &str,
) -> Result<Template, MutationError> {
    let mut edited = template.clone();
    let mut found = locate_mut(edited.nodes_mut(), address)?;
    found
        .node()
        .as_text_mut()
        .ok_or_else(|| MutationError::NotText(address.clone()))?
        .set_text(text);

    Ok(edited)
}

/// Split the text node at `address` around a new empty conditional
pub fn insert_conditional(
    template: &Template,
    address: &Address,
    caret: usize,
) -> Result<Inserted, MutationError> {
    let mut edited = template.clone();
    let found = locate_mut(edited.nodes_mut(), address)?;
    let index = found.index;

    let text = found.parent[index]
        .text_content()
        .ok_or_else(|| MutationError::NotText(address.clone()))?;
    let (before, after) = text.split_at(byte_offset(text, caret));
    let replacement = [Node::text(before), Node::empty_conditional(), Node::text(after)];

    found.parent.splice(index..=index, replacement);
    edited.reindex();

    let focus = address
        .sibling(index + 1, NodeKind::Conditional)
        .branch(Branch::Condition)
        .child(0, NodeKind::Text);

    Ok(Inserted {
        template: edited,
        focus,
    })
}

/// Remove the conditional at `address`, merging adjacent text nodes
pub fn delete_conditional(template: &Template, address: &Address) -> Result<Deleted, MutationError> {
    let mut edited = template.clone();
    let found = locate_mut(edited.nodes_mut(), address)?;
    let index = found.index;

    if found.parent[index].as_conditional().is_none() {
        return Err(MutationError::NotConditional(address.clone()));
    }

    let previous = index
        .checked_sub(1)
        .and_then(|i| found.parent[i].text_content());
    let next = found.parent.get(index + 1).and_then(Node::text_content);

    let start = if previous.is_some() { index - 1 } else { index };
    let end = if next.is_some() { index + 1 } else { index };

    let before = previous.unwrap_or_default().to_string();
    let merged = before.clone() + next.unwrap_or_default();
    let caret = before.chars().count();

    found.parent.splice(start..=end, [Node::text(merged)]);
    edited.reindex();

    Ok(Deleted {
        template: edited,
        focus: address.sibling(start, NodeKind::Text),
        caret,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use missive_template::parse;

    fn template(json: &str) -> Template {
        parse(json).unwrap()
    }

    fn text_at(template: &Template, address: &str) -> String {
        locate(template.nodes(), &Address::from(address))
            .unwrap()
            .node
            .text_content()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::InsertText {
            address: Address::from("/0-text"),
            caret: 3,
            text: "{firstname}".to_string(),
        };

        let json = serde_json::to_string(&mutation).unwrap();
        assert!(json.contains(r#""op":"insert_text""#));

        let deserialized: Mutation = serde_json::from_str(&json).unwrap();
        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_insert_text_at_caret() {
        let original = template(r#"[{"type":"TEXT","text":"Hello, ."}]"#);
        let edited = insert_text(&original, &Address::first_text(), 7, "{firstname}").unwrap();

        assert_eq!(text_at(&edited, "/0-text"), "Hello, {firstname}.");
        // input untouched
        assert_eq!(text_at(&original, "/0-text"), "Hello, .");
    }

    #[test]
    fn test_insert_text_clamps_caret() {
        let original = template(r#"[{"type":"TEXT","text":"ab"}]"#);
        let edited = insert_text(&original, &Address::first_text(), 99, "c").unwrap();
        assert_eq!(text_at(&edited, "/0-text"), "abc");
    }

    #[test]
    fn test_insert_text_counts_chars_not_bytes() {
        let original = template(r#"[{"type":"TEXT","text":"héllo"}]"#);
        let outcome = Mutation::InsertText {
            address: Address::first_text(),
            caret: 2,
            text: "ü".to_string(),
        }
        .apply(&original)
        .unwrap();

        assert_eq!(text_at(&outcome.template, "/0-text"), "héüllo");
        assert_eq!(outcome.focus, Some(Focus::new(Address::first_text(), 3)));
    }

    #[test]
    fn test_caret_from_utf16() {
        let text = "a😀b";

        assert_eq!(caret_from_utf16(text, 0), 0);
        assert_eq!(caret_from_utf16(text, 1), 1);
        // mid-surrogate rounds down
        assert_eq!(caret_from_utf16(text, 2), 1);
        assert_eq!(caret_from_utf16(text, 3), 2);
        assert_eq!(caret_from_utf16(text, 4), 3);
        assert_eq!(caret_from_utf16(text, 40), 3);
        assert_eq!(caret_from_utf16("héllo", 2), 2);
    }

    #[test]
    fn test_utf16_caret_after_emoji() {
        let original = template(r#"[{"type":"TEXT","text":"😀!"}]"#);
        let caret = caret_from_utf16("😀!", 2);
        let edited = insert_text(&original, &Address::first_text(), caret, "?").unwrap();

        assert_eq!(text_at(&edited, "/0-text"), "😀?!");
    }

    #[test]
    fn test_insert_text_refreshes_fingerprint() {
        let original = template(r#"[{"type":"TEXT","text":"a"}]"#);
        let edited = insert_text(&original, &Address::first_text(), 1, "b").unwrap();

        let node = edited.nodes()[0].as_text().unwrap();
        assert_eq!(node.fingerprint(), &missive_template::Fingerprint::of("ab"));
    }

    #[test]
    fn test_text_edits_reject_conditionals() {
        let original = template(r#"[{"type":"TEXT","text":"a"},{"type":"IF"}]"#);
        let address = Address::from("/1-if");

        assert_eq!(
            insert_text(&original, &address, 0, "x").unwrap_err(),
            MutationError::NotText(address.clone())
        );
        assert_eq!(
            replace_text(&original, &address, "x").unwrap_err(),
            MutationError::NotText(address.clone())
        );
        assert!(insert_conditional(&original, &address, 0).is_err());
    }

    #[test]
    fn test_replace_text() {
        let original = template(r#"[{"type":"IF","then":[{"type":"TEXT","text":"old"}]}]"#);
        let edited = replace_text(&original, &Address::from("/0-if-then/0-text"), "new").unwrap();
        assert_eq!(text_at(&edited, "/0-if-then/0-text"), "new");
    }

    #[test]
    fn test_insert_conditional_splits_text() {
        let original = template(r#"[{"type":"TEXT","text":"Hello world"}]"#);
        let inserted = insert_conditional(&original, &Address::first_text(), 5).unwrap();
        let nodes = inserted.template.nodes();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].text_content(), Some("Hello"));
        assert_eq!(nodes[1].kind(), NodeKind::Conditional);
        assert_eq!(nodes[2].text_content(), Some(" world"));
        assert_eq!(nodes[2].address(), &"/2-text");

        assert_eq!(inserted.focus, "/1-if-cond/0-text");
        assert_eq!(text_at(&inserted.template, inserted.focus.as_str()), "");
    }

    #[test]
    fn test_insert_conditional_at_edges_keeps_empty_texts() {
        let original = template(r#"[{"type":"TEXT","text":"abc"}]"#);

        let at_start = insert_conditional(&original, &Address::first_text(), 0).unwrap();
        assert_eq!(at_start.template.nodes()[0].text_content(), Some(""));
        assert_eq!(at_start.template.nodes()[2].text_content(), Some("abc"));

        let at_end = insert_conditional(&original, &Address::first_text(), 3).unwrap();
        assert_eq!(at_end.template.nodes()[0].text_content(), Some("abc"));
        assert_eq!(at_end.template.nodes()[2].text_content(), Some(""));
    }

    #[test]
    fn test_insert_conditional_in_nested_branch() {
        let original = template(r#"[{"type":"TEXT"},{"type":"IF","else":[{"type":"TEXT","text":"xy"}]}]"#);
        let inserted = insert_conditional(&original, &Address::from("/1-if-else/0-text"), 1).unwrap();

        assert_eq!(inserted.focus, "/1-if-else/1-if-cond/0-text");
        assert_eq!(text_at(&inserted.template, "/1-if-else/0-text"), "x");
        assert_eq!(text_at(&inserted.template, "/1-if-else/2-text"), "y");
        assert!(locate(inserted.template.nodes(), &inserted.focus).is_ok());
    }

    #[test]
    fn test_delete_conditional_merges_neighbours() {
        let original = template(
            r#"[{"type":"TEXT","text":"Hello"},{"type":"IF"},{"type":"TEXT","text":" world"}]"#,
        );
        let deleted = delete_conditional(&original, &Address::from("/1-if")).unwrap();

        assert_eq!(deleted.template.nodes().len(), 1);
        assert_eq!(text_at(&deleted.template, "/0-text"), "Hello world");
        assert_eq!(deleted.focus, "/0-text");
        assert_eq!(deleted.caret, 5);
    }

    #[test]
    fn test_delete_conditional_between_conditionals_leaves_empty_text() {
        let original = template(r#"[{"type":"IF"},{"type":"IF"},{"type":"IF"}]"#);
        let deleted = delete_conditional(&original, &Address::from("/1-if")).unwrap();
        let nodes = deleted.template.nodes();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1].text_content(), Some(""));
        assert_eq!(deleted.focus, "/1-text");
        assert_eq!(deleted.caret, 0);
    }

    #[test]
    fn test_delete_conditional_rejects_text() {
        let original = template(r#"[{"type":"TEXT","text":"a"}]"#);
        let err = delete_conditional(&original, &Address::first_text()).unwrap_err();
        assert_eq!(err, MutationError::NotConditional(Address::first_text()));
        assert!(err.is_structural_mismatch());
    }

    #[test]
    fn test_stale_address_is_not_found() {
        let original = template(r#"[{"type":"TEXT","text":"a"}]"#);
        let err = replace_text(&original, &Address::from("/4-text"), "x").unwrap_err();
        assert!(err.is_structural_mismatch());

        let err = replace_text(&original, &Address::from("four"), "x").unwrap_err();
        assert!(err.is_malformed_address());
    }

    #[test]
    fn test_validate_matches_apply() {
        let original = template(r#"[{"type":"TEXT","text":"a"},{"type":"IF"}]"#);
        let mutations = [
            Mutation::ReplaceText { address: "/0-text".into(), text: "b".into() },
            Mutation::ReplaceText { address: "/1-if".into(), text: "b".into() },
            Mutation::InsertConditional { address: "/0-text".into(), caret: 1 },
            Mutation::DeleteConditional { address: "/1-if".into() },
            Mutation::DeleteConditional { address: "/0-text".into() },
            Mutation::InsertText { address: "/7-text".into(), caret: 0, text: "x".into() },
        ];

        for mutation in mutations {
            assert_eq!(
                mutation.validate(&original).is_ok(),
                mutation.apply(&original).is_ok(),
                "{:?}",
                mutation
            );
        }
    }
}
