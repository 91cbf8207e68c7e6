//! # Missive Template
//!
//! Data model for message templates: a tree of text fragments and
//! conditional branches.
//!
//! ## Two forms
//!
//! ```text
//! RawNode (serde, persisted)  ──normalize──▶  Node (addressed, fingerprinted)
//!            ▲                                        │
//!            └───────────────denormalize──────────────┘
//! ```
//!
//! Every working node carries an [`Address`] derived from its structural
//! position (`/1-if-then/0-text`). Addresses are recomputed by [`reindex`]
//! after every structural change, so an address is only meaningful against
//! the exact [`Template`] value it was read from.
//!
//! ## Usage
//!
//! ```rust
//! use missive_template::{parse, locate, Address};
//!
//! let template = parse(r#"[{"type":"TEXT","text":"Hello, {firstname}."}]"#).unwrap();
//! let found = locate(template.nodes(), &Address::first_text()).unwrap();
//! assert_eq!(found.node.text_content(), Some("Hello, {firstname}."));
//! ```

pub mod address;
pub mod ast;
pub mod error;
pub mod fingerprint;
pub mod locator;
pub mod normalize;
pub mod serializer;

#[cfg(test)]
mod tests_properties;

pub use address::{Address, Segment};
pub use ast::{
    Branch, ConditionalNode, Forest, Node, NodeKind, NodeView, RawForest, RawNode, Template,
    TemplateNode, TextNode,
};
pub use error::{AddressError, AddressResult, TemplateError, TemplateResult};
pub use fingerprint::Fingerprint;
pub use locator::{locate, locate_mut, Located, LocatedMut};
pub use normalize::{denormalize, normalize, reindex};
pub use serializer::{parse, parse_raw, stringify, stringify_pretty};
