use crate::address::Address;
use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The two node kinds, as they appear in addresses (`text`, `if`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Text,
    #[serde(rename = "if")]
    Conditional,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Conditional => "if",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of a conditional node's three child forests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Condition,
    Then,
    Else,
}

impl Branch {
    pub const ALL: [Branch; 3] = [Branch::Condition, Branch::Then, Branch::Else];

    /// Address suffix appended after `-if` when descending into this branch
    pub fn suffix(&self) -> &'static str {
        match self {
            Branch::Condition => "cond",
            Branch::Then => "then",
            Branch::Else => "else",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "cond" => Some(Branch::Condition),
            "then" => Some(Branch::Then),
            "else" => Some(Branch::Else),
            _ => None,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

// ---------------------------------------------------------------------------
// Raw form (persisted / exchanged)
// ---------------------------------------------------------------------------

pub type RawForest = Vec<RawNode>;

/// Serializable template node. Every field may be absent or `null` on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawNode {
    #[serde(rename = "TEXT")]
    Text {
        #[serde(default, deserialize_with = "null_as_default")]
        text: String,
    },

    #[serde(rename = "IF")]
    Conditional {
        #[serde(
            default,
            rename = "condition",
            alias = "condBranch",
            deserialize_with = "null_as_default"
        )]
        condition: RawForest,
        #[serde(
            default,
            rename = "then",
            alias = "thenBranch",
            deserialize_with = "null_as_default"
        )]
        then: RawForest,
        #[serde(
            default,
            rename = "else",
            alias = "elseBranch",
            deserialize_with = "null_as_default"
        )]
        otherwise: RawForest,
    },
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawNode {
    pub fn text(text: impl Into<String>) -> Self {
        RawNode::Text { text: text.into() }
    }

    pub fn conditional(condition: RawForest, then: RawForest, otherwise: RawForest) -> Self {
        RawNode::Conditional {
            condition,
            then,
            otherwise,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            RawNode::Text { .. } => NodeKind::Text,
            RawNode::Conditional { .. } => NodeKind::Conditional,
        }
    }
}

// ---------------------------------------------------------------------------
// Working form (addressed)
// ---------------------------------------------------------------------------

pub type Forest = Vec<Node>;

/// Text fragment. The fingerprint always matches the current text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextNode {
    address: Address,
    fingerprint: Fingerprint,
    text: String,
}

impl TextNode {
    /// Create an unaddressed text node; the next reindex assigns its address
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            address: Address::root(),
            fingerprint: Fingerprint::of(&text),
            text,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text and refresh the fingerprint
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.fingerprint = Fingerprint::of(&self.text);
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub(crate) fn set_address(&mut self, address: Address) {
        self.address = address;
    }

    pub(crate) fn refresh_fingerprint(&mut self) {
        self.fingerprint = Fingerprint::of(&self.text);
    }
}

/// Conditional node. None of its branches is ever empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalNode {
    address: Address,
    condition: Forest,
    then: Forest,
    #[serde(rename = "else")]
    otherwise: Forest,
}

impl ConditionalNode {
    /// Conditional whose three branches each hold a single empty text node
    pub fn empty() -> Self {
        Self::with_branches(Forest::new(), Forest::new(), Forest::new())
    }

    /// Build from branch forests, substituting the default for empty ones
    pub fn with_branches(condition: Forest, then: Forest, otherwise: Forest) -> Self {
        Self {
            address: Address::root(),
            condition: non_empty(condition),
            then: non_empty(then),
            otherwise: non_empty(otherwise),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn condition(&self) -> &[Node] {
        &self.condition
    }

    pub fn then(&self) -> &[Node] {
        &self.then
    }

    pub fn otherwise(&self) -> &[Node] {
        &self.otherwise
    }

    pub fn branch(&self, branch: Branch) -> &[Node] {
        match branch {
            Branch::Condition => &self.condition,
            Branch::Then => &self.then,
            Branch::Else => &self.otherwise,
        }
    }

    pub(crate) fn branch_mut(&mut self, branch: Branch) -> &mut Forest {
        match branch {
            Branch::Condition => &mut self.condition,
            Branch::Then => &mut self.then,
            Branch::Else => &mut self.otherwise,
        }
    }

    pub(crate) fn set_address(&mut self, address: Address) {
        self.address = address;
    }
}

fn non_empty(forest: Forest) -> Forest {
    if forest.is_empty() {
        vec![Node::text("")]
    } else {
        forest
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "TEXT")]
    Text(TextNode),

    #[serde(rename = "IF")]
    Conditional(ConditionalNode),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode::new(text))
    }

    pub fn empty_conditional() -> Self {
        Node::Conditional(ConditionalNode::empty())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Text(_) => NodeKind::Text,
            Node::Conditional(_) => NodeKind::Conditional,
        }
    }

    pub fn address(&self) -> &Address {
        match self {
            Node::Text(node) => node.address(),
            Node::Conditional(node) => node.address(),
        }
    }

    /// Text content, for text nodes only
    pub fn text_content(&self) -> Option<&str> {
        self.as_text().map(TextNode::text)
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(node) => Some(node),
            Node::Conditional(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextNode> {
        match self {
            Node::Text(node) => Some(node),
            Node::Conditional(_) => None,
        }
    }

    pub fn as_conditional(&self) -> Option<&ConditionalNode> {
        match self {
            Node::Conditional(node) => Some(node),
            Node::Text(_) => None,
        }
    }
}

/// Addressed working tree
///
/// Edits never mutate a `Template` observed by the caller: the editor clones,
/// changes the clone, reindexes it and hands the new value back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Template {
    nodes: Forest,
}

impl Template {
    /// Build from a raw forest; `None` or an empty forest gives the default template
    pub fn from_raw(raw: Option<&[RawNode]>) -> Self {
        Self {
            nodes: crate::normalize::normalize(raw),
        }
    }

    pub fn to_raw(&self) -> RawForest {
        crate::normalize::denormalize(&self.nodes)
    }

    /// Wrap an already built forest, reindexing it
    pub fn from_nodes(nodes: Forest) -> Self {
        let mut template = Self {
            nodes: non_empty(nodes),
        };
        template.reindex();
        template
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access to the root forest.
    ///
    /// Structural changes made through this must be followed by [`Template::reindex`]
    /// before any address is read again.
    pub fn nodes_mut(&mut self) -> &mut Forest {
        &mut self.nodes
    }

    /// Recompute every address and fingerprint from current structure
    pub fn reindex(&mut self) {
        if self.nodes.is_empty() {
            self.nodes.push(Node::text(""));
        }
        crate::normalize::reindex(&mut self.nodes);
    }

    pub fn reindexed(mut self) -> Self {
        self.reindex();
        self
    }

    /// Visit every node in document order, descending condition → then → else
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(usize, &'a Node)) {
        fn walk_forest<'a>(forest: &'a [Node], depth: usize, visit: &mut impl FnMut(usize, &'a Node)) {
            for node in forest {
                visit(depth, node);
                if let Node::Conditional(conditional) = node {
                    for branch in Branch::ALL {
                        walk_forest(conditional.branch(branch), depth + 1, visit);
                    }
                }
            }
        }

        walk_forest(&self.nodes, 0, visit);
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::from_raw(None)
    }
}

impl AsRef<[Node]> for Template {
    fn as_ref(&self) -> &[Node] {
        &self.nodes
    }
}

// ---------------------------------------------------------------------------
// Shared read-only shape for consumers that accept either form
// ---------------------------------------------------------------------------

pub enum NodeView<'a, N> {
    Text(&'a str),
    Conditional {
        condition: &'a [N],
        then: &'a [N],
        otherwise: &'a [N],
    },
}

/// Implemented by both raw and working nodes so the interpreter can walk either
pub trait TemplateNode: Sized {
    fn view(&self) -> NodeView<'_, Self>;
}

impl TemplateNode for RawNode {
    fn view(&self) -> NodeView<'_, Self> {
        match self {
            RawNode::Text { text } => NodeView::Text(text),
            RawNode::Conditional {
                condition,
                then,
                otherwise,
            } => NodeView::Conditional {
                condition,
                then,
                otherwise,
            },
        }
    }
}

impl TemplateNode for Node {
    fn view(&self) -> NodeView<'_, Self> {
        match self {
            Node::Text(node) => NodeView::Text(node.text()),
            Node::Conditional(node) => NodeView::Conditional {
                condition: node.condition(),
                then: node.then(),
                otherwise: node.otherwise(),
            },
        }
    }
}
