//! Outline tree construction.
//!
//! The token stream is flat: headings never close over the content that
//! belongs to them and top-level lists stay open. Building happens in two
//! passes over an explicit stack of drafts.
//!
//! 1. [`reduce_tokens`] pushes a draft for every block open and attaches it to
//!    the draft below on close. Top-level heading closes and top-level list
//!    closes are skipped, so those drafts are left on the stack.
//! 2. [`renest_by_level`] folds the leftover stack by heading rank: a draft is
//!    attached to its stack neighbour only when its rank is strictly deeper;
//!    otherwise it waits in a pending queue until its neighbour has been
//!    placed.
//!
//! Lists never survive as nodes. They are flattened into their items when the
//! drafts are turned into [`Node`]s.

use std::collections::VecDeque;

use crate::token::{BlockTag, InlineLeaf, Token};
use crate::xml::escape_html;

pub const ROOT_LABEL: &str = "Root";

/// Semantic rank used to decide parent/child relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Root,
    Heading(u8),
    Ungraded,
}

impl Level {
    pub fn rank(self) -> u8 {
        match self {
            Level::Root => 0,
            Level::Heading(n) => n,
            Level::Ungraded => 7,
        }
    }

    fn of(tag: BlockTag) -> Self {
        match tag {
            BlockTag::Heading(n) => Level::Heading(n),
            _ => Level::Ungraded,
        }
    }
}

/// One entry of the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Plain text, or an inline HTML fragment when `rich_content` is set.
    pub label: String,
    pub rich_content: bool,
    pub level: Level,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rich_content: false,
            level: Level::Ungraded,
            children: Vec::new(),
        }
    }

    pub fn rich(html: impl Into<String>) -> Self {
        Self {
            rich_content: true,
            ..Self::text(html)
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// True for the artificial node wrapping several top-level blocks.
    pub fn is_synthetic_root(&self) -> bool {
        self.level == Level::Root
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Label {
    text: String,
    rich: bool,
}

impl Label {
    fn from_leaves(leaves: &[InlineLeaf]) -> Self {
        let rich = leaves.iter().any(InlineLeaf::is_markup);
        let mut text = String::new();
        for leaf in leaves {
            match leaf {
                InlineLeaf::Text(content) if rich => text.push_str(&escape_html(content)),
                InlineLeaf::Text(content) => text.push_str(content),
                InlineLeaf::Open { tag, attrs } => {
                    text.push('<');
                    text.push_str(tag);
                    for (name, value) in attrs {
                        text.push_str(&format!(" {name}=\"{}\"", escape_html(value)));
                    }
                    text.push('>');
                }
                InlineLeaf::Close { tag } => {
                    text.push_str("</");
                    text.push_str(tag);
                    text.push('>');
                }
            }
        }
        Self {
            text: collapse_whitespace(&text),
            rich,
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DraftKind {
    Root,
    List,
    ListItem,
    Block,
}

#[derive(Debug)]
struct Draft {
    kind: DraftKind,
    level: Level,
    label: Label,
    children: Vec<Draft>,
}

impl Draft {
    fn root() -> Self {
        Self {
            kind: DraftKind::Root,
            level: Level::Root,
            label: Label {
                text: ROOT_LABEL.to_string(),
                rich: false,
            },
            children: Vec::new(),
        }
    }

    fn open(tag: BlockTag) -> Self {
        let kind = match tag {
            BlockTag::BulletList | BlockTag::OrderedList => DraftKind::List,
            BlockTag::ListItem => DraftKind::ListItem,
            _ => DraftKind::Block,
        };
        Self {
            kind,
            level: Level::of(tag),
            label: Label::default(),
            children: Vec::new(),
        }
    }

    fn empty_content() -> Self {
        Self::open(BlockTag::Paragraph)
    }

    fn into_nodes(self) -> Vec<Node> {
        match self.kind {
            DraftKind::List => flatten_list(self.children),
            DraftKind::ListItem => vec![ItemShape::from_item(self).into_node()],
            DraftKind::Root | DraftKind::Block => vec![self.into_node()],
        }
    }

    fn into_node(self) -> Node {
        Node {
            label: self.label.text,
            rich_content: self.label.rich,
            level: self.level,
            children: self.children.into_iter().flat_map(Draft::into_nodes).collect(),
        }
    }
}

/// What a list item holds once it is closed.
#[derive(Debug)]
enum ItemShape {
    ContentOnly(Draft),
    ContentWithNestedList { content: Draft, nested: Vec<Draft> },
}

impl ItemShape {
    fn new(content: Draft, nested: Vec<Draft>) -> Self {
        if nested.is_empty() {
            ItemShape::ContentOnly(content)
        } else {
            ItemShape::ContentWithNestedList { content, nested }
        }
    }

    fn from_item(item: Draft) -> Self {
        let mut children = item.children.into_iter();
        match children.next() {
            Some(first) if first.kind != DraftKind::List => Self::new(first, children.collect()),
            // An item opening straight into a nested list, or an empty item.
            first => {
                let nested = first.into_iter().chain(children).collect();
                Self::new(Draft::empty_content(), nested)
            }
        }
    }

    fn into_node(self) -> Node {
        match self {
            ItemShape::ContentOnly(content) => content.into_node(),
            ItemShape::ContentWithNestedList { content, nested } => {
                let mut node = content.into_node();
                node.children
                    .extend(nested.into_iter().flat_map(Draft::into_nodes));
                node
            }
        }
    }
}

/// Replaces a list wrapper by its items' content nodes.
fn flatten_list(items: Vec<Draft>) -> Vec<Node> {
    items.into_iter().flat_map(Draft::into_nodes).collect()
}

/// Builds the outline for a token stream.
///
/// A document with a single top-level block yields that block as the root.
/// Otherwise the result is a synthetic root labelled [`ROOT_LABEL`].
pub fn build_tree<I>(tokens: I) -> Node
where
    I: IntoIterator<Item = Token>,
{
    let stack = reduce_tokens(tokens);
    let root = renest_by_level(stack);
    let mut root = root.into_node();
    tracing::debug!(top_level = root.children.len(), "outline built");
    if root.children.len() == 1 {
        if let Some(only) = root.children.pop() {
            return only;
        }
    }
    root
}

fn reduce_tokens<I>(tokens: I) -> Vec<Draft>
where
    I: IntoIterator<Item = Token>,
{
    let mut stack = vec![Draft::root()];
    for token in tokens {
        match token {
            Token::Open { tag, .. } => stack.push(Draft::open(tag)),
            Token::Inline(leaves) => {
                if stack.len() > 1 {
                    if let Some(top) = stack.last_mut() {
                        top.label = Label::from_leaves(&leaves);
                    }
                }
            }
            Token::Close { tag, level } => {
                if level == 0 && (tag.is_heading() || tag.is_list()) {
                    continue;
                }
                if stack.len() < 2 {
                    continue;
                }
                if let Some(draft) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(draft);
                    }
                }
            }
        }
    }
    tracing::debug!(open = stack.len(), "token stream reduced");
    stack
}

fn renest_by_level(mut stack: Vec<Draft>) -> Draft {
    let mut pending: VecDeque<Draft> = VecDeque::new();
    while stack.len() > 1 {
        let Some(draft) = stack.pop() else { break };
        let Some(top) = stack.last_mut() else { break };
        if draft.level.rank() > top.level.rank() {
            top.children.push(draft);
            stack.extend(pending.drain(..));
        } else {
            pending.push_front(draft);
        }
    }
    // Nothing ranks at or above the root, so every draft found a parent.
    debug_assert!(pending.is_empty());
    match stack.pop() {
        Some(root) => root,
        None => Draft::root(),
    }
}
