//! Arena-backed document tree.
//!
//! Every block and inline element lives in a single `Vec<Node>` owned by a
//! [`Tree`] and is addressed by a [`NodeId`]. Parent, sibling, and child links
//! are stored as ids, so relinking a node is O(1) and there are no ownership
//! cycles. Unlinked nodes stay in the arena but are unreachable from the root.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::walker::{Walk, WalkEvent, Walker};

/// Stable handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of every tree.
    Document,
    /// `>` block quote.
    BlockQuote,
    /// ATX header, level 1-6.
    Header,
    /// Paragraph of inline content.
    Paragraph,
    /// Thematic break.
    HorizontalRule,
    /// Literal text.
    Text,
    /// Emphasis (`*x*`, `_x_`).
    Emph,
    /// Strong emphasis (`**x**`, `__x__`).
    Strong,
    /// Inline link.
    Link,
    /// Inline image.
    Image,
}

impl NodeKind {
    /// Whether nodes of this kind may hold children.
    ///
    /// The classification is fixed per kind and never depends on the node.
    #[inline]
    pub const fn is_container(self) -> bool {
        !matches!(self, Self::Text | Self::HorizontalRule)
    }

    /// Whether this kind is produced by the block parser.
    #[inline]
    pub const fn is_block(self) -> bool {
        matches!(
            self,
            Self::Document | Self::BlockQuote | Self::Header | Self::Paragraph | Self::HorizontalRule
        )
    }

    /// Name used by the tree dump.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::BlockQuote => "BlockQuote",
            Self::Header => "Header",
            Self::Paragraph => "Paragraph",
            Self::HorizontalRule => "HorizontalRule",
            Self::Text => "Text",
            Self::Emph => "Emph",
            Self::Strong => "Strong",
            Self::Link => "Link",
            Self::Image => "Image",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 1-based source span of a node.
///
/// The end is zero until the node is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePos {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourcePos {
    /// Span starting at `line`:`column` with an unset end.
    #[inline]
    pub const fn starting_at(line: u32, column: u32) -> Self {
        Self {
            start_line: line,
            start_column: column,
            end_line: 0,
            end_column: 0,
        }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

/// Destination and title of a link or image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkTarget {
    /// Destination with backslash escapes already removed.
    pub destination: Vec<u8>,
    /// Title, empty if absent.
    pub title: Vec<u8>,
}

/// A node in the document tree.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    pub(crate) pos: SourcePos,
    /// Raw bytes accumulated while a block is open.
    pub(crate) content: Vec<u8>,
    /// Payload of Text nodes.
    pub(crate) literal: Vec<u8>,
    pub(crate) level: u8,
    pub(crate) open: bool,
    pub(crate) last_line_blank: bool,
    pub(crate) link: Option<Box<LinkTarget>>,
}

impl Node {
    fn new(kind: NodeKind, pos: SourcePos) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
            pos,
            content: Vec::new(),
            literal: Vec::new(),
            level: 0,
            open: true,
            last_line_blank: false,
            link: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    #[inline]
    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    /// Previous sibling.
    #[inline]
    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    /// Next sibling.
    #[inline]
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    #[inline]
    pub fn source_pos(&self) -> SourcePos {
        self.pos
    }

    /// Raw block content. Empty once the inline pass has consumed it.
    #[inline]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Literal bytes of a Text node.
    #[inline]
    pub fn literal(&self) -> &[u8] {
        &self.literal
    }

    /// Header level (1-6), zero for other kinds.
    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Whether the block may still accept lines.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the last line this block saw was blank.
    #[inline]
    pub fn last_line_blank(&self) -> bool {
        self.last_line_blank
    }

    /// Target of a Link or Image node.
    #[inline]
    pub fn link(&self) -> Option<&LinkTarget> {
        self.link.as_deref()
    }
}

/// Owner of all nodes of one parsed document.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Create a tree holding only an open Document root at 1:1.
    pub fn new() -> Self {
        let root = Node::new(NodeKind::Document, SourcePos::starting_at(1, 1));
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots, including unlinked nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Allocate a detached node.
    pub fn new_node(&mut self, kind: NodeKind, pos: SourcePos) -> NodeId {
        debug_assert!(self.nodes.len() < u32::MAX as usize);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, pos));
        id
    }

    /// Allocate a detached Text node.
    pub fn new_text(&mut self, literal: impl Into<Vec<u8>>) -> NodeId {
        let id = self.new_node(NodeKind::Text, SourcePos::default());
        let node = self.get_mut(id);
        node.literal = literal.into();
        node.open = false;
        id
    }

    /// Detach `child` from wherever it is and make it the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self[parent].kind.is_container(), "leaf nodes never hold children");
        debug_assert_ne!(parent, child);
        self.unlink(child);
        let old_last = self[parent].last_child;
        {
            let node = self.get_mut(child);
            node.parent = Some(parent);
            node.prev = old_last;
        }
        match old_last {
            Some(last) => self.get_mut(last).next = Some(child),
            None => self.get_mut(parent).first_child = Some(child),
        }
        self.get_mut(parent).last_child = Some(child);
    }

    /// Detach `sibling` and link it directly after `node`.
    pub fn insert_after(&mut self, node: NodeId, sibling: NodeId) {
        debug_assert_ne!(node, sibling);
        self.unlink(sibling);
        let next = self[node].next;
        let parent = self[node].parent;
        {
            let s = self.get_mut(sibling);
            s.next = next;
            s.prev = Some(node);
            s.parent = parent;
        }
        self.get_mut(node).next = Some(sibling);
        match next {
            Some(next) => self.get_mut(next).prev = Some(sibling),
            None => {
                if let Some(parent) = parent {
                    self.get_mut(parent).last_child = Some(sibling);
                }
            }
        }
    }

    /// Remove `node` from its parent and siblings, leaving it parentless.
    ///
    /// The node keeps its own children.
    pub fn unlink(&mut self, node: NodeId) {
        let (prev, next, parent) = {
            let n = &self[node];
            (n.prev, n.next, n.parent)
        };
        match prev {
            Some(prev) => self.get_mut(prev).next = next,
            None => {
                if let Some(parent) = parent {
                    self.get_mut(parent).first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.get_mut(next).prev = prev,
            None => {
                if let Some(parent) = parent {
                    self.get_mut(parent).last_child = prev;
                }
            }
        }
        let n = self.get_mut(node);
        n.parent = None;
        n.prev = None;
        n.next = None;
    }

    /// Iterate over the direct children of `id`.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self[id].first_child,
        }
    }

    /// Concatenated literals of every Text node below `id`.
    pub fn text_content(&self, id: NodeId) -> Vec<u8> {
        let mut out = Vec::new();
        for WalkEvent { node, entering } in self.walk_from(id) {
            if entering && self[node].kind == NodeKind::Text {
                out.extend_from_slice(&self[node].literal);
            }
        }
        out
    }

    /// Walker positioned at the document root.
    #[inline]
    pub fn walker(&self) -> Walker {
        Walker::new(self.root)
    }

    /// Borrowing traversal of the whole document.
    #[inline]
    pub fn walk(&self) -> Walk<'_> {
        self.walk_from(self.root)
    }

    /// Borrowing traversal of the subtree rooted at `id`.
    #[inline]
    pub fn walk_from(&self, id: NodeId) -> Walk<'_> {
        Walk::new(self, Walker::new(id))
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        self.get(id)
    }
}

impl IndexMut<NodeId> for Tree {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        self.get_mut(id)
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree[id].next;
        Some(id)
    }
}
