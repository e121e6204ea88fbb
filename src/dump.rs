//! Human-readable tree dump for debugging.
//!
//! ```text
//! Document [1:1-3:5]
//!   Header level=1 [1:1-1:7]
//!     Text "Hello"
//!   Paragraph [3:1-3:5]
//!     Emph
//!       Text "world"
//! ```

use std::fmt;

use crate::node::{NodeId, NodeKind, Tree};
use crate::walker::WalkEvent;

/// [`Display`](fmt::Display) adapter that prints a subtree one node per line.
pub struct TreeDump<'t> {
    tree: &'t Tree,
    root: NodeId,
}

impl<'t> TreeDump<'t> {
    /// Dump the whole document.
    pub fn new(tree: &'t Tree) -> Self {
        Self::subtree(tree, tree.root())
    }

    pub fn subtree(tree: &'t Tree, root: NodeId) -> Self {
        Self { tree, root }
    }
}

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0usize;
        for WalkEvent { node: id, entering } in self.tree.walk_from(self.root) {
            let node = &self.tree[id];
            if !entering {
                depth -= 1;
                continue;
            }

            write!(f, "{:indent$}{}", "", node.kind(), indent = depth * 2)?;
            if node.kind() == NodeKind::Header {
                write!(f, " level={}", node.level())?;
            }
            if let Some(target) = node.link() {
                write!(f, " dest={:?}", String::from_utf8_lossy(&target.destination))?;
                if !target.title.is_empty() {
                    write!(f, " title={:?}", String::from_utf8_lossy(&target.title))?;
                }
            }
            if node.kind().is_block() {
                write!(f, " [{}]", node.source_pos())?;
            }
            if !node.literal().is_empty() {
                write!(f, " {:?}", String::from_utf8_lossy(node.literal()))?;
            } else if !node.content().is_empty() {
                write!(f, " {:?}", String::from_utf8_lossy(node.content()))?;
            }
            writeln!(f)?;

            if node.kind().is_container() {
                depth += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SourcePos;

    #[test]
    fn test_dump_indents_children() {
        let mut tree = Tree::new();
        let root = tree.root();
        let para = tree.new_node(NodeKind::Paragraph, SourcePos::starting_at(1, 1));
        let emph = tree.new_node(NodeKind::Emph, SourcePos::default());
        let text = tree.new_text("hi");
        tree.append_child(root, para);
        tree.append_child(para, emph);
        tree.append_child(emph, text);

        let dump = TreeDump::new(&tree).to_string();
        assert_eq!(
            dump,
            "Document [1:1-0:0]\n  Paragraph [1:1-0:0]\n    Emph\n      Text \"hi\"\n"
        );
    }

    #[test]
    fn test_dump_leaf_subtree() {
        let mut tree = Tree::new();
        let text = tree.new_text("a\nb");
        assert_eq!(
            TreeDump::subtree(&tree, text).to_string(),
            "Text \"a\\nb\"\n"
        );
    }
}
