//! Line-by-line block state machine.
//!
//! For every line the parser:
//! 1. Descends the open last children, asking each rule to continue it
//! 2. Tries block starts while the deepest matched block is a container
//! 3. Lazily continues an open paragraph, or closes the unmatched blocks
//!    and appends the remainder to the tip (opening a paragraph if needed)

use log::{debug, trace};
use memchr::memchr;

use super::rules::{rule_for, Continuation};
use super::starts::{BlockStart, BLOCK_STARTS};
use crate::cursor::LineCursor;
use crate::node::{NodeId, NodeKind, SourcePos, Tree};

/// Block parser over a complete input buffer.
///
/// The returned tree has every block closed; Paragraph and Header nodes
/// still carry their raw content for the inline pass.
pub struct BlockParser<'a> {
    input: &'a [u8],
    pub(super) tree: Tree,
    pub(super) cursor: LineCursor<'a>,
    /// Deepest open block.
    tip: NodeId,
    /// Tip as it was when the current line started.
    old_tip: NodeId,
    last_matched_container: NodeId,
    /// Whether the blocks left unmatched by this line are already closed.
    all_closed: bool,
    line_number: u32,
    last_line_length: u32,
}

impl<'a> BlockParser<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let tree = Tree::new();
        let root = tree.root();
        Self {
            input,
            tree,
            cursor: LineCursor::new(b""),
            tip: root,
            old_tip: root,
            last_matched_container: root,
            all_closed: true,
            line_number: 0,
            last_line_length: 0,
        }
    }

    /// Run every line through the state machine and close what is left open.
    pub fn parse(mut self) -> Tree {
        for line in Lines::new(self.input) {
            self.incorporate_line(line);
        }

        let mut block = Some(self.tip);
        while let Some(id) = block {
            block = self.tree[id].parent();
            self.finalize(id, self.line_number);
        }

        debug!(
            "block parse done: {} lines, {} nodes",
            self.line_number,
            self.tree.len()
        );
        self.tree
    }

    fn incorporate_line(&mut self, line: &'a [u8]) {
        self.line_number += 1;
        self.cursor = LineCursor::new(line);
        self.old_tip = self.tip;
        self.all_closed = true;
        trace!("line {}: {:?}", self.line_number, String::from_utf8_lossy(line));

        let mut container = self.tree.root();
        while let Some(last) = self.tree[container].last_child() {
            if !self.tree[last].is_open() {
                break;
            }
            container = last;
            self.cursor.find_next_nonspace();

            let kind = self.tree[container].kind();
            match rule_for(kind).continues(&mut self.cursor, &self.tree[container]) {
                Continuation::Matched => {}
                Continuation::NotMatched => {
                    container = self.tree[container].parent().unwrap_or(container);
                    break;
                }
                Continuation::Completed => {
                    self.last_line_length = line.len() as u32;
                    return;
                }
            }
        }

        self.all_closed = container == self.old_tip;
        self.last_matched_container = container;

        let mut matched_leaf = self.is_leaf_accepting_lines(container);
        while !matched_leaf {
            self.cursor.find_next_nonspace();

            let mut outcome = BlockStart::NoMatch;
            for start in BLOCK_STARTS {
                outcome = start(self);
                if outcome != BlockStart::NoMatch {
                    break;
                }
            }
            match outcome {
                BlockStart::Container => container = self.tip,
                BlockStart::Leaf => {
                    container = self.tip;
                    matched_leaf = true;
                }
                BlockStart::NoMatch => {
                    self.cursor.advance_next_nonspace();
                    break;
                }
            }
        }

        if !self.all_closed && !self.cursor.is_blank() && self.tree[self.tip].kind() == NodeKind::Paragraph {
            // Lazy paragraph continuation.
            self.add_line();
        } else {
            self.close_unmatched_blocks();

            let blank = self.cursor.is_blank();
            if blank {
                if let Some(last) = self.tree[container].last_child() {
                    self.tree[last].last_line_blank = true;
                }
            }

            let kind = self.tree[container].kind();
            let last_line_blank = blank && kind != NodeKind::BlockQuote;
            let mut ancestor = Some(container);
            while let Some(id) = ancestor {
                self.tree[id].last_line_blank = last_line_blank;
                ancestor = self.tree[id].parent();
            }

            if rule_for(kind).accepts_lines() {
                self.add_line();
            } else if self.cursor.offset() < line.len() && !blank {
                let start = self.cursor.next_nonspace();
                self.add_child(NodeKind::Paragraph, start);
                self.cursor.advance_next_nonspace();
                self.add_line();
            }
        }

        self.last_line_length = line.len() as u32;
    }

    fn is_leaf_accepting_lines(&self, id: NodeId) -> bool {
        let kind = self.tree[id].kind();
        kind != NodeKind::Paragraph && rule_for(kind).accepts_lines()
    }

    /// Close `block`, stamping its end position, and move the tip to its parent.
    pub(super) fn finalize(&mut self, block: NodeId, line_number: u32) {
        let end_column = self.last_line_length;
        let node = &mut self.tree[block];
        debug_assert!(node.is_open(), "{} finalized twice", node.kind());
        node.open = false;
        node.pos.end_line = line_number;
        node.pos.end_column = end_column;
        rule_for(node.kind()).finalize(node);
        debug!("closed {} at {}", node.kind(), node.pos);

        if let Some(parent) = node.parent() {
            self.tip = parent;
        }
    }

    /// Close every block opened before this line that the line did not match.
    ///
    /// Idempotent within a line.
    pub(super) fn close_unmatched_blocks(&mut self) {
        if self.all_closed {
            return;
        }
        let end_line = self.line_number.saturating_sub(1);
        while self.old_tip != self.last_matched_container {
            let parent = self.tree[self.old_tip].parent();
            self.finalize(self.old_tip, end_line);
            match parent {
                Some(parent) => self.old_tip = parent,
                None => break,
            }
        }
        self.all_closed = true;
    }

    /// Open a `kind` block under the tip, closing tips that cannot hold it.
    ///
    /// `offset` is the byte offset in the current line where the block starts.
    pub(super) fn add_child(&mut self, kind: NodeKind, offset: usize) -> NodeId {
        assert!(
            kind.is_block() && kind != NodeKind::Document,
            "{kind} cannot be added by the block parser"
        );
        let end_line = self.line_number.saturating_sub(1);
        while !rule_for(self.tree[self.tip].kind()).can_contain(kind) {
            self.finalize(self.tip, end_line);
        }

        let pos = SourcePos::starting_at(self.line_number, offset as u32 + 1);
        let child = self.tree.new_node(kind, pos);
        self.tree.append_child(self.tip, child);
        self.tip = child;
        child
    }

    /// Append the rest of the line, plus a newline, to the tip's content.
    fn add_line(&mut self) {
        let rest = self.cursor.rest();
        let tip = &mut self.tree[self.tip];
        debug_assert!(tip.is_open() && rule_for(tip.kind()).accepts_lines());
        tip.content.extend_from_slice(rest);
        tip.content.push(b'\n');
    }
}

/// Splits input on `\n`, dropping a trailing `\r` from each line.
///
/// A final line ending does not produce an extra empty line.
struct Lines<'a> {
    rest: Option<&'a [u8]>,
}

impl<'a> Lines<'a> {
    fn new(input: &'a [u8]) -> Self {
        let rest = if input.is_empty() {
            None
        } else {
            Some(input.strip_suffix(b"\n").unwrap_or(input))
        };
        Self { rest }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let rest = self.rest?;
        let line = match memchr(b'\n', rest) {
            Some(i) => {
                self.rest = Some(&rest[i + 1..]);
                &rest[..i]
            }
            None => {
                self.rest = None;
                rest
            }
        };
        Some(line.strip_suffix(b"\r").unwrap_or(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Tree {
        BlockParser::new(input.as_bytes()).parse()
    }

    fn child_kinds(tree: &Tree, id: NodeId) -> Vec<NodeKind> {
        tree.children(id).map(|c| tree[c].kind()).collect()
    }

    #[test]
    fn test_lines_split() {
        let lines: Vec<_> = Lines::new(b"a\r\nb\n\nc").collect();
        assert_eq!(lines, vec![&b"a"[..], &b"b"[..], &b""[..], &b"c"[..]]);
        assert_eq!(Lines::new(b"a\n").count(), 1);
        assert_eq!(Lines::new(b"").count(), 0);
        assert_eq!(Lines::new(b"\n").collect::<Vec<_>>(), vec![&b""[..]]);
    }

    #[test]
    fn test_empty_input() {
        let tree = parse("");
        let root = tree.root();
        assert!(!tree[root].is_open());
        assert_eq!(tree[root].first_child(), None);
    }

    #[test]
    fn test_paragraph_lines_joined() {
        let tree = parse("foo\nbar\n");
        let root = tree.root();
        assert_eq!(child_kinds(&tree, root), vec![NodeKind::Paragraph]);
        let para = tree[root].first_child().unwrap();
        assert_eq!(tree[para].content(), b"foo\nbar");
        assert_eq!(tree[para].source_pos().to_string(), "1:1-2:3");
    }

    #[test]
    fn test_blank_line_separates_paragraphs() {
        let tree = parse("a\n\nb");
        assert_eq!(
            child_kinds(&tree, tree.root()),
            vec![NodeKind::Paragraph, NodeKind::Paragraph]
        );
    }

    #[test]
    fn test_header_interrupts_paragraph() {
        let tree = parse("para\n## Title ##\nmore");
        let root = tree.root();
        assert_eq!(
            child_kinds(&tree, root),
            vec![NodeKind::Paragraph, NodeKind::Header, NodeKind::Paragraph]
        );
        let header = tree.children(root).nth(1).unwrap();
        assert_eq!(tree[header].level(), 2);
        assert_eq!(tree[header].content(), b"Title");
        assert_eq!(tree[header].source_pos().to_string(), "2:1-2:11");
    }

    #[test]
    fn test_thematic_break_is_leaf() {
        let tree = parse("***\ntext");
        assert_eq!(
            child_kinds(&tree, tree.root()),
            vec![NodeKind::HorizontalRule, NodeKind::Paragraph]
        );
    }

    #[test]
    fn test_indented_marker_is_paragraph_text() {
        let tree = parse("    # not a header");
        let root = tree.root();
        let para = tree[root].first_child().unwrap();
        assert_eq!(tree[para].kind(), NodeKind::Paragraph);
        assert_eq!(tree[para].content(), b"# not a header");
    }

    #[test]
    fn test_block_quote_nesting() {
        let tree = parse("> > deep\n> shallow?");
        let root = tree.root();
        let outer = tree[root].first_child().unwrap();
        assert_eq!(tree[outer].kind(), NodeKind::BlockQuote);
        let inner = tree[outer].first_child().unwrap();
        assert_eq!(tree[inner].kind(), NodeKind::BlockQuote);
        // The second line lazily continues the inner paragraph.
        let para = tree[inner].first_child().unwrap();
        assert_eq!(tree[para].content(), b"deep\nshallow?");
    }

    #[test]
    fn test_lazy_continuation() {
        let tree = parse("> foo\nbar");
        let root = tree.root();
        assert_eq!(child_kinds(&tree, root), vec![NodeKind::BlockQuote]);
        let quote = tree[root].first_child().unwrap();
        let para = tree[quote].first_child().unwrap();
        assert_eq!(tree[para].content(), b"foo\nbar");
    }

    #[test]
    fn test_blank_line_ends_block_quote() {
        let tree = parse("> foo\n\nbar");
        assert_eq!(
            child_kinds(&tree, tree.root()),
            vec![NodeKind::BlockQuote, NodeKind::Paragraph]
        );
    }

    #[test]
    fn test_blank_line_inside_block_quote() {
        let tree = parse("> a\n>\n> b");
        let root = tree.root();
        let quote = tree[root].first_child().unwrap();
        assert_eq!(
            child_kinds(&tree, quote),
            vec![NodeKind::Paragraph, NodeKind::Paragraph]
        );
        let first = tree[quote].first_child().unwrap();
        assert!(tree[first].last_line_blank());
        // Block quotes never carry the blank marker themselves.
        assert!(!tree[quote].last_line_blank());
    }

    #[test]
    fn test_header_inside_block_quote() {
        let tree = parse("> # Title\n> body");
        let quote = tree[tree.root()].first_child().unwrap();
        assert_eq!(
            child_kinds(&tree, quote),
            vec![NodeKind::Header, NodeKind::Paragraph]
        );
    }

    #[test]
    fn test_all_blocks_closed_with_end_positions() {
        let tree = parse("> a\n> b\n\n---\n");
        for event in tree.walk() {
            let node = &tree[event.node];
            if node.kind().is_block() {
                assert!(!node.is_open(), "{} left open", node.kind());
            }
        }
        let root = tree.root();
        assert_eq!(tree[root].source_pos().to_string(), "1:1-4:3");
        let quote = tree[root].first_child().unwrap();
        assert_eq!(tree[quote].source_pos().to_string(), "1:1-2:3");
    }

    #[test]
    fn test_crlf_input() {
        let tree = parse("# Hi\r\npara\r\n");
        let root = tree.root();
        let header = tree[root].first_child().unwrap();
        assert_eq!(tree[header].content(), b"Hi");
        let para = tree[header].next().unwrap();
        assert_eq!(tree[para].content(), b"para");
    }
}
