//! Per-kind block behavior.
//!
//! These four operations fully define how a block kind takes part in the
//! state machine. A new kind gets a new [`BlockRule`] implementation and an
//! arm in [`rule_for`]; the parser itself does not change.

use crate::cursor::LineCursor;
use crate::node::{Node, NodeKind};

/// Outcome of offering the current line to an open block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// The line continues this block; keep descending.
    Matched,
    /// The line does not continue this block or its descendants.
    NotMatched,
    /// The block consumed the whole line and closed itself.
    Completed,
}

/// Capability contract of a block kind.
pub trait BlockRule: Sync {
    /// Try to continue the block with the current line, consuming any
    /// continuation markers.
    fn continues(&self, cursor: &mut LineCursor<'_>, node: &Node) -> Continuation;

    /// Whether a child of `kind` may be added directly.
    fn can_contain(&self, kind: NodeKind) -> bool;

    /// Whether raw lines may be appended to the block's content.
    fn accepts_lines(&self) -> bool;

    /// Hook run once when the block closes.
    fn finalize(&self, _node: &mut Node) {}
}

/// Look up the rule for a block kind.
///
/// # Panics
/// Panics for inline kinds, which never take part in block parsing.
pub fn rule_for(kind: NodeKind) -> &'static dyn BlockRule {
    match kind {
        NodeKind::Document => &DocumentRule,
        NodeKind::BlockQuote => &BlockQuoteRule,
        NodeKind::Header => &HeaderRule,
        NodeKind::HorizontalRule => &HorizontalRuleRule,
        NodeKind::Paragraph => &ParagraphRule,
        NodeKind::Text
        | NodeKind::Emph
        | NodeKind::Strong
        | NodeKind::Link
        | NodeKind::Image => panic!("{kind} is not a block kind"),
    }
}

/// Consume a `>` marker and at most one following space at the lookahead.
///
/// Shared by block quote continuation and the block quote start.
pub(crate) fn consume_block_quote_marker(cursor: &mut LineCursor<'_>) -> bool {
    if cursor.is_indented() || cursor.peek_next_nonspace() != Some(b'>') {
        return false;
    }
    cursor.advance_next_nonspace();
    cursor.advance_offset(1, false);
    if cursor.peek(cursor.offset()) == Some(b' ') {
        cursor.advance_offset(1, false);
    }
    true
}

#[inline]
fn is_child_block(kind: NodeKind) -> bool {
    kind.is_block() && kind != NodeKind::Document
}

struct DocumentRule;

impl BlockRule for DocumentRule {
    fn continues(&self, _cursor: &mut LineCursor<'_>, _node: &Node) -> Continuation {
        Continuation::Matched
    }

    fn can_contain(&self, kind: NodeKind) -> bool {
        is_child_block(kind)
    }

    fn accepts_lines(&self) -> bool {
        false
    }
}

struct BlockQuoteRule;

impl BlockRule for BlockQuoteRule {
    fn continues(&self, cursor: &mut LineCursor<'_>, _node: &Node) -> Continuation {
        if consume_block_quote_marker(cursor) {
            Continuation::Matched
        } else {
            Continuation::NotMatched
        }
    }

    fn can_contain(&self, kind: NodeKind) -> bool {
        is_child_block(kind)
    }

    fn accepts_lines(&self) -> bool {
        false
    }
}

struct HeaderRule;

impl BlockRule for HeaderRule {
    fn continues(&self, _cursor: &mut LineCursor<'_>, _node: &Node) -> Continuation {
        // A header never spans more than one line.
        Continuation::NotMatched
    }

    fn can_contain(&self, _kind: NodeKind) -> bool {
        false
    }

    fn accepts_lines(&self) -> bool {
        false
    }
}

struct HorizontalRuleRule;

impl BlockRule for HorizontalRuleRule {
    fn continues(&self, _cursor: &mut LineCursor<'_>, _node: &Node) -> Continuation {
        Continuation::NotMatched
    }

    fn can_contain(&self, _kind: NodeKind) -> bool {
        false
    }

    fn accepts_lines(&self) -> bool {
        false
    }
}

struct ParagraphRule;

impl BlockRule for ParagraphRule {
    fn continues(&self, cursor: &mut LineCursor<'_>, _node: &Node) -> Continuation {
        if cursor.is_blank() {
            Continuation::NotMatched
        } else {
            Continuation::Matched
        }
    }

    fn can_contain(&self, _kind: NodeKind) -> bool {
        false
    }

    fn accepts_lines(&self) -> bool {
        true
    }

    fn finalize(&self, node: &mut Node) {
        // Drop the line ending of the last line plus trailing spaces/tabs.
        while node
            .content
            .last()
            .is_some_and(|&b| matches!(b, b' ' | b'\t' | b'\n'))
        {
            node.content.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{SourcePos, Tree};

    fn cursor_at_lookahead(line: &[u8]) -> LineCursor<'_> {
        let mut cursor = LineCursor::new(line);
        cursor.find_next_nonspace();
        cursor
    }

    #[test]
    fn test_block_quote_consumes_marker_and_one_space() {
        let mut tree = Tree::new();
        let id = tree.new_node(NodeKind::BlockQuote, SourcePos::default());
        let mut cursor = cursor_at_lookahead(b" >  foo");
        let status = rule_for(NodeKind::BlockQuote).continues(&mut cursor, &tree[id]);
        assert_eq!(status, Continuation::Matched);
        assert_eq!(cursor.rest(), b" foo");
    }

    #[test]
    fn test_block_quote_rejects_indented_marker() {
        let mut tree = Tree::new();
        let id = tree.new_node(NodeKind::BlockQuote, SourcePos::default());
        let mut cursor = cursor_at_lookahead(b"    > foo");
        let status = rule_for(NodeKind::BlockQuote).continues(&mut cursor, &tree[id]);
        assert_eq!(status, Continuation::NotMatched);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_paragraph_stops_at_blank() {
        let mut tree = Tree::new();
        let id = tree.new_node(NodeKind::Paragraph, SourcePos::default());
        let rule = rule_for(NodeKind::Paragraph);
        assert_eq!(
            rule.continues(&mut cursor_at_lookahead(b"  "), &tree[id]),
            Continuation::NotMatched
        );
        assert_eq!(
            rule.continues(&mut cursor_at_lookahead(b"more"), &tree[id]),
            Continuation::Matched
        );
    }

    #[test]
    fn test_single_line_blocks_never_continue() {
        let mut tree = Tree::new();
        for kind in [NodeKind::Header, NodeKind::HorizontalRule] {
            let id = tree.new_node(kind, SourcePos::default());
            let status = rule_for(kind).continues(&mut cursor_at_lookahead(b"x"), &tree[id]);
            assert_eq!(status, Continuation::NotMatched);
        }
    }

    #[test]
    fn test_can_contain() {
        let doc = rule_for(NodeKind::Document);
        assert!(doc.can_contain(NodeKind::Paragraph));
        assert!(doc.can_contain(NodeKind::BlockQuote));
        assert!(!doc.can_contain(NodeKind::Document));
        assert!(!doc.can_contain(NodeKind::Text));
        assert!(rule_for(NodeKind::BlockQuote).can_contain(NodeKind::Header));
        assert!(!rule_for(NodeKind::Paragraph).can_contain(NodeKind::Header));
        assert!(!rule_for(NodeKind::Header).can_contain(NodeKind::Paragraph));
    }

    #[test]
    fn test_only_paragraph_accepts_lines() {
        assert!(rule_for(NodeKind::Paragraph).accepts_lines());
        assert!(!rule_for(NodeKind::Document).accepts_lines());
        assert!(!rule_for(NodeKind::BlockQuote).accepts_lines());
        assert!(!rule_for(NodeKind::Header).accepts_lines());
    }

    #[test]
    fn test_paragraph_finalize_trims_trailing_whitespace() {
        let mut tree = Tree::new();
        let id = tree.new_node(NodeKind::Paragraph, SourcePos::default());
        tree[id].content = b"foo\nbar  \n".to_vec();
        rule_for(NodeKind::Paragraph).finalize(&mut tree[id]);
        assert_eq!(tree[id].content(), b"foo\nbar");
    }

    #[test]
    #[should_panic(expected = "not a block kind")]
    fn test_inline_kind_has_no_rule() {
        let _ = rule_for(NodeKind::Emph);
    }
}
