//! Emphasis resolution over the delimiter stack.
//!
//! Walks the closers above `stack_bottom` in order. For each closer the
//! nearest compatible opener below it is searched for; a match wraps the
//! siblings between the two runs' Text nodes in an Emph or Strong node.
//! Per-character `openers_bottom` bounds keep repeated failed searches from
//! rescanning the same entries.

use smallvec::SmallVec;

use super::delimiter::DelimiterStack;
use crate::node::{NodeKind, SourcePos, Tree};

const LEFT_SINGLE_QUOTE: &str = "\u{2018}";
const RIGHT_SINGLE_QUOTE: &str = "\u{2019}";
const LEFT_DOUBLE_QUOTE: &str = "\u{201C}";
const RIGHT_DOUBLE_QUOTE: &str = "\u{201D}";

/// Replacement for a quote that found no partner, indexed like `pending`.
const UNPAIRED: [&str; 2] = [RIGHT_SINGLE_QUOTE, LEFT_DOUBLE_QUOTE];

#[inline]
fn emphasis_slot(ch: u8) -> Option<usize> {
    match ch {
        b'*' => Some(0),
        b'_' => Some(1),
        _ => None,
    }
}

/// Resolve emphasis (and smart quotes when `smart` is set) for every entry
/// above `stack_bottom`, then drop those entries from the stack.
pub(super) fn process_emphasis(tree: &mut Tree, stack: &mut DelimiterStack, stack_bottom: Option<usize>, smart: bool) {
    if smart {
        resolve_quotes(tree, stack, stack_bottom);
    }

    let mut openers_bottom = [stack_bottom; 2];
    let mut closer = stack.first_above(stack_bottom);

    while let Some(c) = closer {
        let delim = stack.get(c);
        let slot = match emphasis_slot(delim.ch) {
            Some(slot) if delim.can_close && delim.active => slot,
            _ => {
                closer = stack.next(c);
                continue;
            }
        };
        let ch = delim.ch;

        let mut candidate = stack.prev(c);
        let mut opener = None;
        while let Some(o) = candidate {
            if Some(o) == stack_bottom || Some(o) == openers_bottom[slot] {
                break;
            }
            let d = stack.get(o);
            if d.ch == ch && d.can_open && d.active {
                opener = Some(o);
                break;
            }
            candidate = stack.prev(o);
        }

        match opener {
            Some(o) => closer = wrap_span(tree, stack, o, c),
            None => {
                // Later closers of this character need not look below here.
                openers_bottom[slot] = stack.prev(c);
                let next = stack.next(c);
                // Deliberately not dropped when it can also open: it stays
                // as an opener for later closers, so `foo*bar*` pairs.
                if !stack.get(c).can_open {
                    stack.remove(c);
                }
                closer = next;
            }
        }
    }

    stack.truncate_to(stack_bottom);
}

/// Wrap the nodes between opener `o` and closer `c` in an Emph or Strong
/// node. Returns the closer to examine next.
fn wrap_span(tree: &mut Tree, stack: &mut DelimiterStack, o: usize, c: usize) -> Option<usize> {
    let opener_len = stack.get(o).remaining;
    let closer_len = stack.get(c).remaining;

    let mut used = opener_len.min(closer_len);
    if opener_len % 3 == 0 && closer_len % 3 == 0 && opener_len != closer_len {
        used = 1;
    }
    let (used, kind) = if used >= 2 {
        (2, NodeKind::Strong)
    } else {
        (1, NodeKind::Emph)
    };

    stack.get_mut(o).remaining -= used;
    stack.get_mut(c).remaining -= used;
    let opener_node = stack.get(o).node;
    let closer_node = stack.get(c).node;

    let literal = &mut tree[opener_node].literal;
    literal.truncate(literal.len() - used);
    tree[closer_node].literal.drain(..used);

    let span = tree.new_node(kind, SourcePos::default());
    tree[span].open = false;
    let mut child = tree[opener_node].next();
    while let Some(id) = child {
        if id == closer_node {
            break;
        }
        child = tree[id].next();
        tree.append_child(span, id);
    }
    tree.insert_after(opener_node, span);

    let mut between = stack.next(o);
    while let Some(b) = between {
        if b == c {
            break;
        }
        between = stack.next(b);
        stack.remove(b);
    }

    if stack.get(o).remaining == 0 {
        tree.unlink(opener_node);
        stack.remove(o);
    }
    if stack.get(c).remaining == 0 {
        let next = stack.next(c);
        tree.unlink(closer_node);
        stack.remove(c);
        next
    } else {
        Some(c)
    }
}

/// Replace straight quotes above `stack_bottom` with typographic ones.
///
/// A right-flanking quote pairs with the nearest pending opener of the same
/// character. A quote that can only close becomes a closing quote; any other
/// unpaired `'` is an apostrophe and any other unpaired `"` opens.
fn resolve_quotes(tree: &mut Tree, stack: &DelimiterStack, stack_bottom: Option<usize>) {
    let mut pending: [SmallVec<[usize; 8]>; 2] = Default::default();

    let mut cursor = stack.first_above(stack_bottom);
    while let Some(i) = cursor {
        cursor = stack.next(i);
        let d = stack.get(i);
        let (slot, open, close) = match d.ch {
            b'\'' => (0, LEFT_SINGLE_QUOTE, RIGHT_SINGLE_QUOTE),
            b'"' => (1, LEFT_DOUBLE_QUOTE, RIGHT_DOUBLE_QUOTE),
            _ => continue,
        };

        if d.flanking.right {
            if let Some(o) = pending[slot].pop() {
                set_literal(tree, stack, o, open);
                set_literal(tree, stack, i, close);
                continue;
            }
        }
        if d.flanking.left {
            pending[slot].push(i);
        } else if d.flanking.right {
            set_literal(tree, stack, i, close);
        } else {
            set_literal(tree, stack, i, UNPAIRED[slot]);
        }
    }

    for (slot, openers) in pending.iter().enumerate() {
        for &o in openers {
            set_literal(tree, stack, o, UNPAIRED[slot]);
        }
    }
}

fn set_literal(tree: &mut Tree, stack: &DelimiterStack, idx: usize, text: &str) {
    let node = stack.get(idx).node;
    tree[node].literal = text.as_bytes().to_vec();
}
