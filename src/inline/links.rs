//! Inline links and images: `[text](dest "title")`, `![alt](src)`.
//!
//! Openers are tracked on a bracket stack separate from the delimiter stack.
//! Each bracket remembers the delimiter stack top at the time it was pushed,
//! so emphasis inside the link text is resolved before the link closes and
//! never pairs with runs outside it.

use super::emphasis::process_emphasis;
use super::InlineParser;
use crate::limits::MAX_LINK_PAREN_DEPTH;
use crate::node::{LinkTarget, NodeId, NodeKind, SourcePos, Tree};

/// An unresolved `[` or `![`.
#[derive(Debug, Clone, Copy)]
pub(super) struct Bracket {
    /// Text node holding the literal `[` or `![`.
    node: NodeId,
    /// Delimiter stack top when the bracket was pushed.
    previous_delimiter: Option<usize>,
    image: bool,
    /// False once an enclosing link has closed; links never nest.
    active: bool,
}

impl InlineParser {
    pub(super) fn handle_open_bracket(&mut self, tree: &mut Tree, block: NodeId) -> bool {
        self.pos += 1;
        let node = super::append_text(tree, block, b"[");
        self.push_bracket(node, false);
        true
    }

    pub(super) fn handle_bang(&mut self, tree: &mut Tree, block: NodeId) -> bool {
        if self.subject.get(self.pos + 1) != Some(&b'[') {
            return false;
        }
        self.pos += 2;
        let node = super::append_text(tree, block, b"![");
        self.push_bracket(node, true);
        true
    }

    fn push_bracket(&mut self, node: NodeId, image: bool) {
        self.brackets.push(Bracket {
            node,
            previous_delimiter: self.delimiters.top(),
            image,
            active: true,
        });
    }

    /// Try to close the innermost bracket. On failure the `]` is left for
    /// the caller to emit as text.
    pub(super) fn handle_close_bracket(&mut self, tree: &mut Tree, block: NodeId) -> bool {
        let Some(opener) = self.brackets.last().copied() else {
            return false;
        };
        if !opener.active {
            self.brackets.pop();
            return false;
        }
        let Some((target, end)) = parse_link_tail(&self.subject, self.pos + 1) else {
            self.brackets.pop();
            return false;
        };
        self.pos = end;

        let kind = if opener.image { NodeKind::Image } else { NodeKind::Link };
        let link = tree.new_node(kind, SourcePos::default());
        tree[link].open = false;
        tree[link].link = Some(Box::new(target));

        let mut child = tree[opener.node].next();
        while let Some(id) = child {
            child = tree[id].next();
            tree.append_child(link, id);
        }
        tree.append_child(block, link);

        process_emphasis(tree, &mut self.delimiters, opener.previous_delimiter, self.smart);
        self.brackets.pop();
        tree.unlink(opener.node);

        if !opener.image {
            for bracket in self.brackets.iter_mut().filter(|b| !b.image) {
                bracket.active = false;
            }
        }
        true
    }
}

#[inline]
fn is_link_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n')
}

fn skip_spaces(text: &[u8], mut pos: usize) -> usize {
    while text.get(pos).is_some_and(|&b| is_link_space(b)) {
        pos += 1;
    }
    pos
}

/// Parse `(dest "title")` starting at `start`.
///
/// Returns the target with backslash escapes removed and the position just
/// past the closing parenthesis.
pub(super) fn parse_link_tail(text: &[u8], start: usize) -> Option<(LinkTarget, usize)> {
    if text.get(start) != Some(&b'(') {
        return None;
    }
    let mut pos = skip_spaces(text, start + 1);
    let len = text.len();

    let (dest_start, dest_end) = if text.get(pos) == Some(&b'<') {
        pos += 1;
        let dest_start = pos;
        while pos < len && !matches!(text[pos], b'>' | b'<' | b'\n') {
            pos += if text[pos] == b'\\' && pos + 1 < len { 2 } else { 1 };
        }
        if text.get(pos) != Some(&b'>') {
            return None;
        }
        pos += 1;
        (dest_start, pos - 1)
    } else {
        let dest_start = pos;
        let mut depth = 0usize;
        while pos < len {
            match text[pos] {
                b'(' => {
                    depth += 1;
                    if depth > MAX_LINK_PAREN_DEPTH {
                        return None;
                    }
                }
                b')' if depth == 0 => break,
                b')' => depth -= 1,
                b'\\' if pos + 1 < len => pos += 1,
                b if is_link_space(b) || b.is_ascii_control() => break,
                _ => {}
            }
            pos += 1;
        }
        if depth != 0 {
            return None;
        }
        (dest_start, pos)
    };

    let before_title = pos;
    pos = skip_spaces(text, pos);

    let mut title = Vec::new();
    if pos > before_title {
        if let Some(&open) = text.get(pos).filter(|&&b| matches!(b, b'"' | b'\'' | b'(')) {
            let close = if open == b'(' { b')' } else { open };
            pos += 1;
            let title_start = pos;
            loop {
                match text.get(pos) {
                    None => return None,
                    Some(&b) if b == close => break,
                    Some(b'(') if open == b'(' => return None,
                    Some(b'\\') if pos + 1 < len => pos += 2,
                    Some(_) => pos += 1,
                }
            }
            title = unescape(&text[title_start..pos]);
            pos = skip_spaces(text, pos + 1);
        }
    }

    if text.get(pos) != Some(&b')') {
        return None;
    }
    let target = LinkTarget {
        destination: unescape(&text[dest_start..dest_end]),
        title,
    };
    Some((target, pos + 1))
}

/// Remove backslashes that escape ASCII punctuation.
fn unescape(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        if text[i] == b'\\' && text.get(i + 1).is_some_and(u8::is_ascii_punctuation) {
            i += 1;
        }
        out.push(text[i]);
        i += 1;
    }
    out
}
