//! Inline parser for Markdown.
//!
//! Runs once per Paragraph and Header in two phases:
//! 1. Tokenize: scan the block's content left to right, appending Text
//!    children and recording delimiter runs and brackets
//! 2. Resolve: pair delimiter runs into Emph/Strong spans (links resolve
//!    their own text as soon as their closing `)` is seen)
//!
//! Delimiter runs are never dropped. A run that pairs with nothing stays
//! in the tree as literal text.

mod delimiter;
mod emphasis;
mod links;

pub use delimiter::{Delimiter, DelimiterStack, Flanking};

use std::borrow::Cow;

use log::debug;
use smallvec::SmallVec;

use crate::limits::MAX_ENTITY_LEN;
use crate::node::{NodeId, NodeKind, Tree};
use crate::walker::WalkEvent;
use crate::Options;
use emphasis::process_emphasis;
use links::Bracket;

/// Bytes that end a plain text run.
static SPECIAL_CHARS: [bool; 256] = {
    let mut table = [false; 256];
    table[b'\n' as usize] = true; // Line break
    table[b'*' as usize] = true; // Emphasis
    table[b'_' as usize] = true; // Emphasis
    table[b'\'' as usize] = true; // Smart quote
    table[b'"' as usize] = true; // Smart quote
    table[b'\\' as usize] = true; // Escape
    table[b'&' as usize] = true; // Entity
    table[b'[' as usize] = true; // Link
    table[b']' as usize] = true; // Link
    table[b'!' as usize] = true; // Image
    table
};

/// Inline parser state, reusable across blocks.
pub struct InlineParser {
    subject: Vec<u8>,
    pos: usize,
    delimiters: DelimiterStack,
    brackets: SmallVec<[Bracket; 8]>,
    smart: bool,
}

impl InlineParser {
    pub fn new(options: &Options) -> Self {
        Self {
            subject: Vec::new(),
            pos: 0,
            delimiters: DelimiterStack::new(),
            brackets: SmallVec::new(),
            smart: options.smart,
        }
    }

    /// Parse the content of every Paragraph and Header in the tree.
    pub fn process_tree(&mut self, tree: &mut Tree) {
        let mut walker = tree.walker();
        let mut blocks = 0usize;
        while let Some(WalkEvent { node, entering }) = walker.next(tree) {
            if entering && matches!(tree[node].kind(), NodeKind::Paragraph | NodeKind::Header) {
                self.parse(tree, node);
                blocks += 1;
            }
        }
        debug!("inline pass done: {blocks} blocks");
    }

    /// Replace `block`'s raw content with inline children.
    pub fn parse(&mut self, tree: &mut Tree, block: NodeId) {
        let content = std::mem::take(&mut tree[block].content);
        self.subject.clear();
        self.subject.extend_from_slice(content.trim_ascii());
        self.pos = 0;
        self.delimiters.clear();
        self.brackets.clear();

        while self.parse_inline(tree, block) {}

        process_emphasis(tree, &mut self.delimiters, None, self.smart);
        self.brackets.clear();
    }

    /// Consume one token. Returns false at end of input.
    fn parse_inline(&mut self, tree: &mut Tree, block: NodeId) -> bool {
        let Some(&c) = self.subject.get(self.pos) else {
            return false;
        };
        let handled = match c {
            b'*' | b'_' | b'\'' | b'"' => self.handle_delim(c, tree, block),
            b'\\' => self.handle_backslash(tree, block),
            b'&' => self.handle_entity(tree, block),
            b'[' => self.handle_open_bracket(tree, block),
            b'!' => self.handle_bang(tree, block),
            b']' => self.handle_close_bracket(tree, block),
            b'\n' => false,
            _ => self.handle_text(tree, block),
        };
        if !handled {
            self.pos += 1;
            append_text(tree, block, &[c]);
        }
        true
    }

    fn handle_text(&mut self, tree: &mut Tree, block: NodeId) -> bool {
        let start = self.pos;
        let len = self.subject[start..]
            .iter()
            .position(|&b| SPECIAL_CHARS[b as usize])
            .unwrap_or(self.subject.len() - start);
        if len == 0 {
            return false;
        }
        self.pos += len;
        append_text(tree, block, &self.subject[start..self.pos]);
        true
    }

    fn handle_delim(&mut self, c: u8, tree: &mut Tree, block: NodeId) -> bool {
        let start = self.pos;
        let quote = c == b'\'' || c == b'"';
        let run = if quote {
            1
        } else {
            self.subject[start..].iter().take_while(|&&b| b == c).count()
        };
        let end = start + run;
        let flanking = Flanking::scan(&self.subject, start, end);
        let (can_open, can_close) = if quote {
            (true, true)
        } else {
            (flanking.can_open(c), flanking.can_close(c))
        };

        self.pos = end;
        let node = append_text(tree, block, &self.subject[start..end]);
        self.delimiters
            .push(Delimiter::new(node, c, run, can_open, can_close, flanking));
        true
    }

    /// `\` before ASCII punctuation produces that character literally.
    fn handle_backslash(&mut self, tree: &mut Tree, block: NodeId) -> bool {
        match self.subject.get(self.pos + 1) {
            Some(&b) if b.is_ascii_punctuation() => {
                self.pos += 2;
                append_text(tree, block, &[b]);
                true
            }
            _ => false,
        }
    }

    fn handle_entity(&mut self, tree: &mut Tree, block: NodeId) -> bool {
        let rest = &self.subject[self.pos..];
        let Some(len) = scan_entity(rest) else {
            return false;
        };
        let Ok(raw) = std::str::from_utf8(&rest[..len]) else {
            return false;
        };
        let decoded = if is_null_reference(raw) {
            Cow::Borrowed("\u{FFFD}")
        } else {
            html_escape::decode_html_entities(raw)
        };
        if decoded == raw {
            // Unknown name.
            return false;
        }
        let text = decoded.into_owned();
        self.pos += len;
        append_text(tree, block, text.as_bytes());
        true
    }
}

/// Append a Text child to `parent`.
fn append_text(tree: &mut Tree, parent: NodeId, literal: &[u8]) -> NodeId {
    let node = tree.new_text(literal);
    tree.append_child(parent, node);
    node
}

/// `&#0;` and its hex/zero-padded forms, which decode to U+FFFD.
fn is_null_reference(raw: &str) -> bool {
    let Some(body) = raw.strip_prefix("&#").and_then(|s| s.strip_suffix(';')) else {
        return false;
    };
    let digits = body.strip_prefix(['x', 'X']).unwrap_or(body);
    !digits.is_empty() && digits.bytes().all(|b| b == b'0')
}

/// Length of an entity reference (`&name;`, `&#123;`, `&#x1F;`) at the
/// start of `text`.
fn scan_entity(text: &[u8]) -> Option<usize> {
    if text.first() != Some(&b'&') {
        return None;
    }
    let (body_start, max_digits, is_valid): (usize, usize, fn(&u8) -> bool) = match text.get(1) {
        Some(b'#') => match text.get(2) {
            Some(b'x' | b'X') => (3, 6, u8::is_ascii_hexdigit),
            _ => (2, 7, u8::is_ascii_digit),
        },
        _ => (1, MAX_ENTITY_LEN - 2, u8::is_ascii_alphanumeric),
    };
    let body = text[body_start..]
        .iter()
        .take(max_digits + 1)
        .take_while(|&b| is_valid(b))
        .count();
    if body == 0 || body > max_digits {
        return None;
    }
    let end = body_start + body;
    if text.get(end) != Some(&b';') || end + 1 > MAX_ENTITY_LEN {
        return None;
    }
    Some(end + 1)
}
