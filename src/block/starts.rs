//! Block start detection.
//!
//! Each start inspects the line from the cursor's lookahead position. On a
//! match it consumes its marker, closes the blocks left unmatched by the
//! current line, and opens its node via [`BlockParser::add_child`].

use super::parser::BlockParser;
use super::rules::consume_block_quote_marker;
use crate::limits::{MAX_HEADER_LEVEL, MIN_THEMATIC_BREAK_MARKERS};
use crate::node::NodeKind;

/// Result of trying one block start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStart {
    /// Not this kind of block.
    NoMatch,
    /// Opened a container; keep looking for starts inside it.
    Container,
    /// Opened a leaf; stop looking for starts on this line.
    Leaf,
}

pub(super) type StartFn = fn(&mut BlockParser<'_>) -> BlockStart;

/// Block starts in the order they are tried on every line.
pub(super) const BLOCK_STARTS: &[StartFn] = &[atx_header_start, thematic_break_start, block_quote_start];

fn atx_header_start(parser: &mut BlockParser<'_>) -> BlockStart {
    if parser.cursor.is_indented() {
        return BlockStart::NoMatch;
    }
    let Some((level, marker_len)) = scan_atx_marker(parser.cursor.rest_from_next_nonspace()) else {
        return BlockStart::NoMatch;
    };

    let start = parser.cursor.next_nonspace();
    parser.cursor.advance_next_nonspace();
    parser.cursor.advance_offset(marker_len, false);
    parser.close_unmatched_blocks();

    let header = parser.add_child(NodeKind::Header, start);
    let content = trim_header_end(parser.cursor.rest());
    let node = &mut parser.tree[header];
    node.level = level;
    node.content = content.to_vec();
    parser.cursor.advance_to_end();
    BlockStart::Leaf
}

fn thematic_break_start(parser: &mut BlockParser<'_>) -> BlockStart {
    if parser.cursor.is_indented() || !is_thematic_break(parser.cursor.rest_from_next_nonspace()) {
        return BlockStart::NoMatch;
    }

    let start = parser.cursor.next_nonspace();
    parser.close_unmatched_blocks();
    parser.add_child(NodeKind::HorizontalRule, start);
    parser.cursor.advance_to_end();
    BlockStart::Leaf
}

fn block_quote_start(parser: &mut BlockParser<'_>) -> BlockStart {
    let start = parser.cursor.next_nonspace();
    if !consume_block_quote_marker(&mut parser.cursor) {
        return BlockStart::NoMatch;
    }
    parser.close_unmatched_blocks();
    parser.add_child(NodeKind::BlockQuote, start);
    BlockStart::Container
}

/// Scan an opening `#` run. Returns the level and the bytes consumed,
/// including whitespace after the run.
fn scan_atx_marker(rest: &[u8]) -> Option<(u8, usize)> {
    let level = rest.iter().take_while(|&&b| b == b'#').count();
    if level == 0 || level > MAX_HEADER_LEVEL {
        return None;
    }
    match rest.get(level) {
        None | Some(b' ') | Some(b'\t') => {}
        Some(_) => return None,
    }
    let spaces = rest[level..]
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count();
    Some((level as u8, level + spaces))
}

/// Strip trailing whitespace and an optional closing `#` sequence.
fn trim_header_end(content: &[u8]) -> &[u8] {
    let is_space = |b: u8| b == b' ' || b == b'\t';
    let mut end = content.len();
    while end > 0 && is_space(content[end - 1]) {
        end -= 1;
    }

    let after_hashes = end;
    while end > 0 && content[end - 1] == b'#' {
        end -= 1;
    }
    if end < after_hashes {
        if end == 0 || is_space(content[end - 1]) {
            while end > 0 && is_space(content[end - 1]) {
                end -= 1;
            }
        } else {
            // `foo#` keeps its hash.
            end = after_hashes;
        }
    }
    &content[..end]
}

fn is_thematic_break(rest: &[u8]) -> bool {
    let marker = match rest.first() {
        Some(&b @ (b'*' | b'-' | b'_')) => b,
        _ => return false,
    };
    let mut count = 0;
    for &b in rest {
        if b == marker {
            count += 1;
        } else if b != b' ' && b != b'\t' {
            return false;
        }
    }
    count >= MIN_THEMATIC_BREAK_MARKERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_atx_marker() {
        assert_eq!(scan_atx_marker(b"# foo"), Some((1, 2)));
        assert_eq!(scan_atx_marker(b"###\tfoo"), Some((3, 4)));
        assert_eq!(scan_atx_marker(b"##"), Some((2, 2)));
        assert_eq!(scan_atx_marker(b"######   x"), Some((6, 9)));
        assert_eq!(scan_atx_marker(b"####### foo"), None);
        assert_eq!(scan_atx_marker(b"#foo"), None);
        assert_eq!(scan_atx_marker(b"foo"), None);
    }

    #[test]
    fn test_trim_header_end() {
        assert_eq!(trim_header_end(b"foo"), b"foo");
        assert_eq!(trim_header_end(b"foo ##"), b"foo");
        assert_eq!(trim_header_end(b"foo ##   "), b"foo");
        assert_eq!(trim_header_end(b"foo#"), b"foo#");
        assert_eq!(trim_header_end(b"foo # bar"), b"foo # bar");
        assert_eq!(trim_header_end(b"###"), b"");
        assert_eq!(trim_header_end(b""), b"");
    }

    #[test]
    fn test_is_thematic_break() {
        assert!(is_thematic_break(b"***"));
        assert!(is_thematic_break(b"- - -"));
        assert!(is_thematic_break(b"_\t_ _  "));
        assert!(is_thematic_break(b"----------"));
        assert!(!is_thematic_break(b"**"));
        assert!(!is_thematic_break(b"*-*"));
        assert!(!is_thematic_break(b"--- a"));
        assert!(!is_thematic_break(b"==="));
    }
}
