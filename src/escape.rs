//! HTML escaping for rendered output.
//!
//! Text and attribute escaping find the first escapable byte with memchr,
//! then copy the unescaped stretches between escapes in bulk.

use memchr::{memchr, memchr2, memchr3};

/// Bytes escaped in text content. `"` is included so that text can be
/// pasted into attributes unchanged.
const TEXT_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table
};

/// Bytes escaped in attribute values.
const ATTR_TABLE: [bool; 256] = {
    let mut table = TEXT_TABLE;
    table[b'\'' as usize] = true;
    table
};

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Escape text content into `out`.
///
/// # Example
/// ```
/// use tipmark::escape::escape_text_into;
///
/// let mut out = Vec::new();
/// escape_text_into(&mut out, b"a < b & \"c\"");
/// assert_eq!(out, b"a &lt; b &amp; &quot;c&quot;");
/// ```
#[inline]
pub fn escape_text_into(out: &mut Vec<u8>, input: &[u8]) {
    let first = min_opt(memchr3(b'<', b'>', b'&', input), memchr(b'"', input));
    escape_with_table(out, input, first, &TEXT_TABLE);
}

/// Escape an attribute value into `out`, including `'`.
#[inline]
pub fn escape_attr_into(out: &mut Vec<u8>, input: &[u8]) {
    let first = min_opt(memchr3(b'<', b'>', b'&', input), memchr2(b'"', b'\'', input));
    escape_with_table(out, input, first, &ATTR_TABLE);
}

fn escape_with_table(out: &mut Vec<u8>, input: &[u8], first: Option<usize>, table: &[bool; 256]) {
    let Some(mut pos) = first else {
        out.extend_from_slice(input);
        return;
    };
    out.extend_from_slice(&input[..pos]);

    while pos < input.len() {
        let start = pos;
        while pos < input.len() && !table[input[pos] as usize] {
            pos += 1;
        }
        out.extend_from_slice(&input[start..pos]);

        if let Some(&b) = input.get(pos) {
            out.extend_from_slice(entity_for(b));
            pos += 1;
        }
    }
}

#[inline]
fn entity_for(b: u8) -> &'static [u8] {
    match b {
        b'<' => b"&lt;",
        b'>' => b"&gt;",
        b'&' => b"&amp;",
        b'"' => b"&quot;",
        _ => b"&#39;",
    }
}

#[inline]
fn min_opt(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Write a link destination as an `href`/`src` attribute value.
///
/// Spaces, backslashes, double quotes, control bytes, and non-ASCII bytes
/// are percent-encoded; existing `%XX` sequences pass through. HTML
/// specials are then entity-escaped.
pub fn escape_href_into(out: &mut Vec<u8>, input: &[u8]) {
    for &b in input {
        match b {
            b'<' | b'>' | b'&' | b'\'' => out.extend_from_slice(entity_for(b)),
            b' ' | b'\\' | b'"' | 0x00..=0x1F | 0x7F..=0xFF => {
                out.push(b'%');
                out.push(HEX[(b >> 4) as usize]);
                out.push(HEX[(b & 0xF) as usize]);
            }
            _ => out.push(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(input: &str) -> String {
        let mut out = Vec::new();
        escape_text_into(&mut out, input.as_bytes());
        String::from_utf8(out).unwrap()
    }

    fn attr(input: &str) -> String {
        let mut out = Vec::new();
        escape_attr_into(&mut out, input.as_bytes());
        String::from_utf8(out).unwrap()
    }

    fn href(input: &str) -> String {
        let mut out = Vec::new();
        escape_href_into(&mut out, input.as_bytes());
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_escape_text_passthrough() {
        assert_eq!(text("Hello, World!"), "Hello, World!");
        assert_eq!(text(""), "");
        assert_eq!(text("it's"), "it's");
    }

    #[test]
    fn test_escape_text_specials() {
        assert_eq!(text("<script>"), "&lt;script&gt;");
        assert_eq!(text("a & b"), "a &amp; b");
        assert_eq!(text("<<<"), "&lt;&lt;&lt;");
        assert_eq!(text("x\"y"), "x&quot;y");
    }

    #[test]
    fn test_escape_at_boundaries() {
        assert_eq!(text("<"), "&lt;");
        assert_eq!(text("hello<"), "hello&lt;");
        assert_eq!(text("<hello"), "&lt;hello");
    }

    #[test]
    fn test_escape_attr_quotes() {
        assert_eq!(attr("it's \"x\""), "it&#39;s &quot;x&quot;");
        assert_eq!(attr("<>&\"'"), "&lt;&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_escape_unicode_untouched() {
        assert_eq!(text("Grüße <tag>"), "Grüße &lt;tag&gt;");
    }

    #[test]
    fn test_href_encoding() {
        assert_eq!(href("/a b"), "/a%20b");
        assert_eq!(href("/q?a=1&b=2"), "/q?a=1&amp;b=2");
        assert_eq!(href("a\"b"), "a%22b");
        assert_eq!(href("ä"), "%C3%A4");
        assert_eq!(href("%20ok"), "%20ok");
        assert_eq!(href("a\\b"), "a%5Cb");
    }
}
