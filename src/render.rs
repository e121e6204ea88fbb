//! HTML rendering.
//!
//! [`HtmlRenderer`] drives a [`Walker`] over the tree and writes tags into an
//! [`HtmlWriter`]. Block tags are separated by [`HtmlWriter::cr`], which
//! only emits a newline when the output does not already end with one.

use crate::escape;
use crate::node::{NodeId, NodeKind, Tree};
use crate::walker::{WalkEvent, Walker};
use crate::Options;

/// HTML output buffer.
///
/// # Example
/// ```
/// use tipmark::render::HtmlWriter;
///
/// let mut writer = HtmlWriter::with_capacity_for(16);
/// writer.write_str("<p>");
/// writer.write_escaped_text(b"Hello <World>");
/// writer.write_str("</p>");
/// writer.cr();
/// assert_eq!(writer.into_string(), "<p>Hello &lt;World&gt;</p>\n");
/// ```
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: Vec<u8>,
}

impl HtmlWriter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve for an input of `input_len` bytes; HTML runs about 1.25x.
    #[inline]
    pub fn with_capacity_for(input_len: usize) -> Self {
        Self {
            out: Vec::with_capacity(input_len + input_len / 4),
        }
    }

    /// Wrap an existing buffer, appending after its contents.
    #[inline]
    pub fn from_vec(out: Vec<u8>) -> Self {
        Self { out }
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        self.out.push(b);
    }

    #[inline]
    pub fn write_escaped_text(&mut self, text: &[u8]) {
        escape::escape_text_into(&mut self.out, text);
    }

    #[inline]
    pub fn write_escaped_attr(&mut self, attr: &[u8]) {
        escape::escape_attr_into(&mut self.out, attr);
    }

    #[inline]
    pub fn write_href(&mut self, url: &[u8]) {
        escape::escape_href_into(&mut self.out, url);
    }

    /// Write a newline unless the output is empty or already ends in one.
    #[inline]
    pub fn cr(&mut self) {
        if self.out.last().is_some_and(|&b| b != b'\n') {
            self.out.push(b'\n');
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.out
    }

    /// Take the output as a `String`.
    ///
    /// Input that was not valid UTF-8 has its bad sequences replaced.
    pub fn into_string(self) -> String {
        String::from_utf8(self.out)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
    }

    /// Write a u32 as decimal.
    fn write_u32(&mut self, mut n: u32) {
        let mut buf = [0u8; 10];
        let mut i = buf.len();
        loop {
            i -= 1;
            buf[i] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        self.write_bytes(&buf[i..]);
    }
}

impl std::fmt::Write for HtmlWriter {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.out.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Renders a parsed [`Tree`] as HTML.
pub struct HtmlRenderer<'t> {
    tree: &'t Tree,
    sourcepos: bool,
}

impl<'t> HtmlRenderer<'t> {
    pub fn new(tree: &'t Tree, options: &Options) -> Self {
        Self {
            tree,
            sourcepos: options.sourcepos,
        }
    }

    /// Render the whole document into `w`.
    pub fn render(&self, w: &mut HtmlWriter) {
        let mut walker = self.tree.walker();
        while let Some(WalkEvent { node, entering }) = walker.next(self.tree) {
            if entering {
                self.enter(node, w, &mut walker);
            } else {
                self.exit(node, w);
            }
        }
    }

    fn enter(&self, id: NodeId, w: &mut HtmlWriter, walker: &mut Walker) {
        let node = &self.tree[id];
        match node.kind() {
            NodeKind::Document => {}
            NodeKind::Paragraph => {
                w.cr();
                self.open_block(id, "p", w);
            }
            NodeKind::Header => {
                w.cr();
                w.write_str("<h");
                w.write_byte(b'0' + node.level());
                self.write_sourcepos(id, w);
                w.write_byte(b'>');
            }
            NodeKind::BlockQuote => {
                w.cr();
                self.open_block(id, "blockquote", w);
                w.cr();
            }
            NodeKind::HorizontalRule => {
                w.cr();
                w.write_str("<hr");
                self.write_sourcepos(id, w);
                w.write_str(" />");
                w.cr();
            }
            NodeKind::Text => w.write_escaped_text(node.literal()),
            NodeKind::Emph => w.write_str("<em>"),
            NodeKind::Strong => w.write_str("<strong>"),
            NodeKind::Link => {
                w.write_str("<a href=\"");
                if let Some(target) = node.link() {
                    w.write_href(&target.destination);
                    if !target.title.is_empty() {
                        w.write_str("\" title=\"");
                        w.write_escaped_attr(&target.title);
                    }
                }
                w.write_str("\">");
            }
            NodeKind::Image => {
                w.write_str("<img src=\"");
                if let Some(target) = node.link() {
                    w.write_href(&target.destination);
                }
                w.write_str("\" alt=\"");
                w.write_escaped_attr(&self.tree.text_content(id));
                if let Some(target) = node.link().filter(|t| !t.title.is_empty()) {
                    w.write_str("\" title=\"");
                    w.write_escaped_attr(&target.title);
                }
                w.write_str("\" />");
                // The alt text already covers the children.
                walker.resume_at(id, false);
            }
        }
    }

    fn exit(&self, id: NodeId, w: &mut HtmlWriter) {
        let node = &self.tree[id];
        match node.kind() {
            NodeKind::Paragraph => {
                w.write_str("</p>");
                w.cr();
            }
            NodeKind::Header => {
                w.write_str("</h");
                w.write_byte(b'0' + node.level());
                w.write_byte(b'>');
                w.cr();
            }
            NodeKind::BlockQuote => {
                w.cr();
                w.write_str("</blockquote>");
                w.cr();
            }
            NodeKind::Emph => w.write_str("</em>"),
            NodeKind::Strong => w.write_str("</strong>"),
            NodeKind::Link => w.write_str("</a>"),
            NodeKind::Document | NodeKind::HorizontalRule | NodeKind::Text | NodeKind::Image => {}
        }
    }

    fn open_block(&self, id: NodeId, tag: &str, w: &mut HtmlWriter) {
        w.write_byte(b'<');
        w.write_str(tag);
        self.write_sourcepos(id, w);
        w.write_byte(b'>');
    }

    fn write_sourcepos(&self, id: NodeId, w: &mut HtmlWriter) {
        if !self.sourcepos {
            return;
        }
        let pos = self.tree[id].source_pos();
        w.write_str(" data-sourcepos=\"");
        w.write_u32(pos.start_line);
        w.write_byte(b':');
        w.write_u32(pos.start_column);
        w.write_byte(b'-');
        w.write_u32(pos.end_line);
        w.write_byte(b':');
        w.write_u32(pos.end_column);
        w.write_byte(b'"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_capacity() {
        let writer = HtmlWriter::with_capacity_for(1000);
        assert!(writer.out.capacity() >= 1250);
        assert!(writer.is_empty());
    }

    #[test]
    fn test_cr_never_doubles() {
        let mut w = HtmlWriter::new();
        w.cr();
        assert!(w.is_empty());
        w.write_str("<p>");
        w.cr();
        w.cr();
        assert_eq!(w.as_bytes(), b"<p>\n");
    }

    #[test]
    fn test_write_u32() {
        let mut w = HtmlWriter::new();
        w.write_u32(0);
        w.write_byte(b' ');
        w.write_u32(4_294_967_295);
        assert_eq!(w.as_bytes(), b"0 4294967295");
    }

    #[test]
    fn test_into_string_lossy() {
        let w = HtmlWriter::from_vec(vec![b'a', 0xFF]);
        assert_eq!(w.into_string(), "a\u{FFFD}");
    }

    #[test]
    fn test_fmt_write() {
        use std::fmt::Write;
        let mut w = HtmlWriter::new();
        write!(w, "<h{}>", 3).unwrap();
        assert_eq!(w.as_bytes(), b"<h3>");
    }
}
