//! tipmark: a CommonMark-style Markdown parser with an arena document tree.
//!
//! Parsing runs in two passes over one [`Tree`]:
//! 1. [`BlockParser`] incorporates the input line by line, building the
//!    block structure (block quotes, headers, thematic breaks, paragraphs)
//! 2. [`InlineParser`] replaces each paragraph's and header's raw content
//!    with inline children, resolving emphasis with a delimiter stack
//!
//! The tree can then be traversed with a [`Walker`], rendered with
//! [`HtmlRenderer`], or printed with [`TreeDump`].
//!
//! Parsing is total: every byte sequence yields a tree.
//!
//! # Example
//! ```
//! let tree = tipmark::parse(b"> *Hello*");
//! let html = tipmark::render_html(&tree, &tipmark::Options::default());
//! assert_eq!(html, "<blockquote>\n<p><em>Hello</em></p>\n</blockquote>\n");
//! ```

pub mod block;
pub mod cursor;
pub mod dump;
pub mod escape;
pub mod inline;
pub mod limits;
pub mod node;
pub mod render;
pub mod walker;

pub use block::BlockParser;
pub use dump::TreeDump;
pub use inline::InlineParser;
pub use node::{LinkTarget, Node, NodeId, NodeKind, SourcePos, Tree};
pub use render::{HtmlRenderer, HtmlWriter};
pub use walker::{WalkEvent, Walker};

/// Parsing/rendering options.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Turn straight quotes into typographic ones.
    pub smart: bool,
    /// Add `data-sourcepos` attributes to block elements.
    pub sourcepos: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            smart: false,
            sourcepos: false,
        }
    }
}

/// Parse Markdown into a tree with default options.
pub fn parse(input: &[u8]) -> Tree {
    parse_with_options(input, &Options::default())
}

/// Parse Markdown into a tree.
pub fn parse_with_options(input: &[u8], options: &Options) -> Tree {
    let mut tree = BlockParser::new(input).parse();
    InlineParser::new(options).process_tree(&mut tree);
    tree
}

/// Render a parsed tree as HTML.
pub fn render_html(tree: &Tree, options: &Options) -> String {
    let mut writer = HtmlWriter::new();
    HtmlRenderer::new(tree, options).render(&mut writer);
    writer.into_string()
}

/// Convert Markdown to HTML.
///
/// # Example
/// ```
/// let html = tipmark::to_html("# Hello\n\nWorld");
/// assert_eq!(html, "<h1>Hello</h1>\n<p>World</p>\n");
/// ```
pub fn to_html(input: &str) -> String {
    to_html_with_options(input, &Options::default())
}

/// Convert Markdown to HTML with options.
pub fn to_html_with_options(input: &str, options: &Options) -> String {
    let tree = parse_with_options(input.as_bytes(), options);
    let mut writer = HtmlWriter::with_capacity_for(input.len());
    HtmlRenderer::new(&tree, options).render(&mut writer);
    writer.into_string()
}

/// Convert Markdown to HTML, appending to `out`.
pub fn to_html_into(input: &str, out: &mut Vec<u8>) {
    let options = Options::default();
    let tree = parse_with_options(input.as_bytes(), &options);
    let mut writer = HtmlWriter::from_vec(std::mem::take(out));
    HtmlRenderer::new(&tree, &options).render(&mut writer);
    *out = writer.into_vec();
}
