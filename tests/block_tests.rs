//! Block structure tests through the public API.

use pretty_assertions::assert_eq;
use tipmark::{parse, NodeId, NodeKind, Tree, TreeDump};

fn kinds(tree: &Tree, parent: NodeId) -> Vec<NodeKind> {
    tree.children(parent).map(|c| tree[c].kind()).collect()
}

fn nth_child(tree: &Tree, parent: NodeId, n: usize) -> NodeId {
    tree.children(parent).nth(n).unwrap()
}

#[test]
fn test_document_structure() {
    let tree = parse(b"# Title\n\nFirst para\ncontinued.\n\n***\n\n> quoted\n");
    let root = tree.root();
    assert_eq!(
        kinds(&tree, root),
        vec![
            NodeKind::Header,
            NodeKind::Paragraph,
            NodeKind::HorizontalRule,
            NodeKind::BlockQuote,
        ]
    );
}

#[test]
fn test_dump_of_small_document() {
    let tree = parse(b"# Hi\n\n> *a*\n");
    let expected = "\
Document [1:1-3:5]
  Header level=1 [1:1-1:4]
    Text \"Hi\"
  BlockQuote [3:1-3:5]
    Paragraph [3:3-3:5]
      Emph
        Text \"a\"
";
    assert_eq!(TreeDump::new(&tree).to_string(), expected);
}

#[test]
fn test_header_positions_and_levels() {
    let tree = parse(b"### Three ###\n  ## Two");
    let root = tree.root();
    let three = nth_child(&tree, root, 0);
    let two = nth_child(&tree, root, 1);
    assert_eq!(tree[three].level(), 3);
    assert_eq!(tree[two].level(), 2);
    assert_eq!(tree[two].source_pos().start_column, 3);
    assert_eq!(tree.text_content(three), b"Three");
    assert_eq!(tree.text_content(two), b"Two");
}

#[test]
fn test_empty_headers() {
    let tree = parse(b"#\n## ##\n");
    let root = tree.root();
    assert_eq!(kinds(&tree, root), vec![NodeKind::Header, NodeKind::Header]);
    for header in tree.children(root) {
        assert_eq!(tree[header].first_child(), None);
    }
}

#[test]
fn test_thematic_break_variants() {
    for input in ["***", "---", "___", " - - -", "*\t*\t*", "_____________"] {
        let tree = parse(input.as_bytes());
        assert_eq!(
            kinds(&tree, tree.root()),
            vec![NodeKind::HorizontalRule],
            "input {input:?}"
        );
    }
    for input in ["**", "*-*", "    ***", "--- x"] {
        let tree = parse(input.as_bytes());
        assert_eq!(
            kinds(&tree, tree.root()),
            vec![NodeKind::Paragraph],
            "input {input:?}"
        );
    }
}

#[test]
fn test_thematic_break_interrupts_paragraph() {
    let tree = parse(b"text\n___\nmore");
    assert_eq!(
        kinds(&tree, tree.root()),
        vec![NodeKind::Paragraph, NodeKind::HorizontalRule, NodeKind::Paragraph]
    );
}

#[test]
fn test_block_quote_with_blank_marker_line() {
    let tree = parse(b"> a\n>\n> b\n");
    let root = tree.root();
    assert_eq!(kinds(&tree, root), vec![NodeKind::BlockQuote]);
    let quote = nth_child(&tree, root, 0);
    assert_eq!(kinds(&tree, quote), vec![NodeKind::Paragraph, NodeKind::Paragraph]);
}

#[test]
fn test_block_quote_marker_without_space() {
    let tree = parse(b">tight");
    let quote = nth_child(&tree, tree.root(), 0);
    let para = nth_child(&tree, quote, 0);
    assert_eq!(tree.text_content(para), b"tight");
}

#[test]
fn test_lazy_continuation_in_nested_quote() {
    let tree = parse(b"> > a\nb\n");
    let outer = nth_child(&tree, tree.root(), 0);
    let inner = nth_child(&tree, outer, 0);
    let para = nth_child(&tree, inner, 0);
    assert_eq!(tree.text_content(para), b"a\nb");
}

#[test]
fn test_no_lazy_continuation_for_new_block() {
    // A header line is not lazy text: it closes the quote.
    let tree = parse(b"> a\n# b\n");
    assert_eq!(
        kinds(&tree, tree.root()),
        vec![NodeKind::BlockQuote, NodeKind::Header]
    );
}

#[test]
fn test_quote_ends_at_blank_line() {
    let tree = parse(b"> a\n\n> b\n");
    assert_eq!(
        kinds(&tree, tree.root()),
        vec![NodeKind::BlockQuote, NodeKind::BlockQuote]
    );
}

#[test]
fn test_every_block_closed() {
    let tree = parse(b"> > # x\n> ---\n\npara\n");
    for event in tree.walk() {
        let node = &tree[event.node];
        if node.kind().is_block() {
            assert!(!node.is_open(), "{} still open", node.kind());
            assert!(node.content().is_empty(), "{} kept raw content", node.kind());
        }
    }
}

#[test]
fn test_leading_indent_stripped_from_paragraph_lines() {
    let tree = parse(b"  one\n     two");
    let para = nth_child(&tree, tree.root(), 0);
    assert_eq!(tree.text_content(para), b"one\ntwo");
}

#[test]
fn test_tab_indent_blocks_header() {
    let tree = parse(b"\t# not a header");
    assert_eq!(kinds(&tree, tree.root()), vec![NodeKind::Paragraph]);
}

#[test]
fn test_last_line_blank_propagation() {
    let tree = parse(b"para\n\n");
    let root = tree.root();
    let para = nth_child(&tree, root, 0);
    assert!(tree[para].last_line_blank());
    assert!(tree[root].last_line_blank());
}
