//! tipmark CLI: dump the parsed tree of a Markdown file, then its HTML.
//!
//! `tipmark -` reads from stdin. Set `RUST_LOG=debug` (or `trace`) to
//! follow the parser.

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use tipmark::{HtmlRenderer, HtmlWriter, Options, TreeDump};

const SEPARATOR: &str = "----------------------------------------";

fn main() -> Result<()> {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        println!("usage: tipmark <file.md>");
        return Ok(());
    };

    let input = if path == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read(&path).with_context(|| format!("failed to read {path}"))?
    };

    let options = Options::default();
    let tree = tipmark::parse_with_options(&input, &options);
    let mut html = HtmlWriter::with_capacity_for(input.len());
    HtmlRenderer::new(&tree, &options).render(&mut html);

    let mut out = io::stdout().lock();
    write!(out, "{}", TreeDump::new(&tree))?;
    writeln!(out, "{SEPARATOR}")?;
    out.write_all(html.as_bytes())?;
    Ok(())
}
