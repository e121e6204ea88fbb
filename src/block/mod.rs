//! Block-level parser for Markdown.
//!
//! The block parser is line-oriented. Each line re-descends the chain of
//! open containers, then tries block starts in a fixed order, then either
//! lazily continues an open paragraph or appends to / opens a leaf.
//!
//! Supported blocks:
//! - ATX headers
//! - Thematic breaks
//! - Block quotes
//! - Paragraphs

mod parser;
mod rules;
mod starts;

pub use parser::BlockParser;
pub use rules::{rule_for, BlockRule, Continuation};
pub use starts::BlockStart;
