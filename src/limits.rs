//! Fixed parsing constants.
//!
//! The bounded ones keep pathological inputs from causing
//! quadratic or worse scanning.

/// Tabs advance the column to the next multiple of this.
pub const TAB_STOP: usize = 4;

/// Indent (in columns) at which a line no longer starts a block.
pub const CODE_INDENT: usize = 4;

/// Deepest ATX header level.
pub const MAX_HEADER_LEVEL: usize = 6;

/// Minimum number of markers in a thematic break.
pub const MIN_THEMATIC_BREAK_MARKERS: usize = 3;

/// Maximum parentheses nesting in link destinations (CommonMark: 32)
pub const MAX_LINK_PAREN_DEPTH: usize = 32;

/// Longest entity reference considered for decoding, including `&` and `;`.
pub const MAX_ENTITY_LEN: usize = 32;
