//! Per-line cursor for the block parser.
//!
//! Byte offset and display column are tracked separately: indentation rules
//! are column based (tabs advance to the next multiple of [`TAB_STOP`]) while
//! content slicing is byte based.

use crate::limits::{CODE_INDENT, TAB_STOP};

/// Cursor state for the line currently being incorporated.
///
/// # Example
/// ```
/// use tipmark::cursor::LineCursor;
///
/// let mut cursor = LineCursor::new(b"\t> quote");
/// cursor.find_next_nonspace();
/// assert_eq!(cursor.next_nonspace(), 1);
/// assert_eq!(cursor.next_nonspace_column(), 4);
/// assert!(cursor.is_indented());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LineCursor<'a> {
    line: &'a [u8],
    offset: usize,
    column: usize,
    next_nonspace: usize,
    next_nonspace_column: usize,
    indent: usize,
    indented: bool,
    blank: bool,
}

impl<'a> LineCursor<'a> {
    /// Cursor at the start of `line` (which excludes its line ending).
    #[inline]
    pub fn new(line: &'a [u8]) -> Self {
        Self {
            line,
            offset: 0,
            column: 0,
            next_nonspace: 0,
            next_nonspace_column: 0,
            indent: 0,
            indented: false,
            blank: false,
        }
    }

    /// The whole current line.
    #[inline]
    pub fn line(&self) -> &'a [u8] {
        self.line
    }

    /// Current byte offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current display column (0-based).
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Byte offset of the next non-space byte, as of the last lookahead.
    #[inline]
    pub fn next_nonspace(&self) -> usize {
        self.next_nonspace
    }

    #[inline]
    pub fn next_nonspace_column(&self) -> usize {
        self.next_nonspace_column
    }

    /// Columns between the cursor and the next non-space byte.
    #[inline]
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Whether the indent reaches code-block depth.
    #[inline]
    pub fn is_indented(&self) -> bool {
        self.indented
    }

    /// Whether the rest of the line is whitespace.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.blank
    }

    /// Byte at `pos`, if inside the line.
    #[inline]
    pub fn peek(&self, pos: usize) -> Option<u8> {
        self.line.get(pos).copied()
    }

    /// Byte at the lookahead position.
    #[inline]
    pub fn peek_next_nonspace(&self) -> Option<u8> {
        self.peek(self.next_nonspace)
    }

    /// Bytes from the current offset to the end of the line.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.line[self.offset.min(self.line.len())..]
    }

    /// Bytes from the lookahead position to the end of the line.
    #[inline]
    pub fn rest_from_next_nonspace(&self) -> &'a [u8] {
        &self.line[self.next_nonspace.min(self.line.len())..]
    }

    /// Recompute the lookahead from the current position.
    pub fn find_next_nonspace(&mut self) {
        let mut i = self.offset;
        let mut cols = self.column;
        while let Some(&b) = self.line.get(i) {
            match b {
                b' ' => {
                    i += 1;
                    cols += 1;
                }
                b'\t' => {
                    i += 1;
                    cols += TAB_STOP - (cols % TAB_STOP);
                }
                _ => break,
            }
        }
        self.blank = i >= self.line.len();
        self.next_nonspace = i;
        self.next_nonspace_column = cols;
        self.indent = cols - self.column;
        self.indented = self.indent >= CODE_INDENT;
    }

    /// Advance by `count` bytes, or by at least `count` columns when
    /// `columns` is set. A tab always counts as a whole.
    pub fn advance_offset(&mut self, count: usize, columns: bool) {
        let mut bytes = 0;
        let mut cols = 0;
        loop {
            let done = if columns { cols >= count } else { bytes >= count };
            if done {
                break;
            }
            let Some(&b) = self.line.get(self.offset + bytes) else {
                debug_assert!(false, "advanced past end of line");
                break;
            };
            if b == b'\t' {
                cols += TAB_STOP - ((self.column + cols) % TAB_STOP);
            } else {
                cols += 1;
            }
            bytes += 1;
        }
        self.offset += bytes;
        self.column += cols;
    }

    /// Jump to the lookahead position.
    #[inline]
    pub fn advance_next_nonspace(&mut self) {
        self.offset = self.next_nonspace;
        self.column = self.next_nonspace_column;
    }

    /// Consume the rest of the line.
    #[inline]
    pub fn advance_to_end(&mut self) {
        let remaining = self.line.len().saturating_sub(self.offset);
        self.advance_offset(remaining, false);
    }
}
