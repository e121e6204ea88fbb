//! Delimiter runs and the delimiter stack.
//!
//! The stack is a `Vec` of entries threaded into a doubly linked list by
//! index. Removal only unlinks an entry, so indices held by brackets and
//! `stack_bottom` arguments stay valid for the whole block.

use crate::node::NodeId;

/// Flanking classification of a delimiter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flanking {
    pub left: bool,
    pub right: bool,
    /// Character before the run is punctuation.
    pub before_punct: bool,
    /// Character after the run is punctuation.
    pub after_punct: bool,
}

impl Flanking {
    /// Classify the run `subject[start..end]`.
    ///
    /// Start and end of the subject count as whitespace.
    pub fn scan(subject: &[u8], start: usize, end: usize) -> Self {
        let before = char_before(subject, start).unwrap_or('\n');
        let after = char_at(subject, end).unwrap_or('\n');

        let before_space = before.is_whitespace();
        let after_space = after.is_whitespace();
        let before_punct = before.is_ascii_punctuation();
        let after_punct = after.is_ascii_punctuation();

        Self {
            left: !after_space && (!after_punct || before_space || before_punct),
            right: !before_space && (!before_punct || after_space || after_punct),
            before_punct,
            after_punct,
        }
    }

    /// Whether a run of `ch` with this flanking may open emphasis.
    pub fn can_open(self, ch: u8) -> bool {
        match ch {
            b'_' => self.left && (!self.right || self.before_punct),
            _ => self.left,
        }
    }

    /// Whether a run of `ch` with this flanking may close emphasis.
    pub fn can_close(self, ch: u8) -> bool {
        match ch {
            b'_' => self.right && (!self.left || self.after_punct),
            _ => self.right,
        }
    }
}

fn char_at(subject: &[u8], pos: usize) -> Option<char> {
    let rest = subject.get(pos..)?;
    // One scalar is at most four bytes.
    let rest = &rest[..rest.len().min(4)];
    let chunk = rest.utf8_chunks().next()?;
    Some(chunk.valid().chars().next().unwrap_or(char::REPLACEMENT_CHARACTER))
}

fn char_before(subject: &[u8], pos: usize) -> Option<char> {
    if pos == 0 {
        return None;
    }
    let mut start = pos - 1;
    while start > 0 && pos - start < 4 && subject[start] & 0xC0 == 0x80 {
        start -= 1;
    }
    match std::str::from_utf8(&subject[start..pos]) {
        Ok(s) => s.chars().next_back(),
        Err(_) => Some(char::REPLACEMENT_CHARACTER),
    }
}

/// One delimiter run on the stack.
#[derive(Debug, Clone)]
pub struct Delimiter {
    /// Text node holding the run's literal.
    pub node: NodeId,
    /// `*`, `_`, `'`, or `"`.
    pub ch: u8,
    /// Characters not yet consumed by emphasis.
    pub remaining: usize,
    pub can_open: bool,
    pub can_close: bool,
    /// False once the entry has been removed.
    pub active: bool,
    pub flanking: Flanking,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Delimiter {
    pub fn new(node: NodeId, ch: u8, length: usize, can_open: bool, can_close: bool, flanking: Flanking) -> Self {
        Self {
            node,
            ch,
            remaining: length,
            can_open,
            can_close,
            active: true,
            flanking,
            prev: None,
            next: None,
        }
    }
}

/// Stack of delimiter runs for one block.
#[derive(Debug, Default)]
pub struct DelimiterStack {
    entries: Vec<Delimiter>,
    /// Lowest linked entry.
    head: Option<usize>,
    /// Highest linked entry.
    top: Option<usize>,
}

impl DelimiterStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.head = None;
        self.top = None;
    }

    #[inline]
    pub fn top(&self) -> Option<usize> {
        self.top
    }

    /// Push an entry and return its index.
    pub fn push(&mut self, mut delim: Delimiter) -> usize {
        let idx = self.entries.len();
        delim.prev = self.top;
        delim.next = None;
        self.entries.push(delim);
        match self.top {
            Some(top) => self.entries[top].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.top = Some(idx);
        idx
    }

    #[inline]
    pub fn get(&self, idx: usize) -> &Delimiter {
        &self.entries[idx]
    }

    #[inline]
    pub fn get_mut(&mut self, idx: usize) -> &mut Delimiter {
        &mut self.entries[idx]
    }

    #[inline]
    pub fn prev(&self, idx: usize) -> Option<usize> {
        self.entries[idx].prev
    }

    #[inline]
    pub fn next(&self, idx: usize) -> Option<usize> {
        self.entries[idx].next
    }

    /// First linked entry above `bottom` (`None` means the whole stack).
    pub fn first_above(&self, bottom: Option<usize>) -> Option<usize> {
        match bottom {
            Some(b) => self.entries[b].next,
            None => self.head,
        }
    }

    /// Unlink an entry and mark it inactive.
    pub fn remove(&mut self, idx: usize) {
        let (prev, next) = {
            let d = &self.entries[idx];
            if !d.active {
                return;
            }
            (d.prev, d.next)
        };
        match prev {
            Some(p) => self.entries[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.entries[n].prev = prev,
            None => self.top = prev,
        }
        let d = &mut self.entries[idx];
        d.prev = None;
        d.next = None;
        d.active = false;
    }

    /// Remove every entry above `bottom`.
    pub fn truncate_to(&mut self, bottom: Option<usize>) {
        while let Some(top) = self.top {
            if Some(top) == bottom {
                break;
            }
            self.remove(top);
        }
    }

    /// Linked entries from bottom to top.
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Delimiter> + '_ {
        std::iter::successors(self.head, |&i| self.entries[i].next).map(|i| &self.entries[i])
    }
}
