//! # Backtracking Input
//!
//! Every parser in this crate reads from an [`Input`]: an append-only
//! character buffer fronted by a cursor. The buffer retains every unit
//! ever read since the parse began, which makes two things possible:
//!
//! 1. **Backtracking** - the cursor can be restored to any earlier
//!    position, no matter how far the parse has advanced since.
//! 2. **Diagnostics** - the renderer can display the region around a
//!    failure verbatim, because the consumed prefix is still in memory.
//!
//! An input is constructed either from a string (the whole buffer is
//! available up front) or from a character source, in which case the
//! buffer extends lazily by pulling from the source and caches every
//! unit so restores stay valid.

/// Position-aware character reader with checkpoint/restore.
pub struct Input {
    /// Every character read so far (all of them, for a string input).
    buf: Vec<char>,
    /// Index of the next character to consume.
    pos: usize,
    /// Remaining characters of a streaming source, if any.
    tail: Option<Box<dyn Iterator<Item = char>>>,
}

impl Input {
    /// Input backed by an in-memory string.
    pub fn from_str(text: &str) -> Self {
        Self {
            buf: text.chars().collect(),
            pos: 0,
            tail: None,
        }
    }

    /// Input backed by a character source, pulled lazily.
    pub fn from_chars(source: impl Iterator<Item = char> + 'static) -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            tail: Some(Box::new(source)),
        }
    }

    /// Extend the buffer until it holds at least `upto` characters or
    /// the source runs dry.
    fn fill(&mut self, upto: usize) {
        while self.buf.len() < upto {
            let Some(tail) = self.tail.as_mut() else { break };
            match tail.next() {
                Some(c) => self.buf.push(c),
                None => self.tail = None,
            }
        }
    }

    /// Drain the source completely into the buffer.
    fn fill_all(&mut self) {
        while let Some(tail) = self.tail.as_mut() {
            match tail.next() {
                Some(c) => self.buf.push(c),
                None => self.tail = None,
            }
        }
    }

    /// Read the next `n` characters (fewer at end of input) and advance
    /// the cursor past them.
    pub fn read(&mut self, n: usize) -> String {
        self.fill(self.pos + n);
        let end = (self.pos + n).min(self.buf.len());
        let out: String = self.buf[self.pos..end].iter().collect();
        self.pos = end;
        out
    }

    /// Read a single character, `None` at end of input.
    pub fn read1(&mut self) -> Option<char> {
        self.fill(self.pos + 1);
        let c = self.buf.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Read everything remaining, leaving the cursor at the end.
    pub fn read_all(&mut self) -> String {
        self.fill_all();
        let out: String = self.buf[self.pos..].iter().collect();
        self.pos = self.buf.len();
        out
    }

    /// Read the next `n` characters without advancing the cursor.
    pub fn peek(&mut self, n: usize) -> String {
        self.fill(self.pos + n);
        let end = (self.pos + n).min(self.buf.len());
        self.buf[self.pos..end].iter().collect()
    }

    /// Current cursor offset, in characters since the start of input.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Move the cursor back (or forward) to `position`.
    ///
    /// `position` must not exceed the number of characters retained in
    /// the buffer; the buffer only ever grows, so any offset previously
    /// returned by [`pos`](Input::pos) stays valid for the whole parse.
    pub fn restore_to(&mut self, position: usize) {
        assert!(
            position <= self.buf.len(),
            "restore_to({position}) is beyond the retained buffer ({} chars)",
            self.buf.len()
        );
        self.pos = position;
    }

    /// True iff the cursor is at the logical end of the input.
    pub fn eof(&mut self) -> bool {
        self.fill(self.pos + 1);
        self.pos >= self.buf.len()
    }

    /// Everything from the cursor to the end of input, without
    /// advancing. Drains a streaming source into the buffer first.
    pub(crate) fn remaining_string(&mut self) -> String {
        self.fill_all();
        self.buf[self.pos..].iter().collect()
    }

    /// 1-based (line, column) of the character offset `p`, computed by
    /// counting newlines in the retained prefix.
    pub fn line_col(&self, p: usize) -> (usize, usize) {
        let p = p.min(self.buf.len());
        let mut line = 1;
        let mut col = 1;
        for &c in &self.buf[..p] {
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// `[start, end)` offsets of the line containing `p`, excluding the
    /// terminating newline.
    pub(crate) fn line_window(&self, p: usize) -> (usize, usize) {
        let p = p.min(self.buf.len());
        let start = self.buf[..p]
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1);
        let end = self.buf[p..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(self.buf.len(), |i| p + i);
        (start, end)
    }

    /// Buffer contents between two offsets.
    pub(crate) fn slice(&self, start: usize, end: usize) -> String {
        self.buf[start.min(self.buf.len())..end.min(self.buf.len())]
            .iter()
            .collect()
    }

    /// Pull from the source until the line containing `p` is complete
    /// (its newline is buffered) or the source is exhausted, so the
    /// renderer can display the failing line verbatim.
    pub(crate) fn fill_through_line(&mut self, p: usize) {
        while self.tail.is_some() && !self.buf[p.min(self.buf.len())..].contains(&'\n') {
            self.fill(self.buf.len() + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_and_restore() {
        let mut input = Input::from_str("hello");
        assert_eq!(input.read(3), "hel");
        assert_eq!(input.pos(), 3);
        input.restore_to(1);
        assert_eq!(input.read(2), "el");
        assert_eq!(input.read_all(), "lo");
        assert!(input.eof());
    }

    #[test]
    fn streaming_source_caches_for_restore() {
        let mut input = Input::from_chars("abcdef".chars());
        assert_eq!(input.read(4), "abcd");
        input.restore_to(0);
        assert_eq!(input.read(6), "abcdef");
        assert_eq!(input.read(1), "");
    }

    #[test]
    fn peek_does_not_advance() {
        let mut input = Input::from_str("xyz");
        assert_eq!(input.peek(2), "xy");
        assert_eq!(input.pos(), 0);
    }

    #[test]
    fn line_col_counts_newlines() {
        let input = Input::from_str("ab\ncde\nf");
        assert_eq!(input.line_col(0), (1, 1));
        assert_eq!(input.line_col(4), (2, 2));
        assert_eq!(input.line_col(7), (3, 1));
    }

    #[test]
    fn line_window_excludes_newline() {
        let input = Input::from_str("ab\ncde\nf");
        assert_eq!(input.line_window(4), (3, 6));
        assert_eq!(input.line_window(0), (0, 2));
        assert_eq!(input.line_window(7), (7, 8));
    }
}
