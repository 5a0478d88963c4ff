use crate::error::ScanError;
use crate::reader::CharacterSource;

/// Trailing sentinel; inner scan loops dispatch on a single character read
/// and only then distinguish buffered NUL data from the window edge.
pub(crate) const SENTINEL: char = '\0';

/// Initial window capacity in code units.
const MIN_CAPACITY: usize = 2048;

/// Sliding character window over a `CharacterSource`.
///
/// Holds the lookahead buffer and the position bookkeeping. The buffer keeps
/// one slot past `filled` for the sentinel; `line_anchor` is signed because a
/// shift may relocate the start of the current line to before offset zero
/// while the derived column stays unchanged.
pub(crate) struct CharWindow<S> {
    source: S,
    buf: Vec<char>,
    /// How far the buffer is filled; `buf[filled] == SENTINEL`.
    filled: usize,
    cursor: usize,
    line_anchor: isize,
    /// 0-based internally, exposed as +1.
    line_index: usize,
    source_done: bool,
}

impl<S: CharacterSource> CharWindow<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buf: vec![SENTINEL; MIN_CAPACITY],
            filled: 0,
            cursor: 0,
            line_anchor: 0,
            line_index: 0,
            source_done: false,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Line containing the cursor, 1-based.
    pub fn line(&self) -> usize {
        self.line_index + 1
    }

    /// Column of the cursor within its line, 1-based. Tabs count as one.
    pub fn column(&self) -> usize {
        (self.cursor as isize - self.line_anchor + 1) as usize
    }

    /// Character under the cursor. Reads the sentinel at the window edge;
    /// callers pair that read with `at_buffer_end` / `is_eof`.
    pub fn current(&self) -> char {
        self.buf[self.cursor]
    }

    /// Character `k` positions past the cursor; valid after
    /// `has_lookahead(k)` returned true.
    pub fn char_at(&self, k: usize) -> char {
        self.buf[self.cursor + k]
    }

    pub fn at_buffer_end(&self) -> bool {
        self.cursor >= self.filled
    }

    /// Advance past the current character. Never crosses the sentinel.
    pub fn bump(&mut self) {
        debug_assert!(self.cursor < self.filled);
        self.cursor += 1;
    }

    /// Record that the cursor just crossed a newline sequence.
    pub fn mark_line_break(&mut self) {
        self.line_index += 1;
        self.line_anchor = self.cursor as isize;
    }

    /// Guarantee `buf[cursor + k]` holds buffered data, refilling (and
    /// growing) as required. `Ok(false)` means the stream has fewer than
    /// `k + 1` characters left past the cursor. Never shifts.
    pub fn has_lookahead(&mut self, k: usize) -> Result<bool, ScanError> {
        let needed = self.cursor.saturating_add(k).saturating_add(1);
        if needed <= self.filled {
            return Ok(true);
        }
        self.ensure_buffered(needed)?;
        Ok(needed <= self.filled)
    }

    /// True when no further characters can be obtained. Only meaningful when
    /// the sentinel has just been observed at the cursor.
    pub fn is_eof(&mut self) -> Result<bool, ScanError> {
        if self.cursor < self.filled {
            return Ok(false);
        }
        self.ensure_buffered(self.cursor.saturating_add(1))?;
        Ok(self.cursor >= self.filled)
    }

    /// Relocate the unread tail to offset 0 when the room ahead of the
    /// cursor has shrunk below a sixteenth of capacity. Called between
    /// tokens only, so no in-flight lexeme is discarded.
    pub fn shift_if_needed(&mut self) {
        let capacity = self.buf.len();
        if capacity - self.cursor > capacity / 16 || self.cursor == 0 {
            return;
        }
        let delta = self.cursor;
        self.buf.copy_within(delta..self.filled, 0);
        self.filled -= delta;
        self.cursor = 0;
        self.line_anchor -= delta as isize;
        self.buf[self.filled] = SENTINEL;
        log::trace!("window shifted by {delta} characters");
    }

    /// Copy of `buf[anchor..cursor]` as an owned lexeme.
    pub fn lexeme(&self, anchor: usize) -> String {
        self.buf[anchor..self.cursor].iter().collect()
    }

    fn ensure_buffered(&mut self, needed: usize) -> Result<(), ScanError> {
        if needed > self.buf.len() - 1 {
            self.grow(needed)?;
        }
        while self.filled < needed && !self.source_done {
            self.refill()?;
        }
        Ok(())
    }

    /// Fill the buffer up to one less than capacity, preserving the sentinel
    /// slot. Two consecutive zero-length reads while more was requested mark
    /// the source exhausted.
    fn refill(&mut self) -> Result<(), ScanError> {
        let limit = self.buf.len() - 1;
        let mut zero_reads = 0;
        while self.filled < limit {
            let result = self.source.fill(&mut self.buf[self.filled..limit]);
            match result {
                Ok(0) => {
                    zero_reads += 1;
                    if zero_reads == 2 {
                        self.source_done = true;
                        break;
                    }
                }
                Ok(count) => {
                    zero_reads = 0;
                    self.filled += count;
                }
                Err(source) => {
                    let (line, column) = (self.line(), self.column());
                    return Err(ScanError::source(line, column, source));
                }
            }
        }
        self.buf[self.filled] = SENTINEL;
        Ok(())
    }

    /// Double capacity until `needed` characters plus the sentinel fit.
    fn grow(&mut self, needed: usize) -> Result<(), ScanError> {
        let mut capacity = self.buf.len();
        while capacity - 1 < needed {
            capacity = match capacity.checked_mul(2) {
                Some(doubled) => doubled,
                None => return Err(ScanError::window_exhausted(self.line(), self.column())),
            };
        }
        if capacity > self.buf.len() {
            self.buf.resize(capacity, SENTINEL);
            log::trace!("window grown to {capacity} characters");
        }
        Ok(())
    }
}
