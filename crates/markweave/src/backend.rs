//! Dialect backend contract and the shared writer state.
//!
//! Every output dialect implements two capability traits: [`InlineFormat`]
//! for escaping and inline spans, and [`BlockFormat`] for block-level
//! constructs. The dialect-independent bookkeeping — nesting stacks, the
//! pending-separator policy, the suppression counter, table accumulation —
//! lives in [`BlockState`], a composed helper that dialect methods receive
//! on every call. Dialects never inherit from each other.

use std::io::{self, Write};

use crate::table::TableGrid;
use crate::value::{Attrs, Style};

/// The block-level mode a writer is currently in, derived from which nesting
/// stacks are non-empty (table > list > flow precedence). `Closed` means the
/// writer has been closed or aborted; no block operation is legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Writer is closed; every operation is ignored.
    Closed,
    /// Regular document flow: paragraphs, headings, tables, lists may begin.
    Flow,
    /// Inside a table; only row operations are legal.
    Table,
    /// Inside a list; only item and nested-list operations are legal.
    List,
}

pub(crate) const MFLOW: u8 = 1 << 0;
pub(crate) const MTABLE: u8 = 1 << 1;
pub(crate) const MLIST: u8 = 1 << 2;

impl Mode {
    pub(crate) fn mask(self) -> u8 {
        match self {
            Mode::Closed => 0,
            Mode::Flow => MFLOW,
            Mode::Table => MTABLE,
            Mode::List => MLIST,
        }
    }
}

/// Quotation mark set used for quoted style spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quotes {
    /// Opening single quote.
    pub single_open: char,
    /// Closing single quote.
    pub single_close: char,
    /// Opening double quote.
    pub double_open: char,
    /// Closing double quote.
    pub double_close: char,
}

/// Plain ASCII quotation marks (`'` and `"`).
pub const ASCII_QUOTES: Quotes = Quotes {
    single_open: '\'',
    single_close: '\'',
    double_open: '"',
    double_close: '"',
};

/// Typographical quotation marks (`‘’` and `“”`).
pub const TYPOGRAPHIC_QUOTES: Quotes = Quotes {
    single_open: '\u{2018}',
    single_close: '\u{2019}',
    double_open: '\u{201C}',
    double_close: '\u{201D}',
};

impl Default for Quotes {
    fn default() -> Self {
        ASCII_QUOTES
    }
}

impl Quotes {
    pub(crate) fn open(self, style: Style) -> char {
        match style {
            Style::SingleQuoted => self.single_open,
            Style::DoubleQuoted => self.double_open,
            Style::Emphasized | Style::Strong => '\0',
        }
    }

    pub(crate) fn close(self, style: Style) -> char {
        match style {
            Style::SingleQuoted => self.single_close,
            Style::DoubleQuoted => self.double_close,
            Style::Emphasized | Style::Strong => '\0',
        }
    }
}

/// One open list nesting level.
#[derive(Clone, Copy, Debug)]
pub struct ListLevel {
    /// Next item number for ordered levels; -1 marks an unordered level.
    pub counter: i64,
    /// Items of this level are separated by blank lines.
    pub broad: bool,
}

impl ListLevel {
    /// Whether this level numbers its items.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        self.counter >= 0
    }
}

/// Shared inline bookkeeping: open style spans and the open link, if any.
/// Both must be empty when the document closes.
#[derive(Default)]
pub(crate) struct InlineState {
    pub(crate) style_stack: Vec<Style>,
    pub(crate) pending_link: Option<String>,
}

/// Dialect-independent block state: the sink, the pending-separator slot,
/// the suppression counter, and the three nesting stacks that the current
/// [`Mode`] is derived from.
pub struct BlockState<W> {
    out: W,
    disable_depth: usize,
    /// Pending line breaks before the next write: 0, 1, or 2.
    eols: usize,
    sect_levels: Vec<i64>,
    list_levels: Vec<ListLevel>,
    pub(crate) table: TableGrid,
}

impl<W: Write> BlockState<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            disable_depth: 0,
            eols: 0,
            sect_levels: Vec::new(),
            list_levels: Vec::new(),
            table: TableGrid::default(),
        }
    }

    /// Current mode, computed from stack shapes so it can never
    /// desynchronize from them.
    #[must_use]
    pub fn current_mode(&self) -> Mode {
        if !self.table.is_empty() {
            Mode::Table
        } else if !self.list_levels.is_empty() {
            Mode::List
        } else if !self.sect_levels.is_empty() {
            Mode::Flow
        } else {
            Mode::Closed
        }
    }

    /// Check that the current mode is one of `wanted`.
    ///
    /// Returns `false` when the writer is closed (the operation is silently
    /// ignored). Panics when the mode does not match: that is a structural
    /// usage error in the caller, not a runtime condition.
    pub(crate) fn check_mode(&self, wanted: u8) -> bool {
        let m = self.current_mode();
        if m == Mode::Closed {
            return false;
        }
        assert!(
            wanted & m.mask() != 0,
            "markweave: operation is not allowed in {m:?} mode"
        );
        true
    }

    /// Whether output is currently enabled (suppression depth is zero).
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.disable_depth == 0
    }

    pub(crate) fn push_disabled(&mut self) {
        self.disable_depth += 1;
    }

    pub(crate) fn pop_disabled(&mut self) {
        self.disable_depth = self.disable_depth.saturating_sub(1);
    }

    /// Request a single line break before the next write, unless one is
    /// already pending while output is suppressed.
    pub fn want_nextln(&mut self) {
        if self.eols == 0 || self.enabled() {
            self.eols = 1;
        }
    }

    /// Request a blank line before the next write. Escalates over a pending
    /// single break; never accumulates past one blank line.
    pub fn want_emptyln(&mut self) {
        self.eols = 2;
    }

    /// Force a pending single break, downgrading a pending blank line.
    pub fn force_nextln(&mut self) {
        self.eols = 1;
    }

    /// Emit the pending separator (at most one blank line) and reset it.
    pub fn flush_separators(&mut self) -> io::Result<()> {
        let n = self.eols.min(2);
        self.eols = 0;
        self.out.write_all(&b"\n\n"[..n])
    }

    /// Write a fragment verbatim. Callers guard with [`enabled`](Self::enabled).
    pub fn write_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    /// Direct access to the sink for dialect table/code rendering.
    /// Callers guard with [`enabled`](Self::enabled).
    pub fn sink(&mut self) -> &mut W {
        &mut self.out
    }

    #[cfg(test)]
    pub(crate) fn into_sink(self) -> W {
        self.out
    }

    /// Write `fill` (cycled) until `n` columns are covered.
    pub fn write_repeat(&mut self, n: usize, fill: &str) -> io::Result<()> {
        write_repeat(&mut self.out, n, fill)
    }

    /// Write a block: flush the pending separator, then the content.
    /// No-op while output is suppressed.
    pub fn put_block(&mut self, s: &str) -> io::Result<()> {
        if self.enabled() {
            self.flush_separators()?;
            self.out.write_all(s.as_bytes())?;
        }
        Ok(())
    }

    /// Write an indented block with a prefix and postfix around the content.
    /// Indentation is two spaces per level. No-op while output is suppressed.
    pub fn put_block_ex(
        &mut self,
        indent_level: usize,
        prefix: &str,
        s: &str,
        postfix: &str,
    ) -> io::Result<()> {
        if self.enabled() {
            self.flush_separators()?;
            write_repeat(&mut self.out, 2 * indent_level, " ")?;
            self.out.write_all(prefix.as_bytes())?;
            self.out.write_all(s.as_bytes())?;
            self.out.write_all(postfix.as_bytes())?;
        }
        Ok(())
    }

    pub(crate) fn sect_level_in(&mut self) {
        self.sect_levels.push(0);
    }

    pub(crate) fn sect_level_out(&mut self) {
        assert!(
            self.sect_levels.len() > 1,
            "markweave: unpaired end_section call"
        );
        self.sect_levels.pop();
    }

    pub(crate) fn sect_depth(&self) -> usize {
        self.sect_levels.len()
    }

    pub(crate) fn bump_sect_counter(&mut self) {
        if let Some(top) = self.sect_levels.last_mut() {
            *top += 1;
        }
    }

    /// Section heading counters, outermost first.
    #[must_use]
    pub fn sect_counters(&self) -> &[i64] {
        &self.sect_levels
    }

    pub(crate) fn list_level_in(&mut self, initial: i64, broad: bool) {
        self.list_levels.push(ListLevel {
            counter: initial,
            broad,
        });
    }

    pub(crate) fn list_level_out(&mut self) {
        self.list_levels.pop();
    }

    /// Open list levels, outermost first.
    #[must_use]
    pub fn list_levels(&self) -> &[ListLevel] {
        &self.list_levels
    }

    /// Advance the innermost ordered counter and return the updated levels.
    /// Unordered levels are left at -1. Advancing is independent of the
    /// suppression state so that numbering stays continuous when output is
    /// re-enabled mid-list.
    pub(crate) fn bump_list_counter(&mut self) {
        if let Some(top) = self.list_levels.last_mut()
            && top.counter >= 0
        {
            top.counter += 1;
        }
    }

    pub(crate) fn take_table(&mut self) -> TableGrid {
        std::mem::take(&mut self.table)
    }

    /// Teardown at close: clears all stacks, flushes the final separator.
    pub(crate) fn close(&mut self) -> io::Result<()> {
        self.table.clear();
        self.sect_levels.clear();
        self.list_levels.clear();
        self.flush_separators()
    }
}

/// Write `fill` repeatedly (cycling through it) until `n` bytes are written.
/// An empty `fill` falls back to spaces. `fill` must be ASCII for the count
/// to line up with display columns.
pub(crate) fn write_repeat<W: Write>(out: &mut W, mut n: usize, fill: &str) -> io::Result<()> {
    let fill = if fill.is_empty() { "        " } else { fill };
    let b = fill.as_bytes();
    while n >= b.len() {
        out.write_all(b)?;
        n -= b.len();
    }
    out.write_all(&b[..n])
}

/// Inline-level formatting contract implemented per dialect: escaping, code
/// spans, style spans, link spans. Spans are emitted into an in-flight
/// `String` buffer owned by the current block operation.
pub trait InlineFormat {
    /// Append `s` to `buf` with dialect escaping applied.
    fn escape(&self, buf: &mut String, s: &str);

    /// Append a code span with escaped content.
    fn code_str(&self, buf: &mut String, s: &str);

    /// Append a code span with verbatim content.
    fn code_raw(&self, buf: &mut String, s: &str);

    /// Open a styled span. Quoted styles insert the dialect's configured
    /// quotation marks; strong/emphasis use dialect markup.
    fn begin_styled(&self, buf: &mut String, style: Style);

    /// Close the innermost styled span.
    fn end_styled(&self, buf: &mut String, style: Style);

    /// Open a link span to `url` (already URL-filtered).
    fn begin_link(&self, buf: &mut String, url: &str);

    /// Close the link span opened for `url`.
    fn end_link(&self, buf: &mut String, url: &str);

    /// One-shot link. An empty caption, or one identical to the URL,
    /// collapses to the URL itself.
    fn simple_link(&self, buf: &mut String, caption: &str, url: &str);
}

/// Block-level formatting contract implemented per dialect. Every method
/// receives the shared [`BlockState`] and is responsible for honoring the
/// suppression flag and registering its trailing separator.
pub trait BlockFormat<W: Write> {
    /// Dialect preamble written at construction (HTML envelope).
    fn open_document(&self, st: &mut BlockState<W>) -> io::Result<()> {
        let _ = st;
        Ok(())
    }

    /// Dialect postamble written at close.
    fn close_document(&self, st: &mut BlockState<W>) -> io::Result<()> {
        let _ = st;
        Ok(())
    }

    /// Paragraph block.
    fn para(&self, st: &mut BlockState<W>, s: &str) -> io::Result<()>;

    /// Heading block. `counters` is the full section counter stack; its
    /// length is the nesting depth.
    fn heading(
        &self,
        st: &mut BlockState<W>,
        counters: &[i64],
        attrs: Option<&Attrs>,
        s: &str,
    ) -> io::Result<()>;

    /// Paragraph that titles the list that follows it.
    fn list_title(&self, st: &mut BlockState<W>, s: &str) -> io::Result<()>;

    /// A list level was entered; `levels` already includes it. `from_broad`
    /// is set when the parent level is broad.
    fn list_level_start(
        &self,
        st: &mut BlockState<W>,
        levels: &[ListLevel],
        from_broad: bool,
    ) -> io::Result<()>;

    /// A list level is about to be left; `levels` still includes it.
    /// `to_broad` is set when the parent level is broad.
    fn list_level_done(
        &self,
        st: &mut BlockState<W>,
        levels: &[ListLevel],
        to_broad: bool,
    ) -> io::Result<()>;

    /// List item, possibly spanning several paragraphs. The innermost level
    /// carries the item number (already advanced) and the broad flag.
    fn list_item(
        &self,
        st: &mut BlockState<W>,
        levels: &[ListLevel],
        paragraphs: &[String],
    ) -> io::Result<()>;

    /// Render the accumulated table. A grid without data rows renders
    /// nothing, but the trailing separator is still registered.
    fn end_table(&self, st: &mut BlockState<W>, grid: &TableGrid) -> io::Result<()>;

    /// Code block with an optional language tag.
    fn codeblock(&self, st: &mut BlockState<W>, lang: &str, text: &str) -> io::Result<()>;
}
