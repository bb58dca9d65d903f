//! Mode-checked document writer.
//!
//! [`Writer`] is the frontend: it converts inline values through the
//! dialect's [`InlineFormat`], checks every operation against the current
//! [`Mode`], and hands finished block content to the dialect's
//! [`BlockFormat`]. The mode is derived from the nesting stacks, so it can
//! never drift from the document structure.
//!
//! Calling an operation in the wrong mode panics; that is a structural bug
//! in the calling code. Recoverable conditions (I/O failure, unconvertible
//! values, unbalanced scopes detected at close) come back as [`Error`].

use std::io::Write;
use std::ops::BitOr;
use std::slice;

use crate::backend::{
    BlockFormat, BlockState, InlineFormat, InlineState, MFLOW, MLIST, MTABLE, Mode,
};
use crate::error::Error;
use crate::html::{HtmlDialect, HtmlOptions};
use crate::markdown::{MarkdownDialect, MarkdownOptions};
use crate::printer::{Printer, UrlFilter};
use crate::text::{TextDialect, TextOptions};
use crate::value::{Attrs, Inline};

/// List flavor, built by combining the flag constants with `|`:
/// `ListKind::ORDERED | ListKind::BROAD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListKind(u8);

impl ListKind {
    /// Unnumbered items (the default marker style).
    pub const UNORDERED: ListKind = ListKind(0);
    /// Items numbered from 1 per nesting level.
    pub const ORDERED: ListKind = ListKind(1);
    /// Items on consecutive lines (the default spacing).
    pub const TIGHT: ListKind = ListKind(0);
    /// Items separated by blank lines; items may span several paragraphs.
    pub const BROAD: ListKind = ListKind(2);

    /// Whether items of this kind are numbered.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        self.0 & Self::ORDERED.0 != 0
    }

    /// Whether items of this kind are separated by blank lines.
    #[must_use]
    pub fn is_broad(self) -> bool {
        self.0 & Self::BROAD.0 != 0
    }
}

impl BitOr for ListKind {
    type Output = ListKind;

    fn bitor(self, rhs: ListKind) -> ListKind {
        ListKind(self.0 | rhs.0)
    }
}

/// Document writer over dialect `D`, emitting to sink `W`.
///
/// Constructed through the per-dialect aliases ([`TextWriter`],
/// [`MarkdownWriter`], [`HtmlWriter`]). The writer starts in
/// [`Mode::Flow`] and must be finished with [`close`](Writer::close); output
/// written after close is silently discarded.
pub struct Writer<D, W: Write> {
    dialect: D,
    blocks: BlockState<W>,
    inline: InlineState,
    url_filter: Option<UrlFilter>,
    closed: bool,
}

/// Plain text writer.
pub type TextWriter<W> = Writer<TextDialect, W>;

/// Markdown writer.
pub type MarkdownWriter<W> = Writer<MarkdownDialect, W>;

/// HTML writer.
pub type HtmlWriter<W> = Writer<HtmlDialect, W>;

impl<W: Write> TextWriter<W> {
    /// Writer emitting plain text to `out`.
    ///
    /// # Errors
    ///
    /// Fails when the sink rejects the preamble.
    pub fn new(out: W, opts: TextOptions) -> Result<Self, Error> {
        let dialect = TextDialect::new(&opts);
        Writer::init(dialect, out, opts.bom, opts.url_filter)
    }
}

impl<W: Write> MarkdownWriter<W> {
    /// Writer emitting Markdown to `out`.
    ///
    /// # Errors
    ///
    /// Fails when the sink rejects the preamble.
    pub fn new(out: W, opts: MarkdownOptions) -> Result<Self, Error> {
        let dialect = MarkdownDialect::new(&opts);
        Writer::init(dialect, out, opts.bom, opts.url_filter)
    }
}

impl<W: Write> HtmlWriter<W> {
    /// Writer emitting an HTML document to `out`.
    ///
    /// # Errors
    ///
    /// Fails when the sink rejects the document envelope.
    pub fn new(out: W, opts: HtmlOptions) -> Result<Self, Error> {
        let dialect = HtmlDialect::new(&opts);
        Writer::init(dialect, out, opts.bom, opts.url_filter)
    }
}

impl<D, W> Writer<D, W>
where
    D: InlineFormat + BlockFormat<W>,
    W: Write,
{
    fn init(dialect: D, out: W, bom: bool, url_filter: Option<UrlFilter>) -> Result<Self, Error> {
        let mut w = Self {
            dialect,
            blocks: BlockState::new(out),
            inline: InlineState::default(),
            url_filter,
            closed: false,
        };
        if bom {
            w.blocks.write_all("\u{FEFF}")?;
        }
        w.blocks.sect_level_in();
        w.dialect.open_document(&mut w.blocks)?;
        Ok(w)
    }

    /// Current block mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.blocks.current_mode()
    }

    fn do_print(&mut self, a: &Inline<'_>) -> (String, Option<Error>) {
        let mut buf = String::new();
        if !self.blocks.enabled() {
            // conversion side effects are skipped entirely while suppressed
            return (buf, None);
        }
        let mut p = Printer {
            buf: &mut buf,
            fmt: &self.dialect,
            state: &mut self.inline,
            url_filter: self.url_filter.as_ref(),
        };
        let err = p.print(a).err();
        (buf, err)
    }

    fn do_printf(&mut self, template: &str, args: &[Inline<'_>]) -> (String, Option<Error>) {
        let mut buf = String::new();
        if !self.blocks.enabled() {
            return (buf, None);
        }
        let mut p = Printer {
            buf: &mut buf,
            fmt: &self.dialect,
            state: &mut self.inline,
            url_filter: self.url_filter.as_ref(),
        };
        let err = p.printf(template, args).err();
        (buf, err)
    }

    fn convert_cells(&mut self, cells: &[Inline<'_>]) -> (Vec<String>, Option<Error>) {
        let mut first_err = None;
        let mut row = Vec::with_capacity(cells.len());
        for c in cells {
            let (s, e) = self.do_print(c);
            if let Some(e) = e {
                first_err.get_or_insert(e);
            }
            row.push(s);
        }
        (row, first_err)
    }

    /// Paragraph from an inline value.
    ///
    /// # Errors
    ///
    /// Returns conversion or I/O errors; the paragraph is still emitted with
    /// an `#ERR` marker at the failed position.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn para<'v>(&mut self, a: impl Into<Inline<'v>>) -> Result<(), Error> {
        self.do_para(&a.into())
    }

    fn do_para(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        let (s, err) = self.do_print(a);
        self.dialect.para(&mut self.blocks, &s)?;
        err.map_or(Ok(()), Err)
    }

    /// Paragraph from a template with `{}` placeholders.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error, or an I/O error.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn paraf(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        let (s, err) = self.do_printf(template, args);
        self.dialect.para(&mut self.blocks, &s)?;
        err.map_or(Ok(()), Err)
    }

    fn put_heading(&mut self, attrs: Option<&Attrs>, s: &str) -> Result<(), Error> {
        // the counter advances even while output is suppressed, keeping
        // numbering continuous when output is re-enabled
        self.blocks.bump_sect_counter();
        let counters = self.blocks.sect_counters().to_vec();
        self.dialect.heading(&mut self.blocks, &counters, attrs, s)?;
        Ok(())
    }

    fn do_section(&mut self, attrs: Option<&Attrs>, a: &Inline<'_>) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        let (s, err) = self.do_print(a);
        self.put_heading(attrs, &s)?;
        err.map_or(Ok(()), Err)
    }

    fn do_begin_section(&mut self, attrs: Option<&Attrs>, a: &Inline<'_>) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        let (s, err) = self.do_print(a);
        self.put_heading(attrs, &s)?;
        self.blocks.sect_level_in();
        err.map_or(Ok(()), Err)
    }

    /// Heading at the current nesting depth, without entering a subsection.
    ///
    /// # Errors
    ///
    /// Returns conversion or I/O errors.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn section<'v>(&mut self, a: impl Into<Inline<'v>>) -> Result<(), Error> {
        self.do_section(None, &a.into())
    }

    /// [`section`](Self::section) from a template with `{}` placeholders.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error, or an I/O error.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn sectionf(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        let (s, err) = self.do_printf(template, args);
        self.put_heading(None, &s)?;
        err.map_or(Ok(()), Err)
    }

    /// Heading with attributes, without entering a subsection.
    ///
    /// # Errors
    ///
    /// Returns conversion or I/O errors.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn attr_section<'v>(&mut self, attrs: &Attrs, a: impl Into<Inline<'v>>) -> Result<(), Error> {
        self.do_section(Some(attrs), &a.into())
    }

    /// [`attr_section`](Self::attr_section) from a template with `{}`
    /// placeholders.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error, or an I/O error.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn attr_sectionf(
        &mut self,
        attrs: &Attrs,
        template: &str,
        args: &[Inline<'_>],
    ) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        let (s, err) = self.do_printf(template, args);
        self.put_heading(Some(attrs), &s)?;
        err.map_or(Ok(()), Err)
    }

    /// Heading followed by a nested section scope. Every `begin_section`
    /// must be paired with [`end_section`](Self::end_section).
    ///
    /// # Errors
    ///
    /// Returns conversion or I/O errors.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn begin_section<'v>(&mut self, a: impl Into<Inline<'v>>) -> Result<(), Error> {
        self.do_begin_section(None, &a.into())
    }

    /// [`begin_section`](Self::begin_section) from a template with `{}`
    /// placeholders.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error, or an I/O error.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn begin_sectionf(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        let (s, err) = self.do_printf(template, args);
        self.put_heading(None, &s)?;
        self.blocks.sect_level_in();
        err.map_or(Ok(()), Err)
    }

    /// Heading with attributes, followed by a nested section scope.
    ///
    /// # Errors
    ///
    /// Returns conversion or I/O errors.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn begin_attr_section<'v>(
        &mut self,
        attrs: &Attrs,
        a: impl Into<Inline<'v>>,
    ) -> Result<(), Error> {
        self.do_begin_section(Some(attrs), &a.into())
    }

    /// [`begin_attr_section`](Self::begin_attr_section) from a template with
    /// `{}` placeholders.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error, or an I/O error.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn begin_attr_sectionf(
        &mut self,
        attrs: &Attrs,
        template: &str,
        args: &[Inline<'_>],
    ) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        let (s, err) = self.do_printf(template, args);
        self.put_heading(Some(attrs), &s)?;
        self.blocks.sect_level_in();
        err.map_or(Ok(()), Err)
    }

    /// Leave the current section scope.
    ///
    /// # Errors
    ///
    /// None currently; the signature matches the other operations.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode and on an unpaired call at the top level.
    pub fn end_section(&mut self) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        self.blocks.sect_level_out();
        Ok(())
    }

    /// Paragraph that titles the list expected to follow. Unlike
    /// [`para`](Self::para), the list attaches tightly in dialects where
    /// that matters.
    ///
    /// # Errors
    ///
    /// Returns conversion or I/O errors.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn list_title<'v>(&mut self, a: impl Into<Inline<'v>>) -> Result<(), Error> {
        self.do_list_title(&a.into())
    }

    fn do_list_title(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        let (s, err) = self.do_print(a);
        self.dialect.list_title(&mut self.blocks, &s)?;
        err.map_or(Ok(()), Err)
    }

    /// [`list_title`](Self::list_title) from a template with `{}`
    /// placeholders.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error, or an I/O error.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn list_titlef(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        let (s, err) = self.do_printf(template, args);
        self.dialect.list_title(&mut self.blocks, &s)?;
        err.map_or(Ok(()), Err)
    }

    /// Enter a list scope. Legal in flow mode and, for nested lists, in
    /// list mode. Must be paired with [`end_list`](Self::end_list).
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the dialect.
    ///
    /// # Panics
    ///
    /// Panics in table mode.
    pub fn begin_list(&mut self, kind: ListKind) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW | MLIST) {
            return Ok(());
        }
        let from_broad = self.blocks.list_levels().last().is_some_and(|l| l.broad);
        self.blocks
            .list_level_in(if kind.is_ordered() { 0 } else { -1 }, kind.is_broad());
        let levels = self.blocks.list_levels().to_vec();
        self.dialect
            .list_level_start(&mut self.blocks, &levels, from_broad)?;
        Ok(())
    }

    /// Leave the current list scope.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the dialect.
    ///
    /// # Panics
    ///
    /// Panics outside list mode.
    pub fn end_list(&mut self) -> Result<(), Error> {
        if !self.blocks.check_mode(MLIST) {
            return Ok(());
        }
        let levels = self.blocks.list_levels().to_vec();
        let to_broad = levels.len() >= 2 && levels[levels.len() - 2].broad;
        self.dialect
            .list_level_done(&mut self.blocks, &levels, to_broad)?;
        self.blocks.list_level_out();
        Ok(())
    }

    /// Single-paragraph list item.
    ///
    /// # Errors
    ///
    /// Returns conversion or I/O errors.
    ///
    /// # Panics
    ///
    /// Panics outside list mode.
    pub fn list_item<'v>(&mut self, a: impl Into<Inline<'v>>) -> Result<(), Error> {
        let a = a.into();
        self.do_list_item(slice::from_ref(&a))
    }

    /// List item spanning several paragraphs. Meant for broad lists; in a
    /// tight list the continuation paragraphs still render but break the
    /// tight spacing.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error, or an I/O error.
    ///
    /// # Panics
    ///
    /// Panics outside list mode.
    pub fn list_item_paras(&mut self, paras: &[Inline<'_>]) -> Result<(), Error> {
        self.do_list_item(paras)
    }

    /// List item from a template with `{}` placeholders.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error, or an I/O error.
    ///
    /// # Panics
    ///
    /// Panics outside list mode.
    pub fn list_itemf(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        if !self.blocks.check_mode(MLIST) {
            return Ok(());
        }
        self.blocks.bump_list_counter();
        let (s, err) = self.do_printf(template, args);
        let levels = self.blocks.list_levels().to_vec();
        self.dialect
            .list_item(&mut self.blocks, &levels, slice::from_ref(&s))?;
        err.map_or(Ok(()), Err)
    }

    fn do_list_item(&mut self, paras: &[Inline<'_>]) -> Result<(), Error> {
        if !self.blocks.check_mode(MLIST) {
            return Ok(());
        }
        // item numbering advances on every path, suppressed or not
        self.blocks.bump_list_counter();
        let (rendered, err) = self.convert_cells(paras);
        let levels = self.blocks.list_levels().to_vec();
        self.dialect
            .list_item(&mut self.blocks, &levels, &rendered)?;
        err.map_or(Ok(()), Err)
    }

    /// List scope around a closure.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or I/O errors from the scope itself.
    ///
    /// # Panics
    ///
    /// Panics in table mode.
    pub fn list<F>(&mut self, kind: ListKind, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.begin_list(kind)?;
        f(self)?;
        self.end_list()
    }

    /// Enter a table scope with the given header cells. Must be paired with
    /// [`end_table`](Self::end_table); nothing renders until then.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn begin_table(&mut self, headers: &[Inline<'_>]) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        // the header row is accumulated even while suppressed (with empty
        // cells) so the table scope stays balanced
        let (row, err) = self.convert_cells(headers);
        self.blocks.table.push_row(row);
        err.map_or(Ok(()), Err)
    }

    /// Data row for the open table.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error.
    ///
    /// # Panics
    ///
    /// Panics outside table mode.
    pub fn table_row(&mut self, cells: &[Inline<'_>]) -> Result<(), Error> {
        if !self.blocks.check_mode(MTABLE) {
            return Ok(());
        }
        if !self.blocks.enabled() {
            return Ok(());
        }
        let (row, err) = self.convert_cells(cells);
        self.blocks.table.push_row(row);
        err.map_or(Ok(()), Err)
    }

    /// Render the accumulated table and leave the table scope. A table
    /// without data rows renders nothing.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the dialect.
    ///
    /// # Panics
    ///
    /// Panics outside table mode.
    pub fn end_table(&mut self) -> Result<(), Error> {
        if !self.blocks.check_mode(MTABLE) {
            return Ok(());
        }
        let grid = self.blocks.take_table();
        self.dialect.end_table(&mut self.blocks, &grid)?;
        Ok(())
    }

    /// Table scope around a closure.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or errors from the scope itself.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn table<F>(&mut self, headers: &[Inline<'_>], f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.begin_table(headers)?;
        f(self)?;
        self.end_table()
    }

    /// Verbatim code block with an optional language tag.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the dialect.
    ///
    /// # Panics
    ///
    /// Panics outside flow mode.
    pub fn codeblock(&mut self, lang: &str, text: &str) -> Result<(), Error> {
        if !self.blocks.check_mode(MFLOW) {
            return Ok(());
        }
        self.dialect.codeblock(&mut self.blocks, lang, text)?;
        Ok(())
    }

    /// Suppress output until the matching [`enable_output`](Self::enable_output).
    /// Calls nest; structure bookkeeping (mode checks, counters, scopes)
    /// continues while suppressed.
    pub fn disable_output(&mut self) {
        self.blocks.push_disabled();
    }

    /// Undo one [`disable_output`](Self::disable_output).
    pub fn enable_output(&mut self) {
        self.blocks.pop_disabled();
    }

    /// [`close`](Self::close), with a chance to write closing paragraphs
    /// first. The callback receives a paragraph-only view of the writer; the
    /// document is closed afterwards even when the callback fails.
    ///
    /// # Errors
    ///
    /// The callback's error takes precedence, then the errors of
    /// [`close`](Self::close).
    ///
    /// # Panics
    ///
    /// The callback's paragraph operations panic outside flow mode.
    pub fn close_with<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut ParagraphScope<'_, D, W>) -> Result<(), Error>,
    {
        if self.closed {
            return Err(Error::AlreadyClosed);
        }
        let para_err = f(&mut ParagraphScope { writer: self }).err();
        let closed = self.close();
        para_err.map_or(closed, Err)
    }

    /// Finish the document: verify every scope is balanced, write the
    /// dialect postamble, flush the final separator.
    ///
    /// Further operations on the writer are silently ignored.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyClosed`] on a repeated call; otherwise the first
    /// unbalanced-scope error found, after the teardown has run.
    pub fn close(&mut self) -> Result<(), Error> {
        if self.closed {
            return Err(Error::AlreadyClosed);
        }
        self.closed = true;

        let mut first_err = None;
        if self.inline.pending_link.is_some() {
            first_err.get_or_insert(Error::UnclosedLink);
        }
        if !self.inline.style_stack.is_empty() {
            first_err.get_or_insert(Error::UnclosedStyle);
        }
        if !self.blocks.table.is_empty() {
            first_err.get_or_insert(Error::UnclosedTable);
        }
        if !self.blocks.list_levels().is_empty() {
            first_err.get_or_insert(Error::UnclosedList);
        }
        if self.blocks.sect_depth() > 1 {
            first_err.get_or_insert(Error::UnclosedSection);
        }
        self.inline.pending_link = None;
        self.inline.style_stack.clear();

        self.dialect.close_document(&mut self.blocks)?;
        self.blocks.close()?;
        first_err.map_or(Ok(()), Err)
    }
}

/// Paragraph-only view of a [`Writer`], handed to
/// [`close_with`](Writer::close_with) callbacks.
pub struct ParagraphScope<'w, D, W: Write> {
    writer: &'w mut Writer<D, W>,
}

impl<D, W> ParagraphScope<'_, D, W>
where
    D: InlineFormat + BlockFormat<W>,
    W: Write,
{
    /// Paragraph from an inline value.
    ///
    /// # Errors
    ///
    /// Returns conversion or I/O errors.
    pub fn para<'v>(&mut self, a: impl Into<Inline<'v>>) -> Result<(), Error> {
        self.writer.para(a)
    }

    /// Paragraph from a template with `{}` placeholders.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error, or an I/O error.
    pub fn paraf(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        self.writer.paraf(template, args)
    }
}

/// Object-safe writer surface.
///
/// [`Writer`] is generic over its dialect; this trait erases that so
/// writers for different dialects can be driven through one code path, most
/// usefully through [`MultiWriter`]. Inline values are taken by reference
/// so one value can feed several writers.
pub trait DocWriter {
    /// Paragraph from an inline value.
    fn para(&mut self, a: &Inline<'_>) -> Result<(), Error>;
    /// Paragraph from a template with `{}` placeholders.
    fn paraf(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error>;
    /// Heading at the current nesting depth.
    fn section(&mut self, a: &Inline<'_>) -> Result<(), Error>;
    /// Heading with attributes.
    fn attr_section(&mut self, attrs: &Attrs, a: &Inline<'_>) -> Result<(), Error>;
    /// Heading with attributes, from a template with `{}` placeholders.
    fn attr_sectionf(
        &mut self,
        attrs: &Attrs,
        template: &str,
        args: &[Inline<'_>],
    ) -> Result<(), Error>;
    /// Heading followed by a nested section scope.
    fn begin_section(&mut self, a: &Inline<'_>) -> Result<(), Error>;
    /// Heading with attributes, followed by a nested section scope.
    fn begin_attr_section(&mut self, attrs: &Attrs, a: &Inline<'_>) -> Result<(), Error>;
    /// Heading with attributes from a template, followed by a nested section
    /// scope.
    fn begin_attr_sectionf(
        &mut self,
        attrs: &Attrs,
        template: &str,
        args: &[Inline<'_>],
    ) -> Result<(), Error>;
    /// Leave the current section scope.
    fn end_section(&mut self) -> Result<(), Error>;
    /// Paragraph that titles the list expected to follow.
    fn list_title(&mut self, a: &Inline<'_>) -> Result<(), Error>;
    /// List title from a template with `{}` placeholders.
    fn list_titlef(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error>;
    /// Enter a list scope.
    fn begin_list(&mut self, kind: ListKind) -> Result<(), Error>;
    /// Single-paragraph list item.
    fn list_item(&mut self, a: &Inline<'_>) -> Result<(), Error>;
    /// List item spanning several paragraphs.
    fn list_item_paras(&mut self, paras: &[Inline<'_>]) -> Result<(), Error>;
    /// Leave the current list scope.
    fn end_list(&mut self) -> Result<(), Error>;
    /// Enter a table scope with the given header cells.
    fn begin_table(&mut self, headers: &[Inline<'_>]) -> Result<(), Error>;
    /// Data row for the open table.
    fn table_row(&mut self, cells: &[Inline<'_>]) -> Result<(), Error>;
    /// Render the accumulated table and leave the table scope.
    fn end_table(&mut self) -> Result<(), Error>;
    /// Verbatim code block with an optional language tag.
    fn codeblock(&mut self, lang: &str, text: &str) -> Result<(), Error>;
    /// Suppress output until the matching `enable_output`.
    fn disable_output(&mut self);
    /// Undo one `disable_output`.
    fn enable_output(&mut self);
    /// Finish the document.
    fn close(&mut self) -> Result<(), Error>;
}

impl<D, W> DocWriter for Writer<D, W>
where
    D: InlineFormat + BlockFormat<W>,
    W: Write,
{
    fn para(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        self.do_para(a)
    }

    fn paraf(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        Self::paraf(self, template, args)
    }

    fn section(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        self.do_section(None, a)
    }

    fn attr_section(&mut self, attrs: &Attrs, a: &Inline<'_>) -> Result<(), Error> {
        self.do_section(Some(attrs), a)
    }

    fn attr_sectionf(
        &mut self,
        attrs: &Attrs,
        template: &str,
        args: &[Inline<'_>],
    ) -> Result<(), Error> {
        Self::attr_sectionf(self, attrs, template, args)
    }

    fn begin_section(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        self.do_begin_section(None, a)
    }

    fn begin_attr_section(&mut self, attrs: &Attrs, a: &Inline<'_>) -> Result<(), Error> {
        self.do_begin_section(Some(attrs), a)
    }

    fn begin_attr_sectionf(
        &mut self,
        attrs: &Attrs,
        template: &str,
        args: &[Inline<'_>],
    ) -> Result<(), Error> {
        Self::begin_attr_sectionf(self, attrs, template, args)
    }

    fn end_section(&mut self) -> Result<(), Error> {
        Self::end_section(self)
    }

    fn list_title(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        self.do_list_title(a)
    }

    fn list_titlef(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        Self::list_titlef(self, template, args)
    }

    fn begin_list(&mut self, kind: ListKind) -> Result<(), Error> {
        Self::begin_list(self, kind)
    }

    fn list_item(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        self.do_list_item(slice::from_ref(a))
    }

    fn list_item_paras(&mut self, paras: &[Inline<'_>]) -> Result<(), Error> {
        self.do_list_item(paras)
    }

    fn end_list(&mut self) -> Result<(), Error> {
        Self::end_list(self)
    }

    fn begin_table(&mut self, headers: &[Inline<'_>]) -> Result<(), Error> {
        Self::begin_table(self, headers)
    }

    fn table_row(&mut self, cells: &[Inline<'_>]) -> Result<(), Error> {
        Self::table_row(self, cells)
    }

    fn end_table(&mut self) -> Result<(), Error> {
        Self::end_table(self)
    }

    fn codeblock(&mut self, lang: &str, text: &str) -> Result<(), Error> {
        Self::codeblock(self, lang, text)
    }

    fn disable_output(&mut self) {
        Self::disable_output(self);
    }

    fn enable_output(&mut self) {
        Self::enable_output(self);
    }

    fn close(&mut self) -> Result<(), Error> {
        Self::close(self)
    }
}

/// Fans every operation out to several writers, in order.
///
/// Each operation runs on every target even after one fails; the first
/// error is reported. There is no atomicity across targets.
pub struct MultiWriter<'a> {
    targets: Vec<&'a mut dyn DocWriter>,
}

impl<'a> MultiWriter<'a> {
    /// Writer fanning out to `targets`.
    #[must_use]
    pub fn new(targets: Vec<&'a mut dyn DocWriter>) -> Self {
        Self { targets }
    }

    fn each(
        &mut self,
        mut f: impl FnMut(&mut dyn DocWriter) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let mut first_err = None;
        for t in &mut self.targets {
            if let Err(e) = f(&mut **t) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl DocWriter for MultiWriter<'_> {
    fn para(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        self.each(|w| w.para(a))
    }

    fn paraf(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        self.each(|w| w.paraf(template, args))
    }

    fn section(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        self.each(|w| w.section(a))
    }

    fn attr_section(&mut self, attrs: &Attrs, a: &Inline<'_>) -> Result<(), Error> {
        self.each(|w| w.attr_section(attrs, a))
    }

    fn attr_sectionf(
        &mut self,
        attrs: &Attrs,
        template: &str,
        args: &[Inline<'_>],
    ) -> Result<(), Error> {
        self.each(|w| w.attr_sectionf(attrs, template, args))
    }

    fn begin_section(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        self.each(|w| w.begin_section(a))
    }

    fn begin_attr_section(&mut self, attrs: &Attrs, a: &Inline<'_>) -> Result<(), Error> {
        self.each(|w| w.begin_attr_section(attrs, a))
    }

    fn begin_attr_sectionf(
        &mut self,
        attrs: &Attrs,
        template: &str,
        args: &[Inline<'_>],
    ) -> Result<(), Error> {
        self.each(|w| w.begin_attr_sectionf(attrs, template, args))
    }

    fn end_section(&mut self) -> Result<(), Error> {
        self.each(|w| w.end_section())
    }

    fn list_title(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        self.each(|w| w.list_title(a))
    }

    fn list_titlef(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        self.each(|w| w.list_titlef(template, args))
    }

    fn begin_list(&mut self, kind: ListKind) -> Result<(), Error> {
        self.each(|w| w.begin_list(kind))
    }

    fn list_item(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        self.each(|w| w.list_item(a))
    }

    fn list_item_paras(&mut self, paras: &[Inline<'_>]) -> Result<(), Error> {
        self.each(|w| w.list_item_paras(paras))
    }

    fn end_list(&mut self) -> Result<(), Error> {
        self.each(|w| w.end_list())
    }

    fn begin_table(&mut self, headers: &[Inline<'_>]) -> Result<(), Error> {
        self.each(|w| w.begin_table(headers))
    }

    fn table_row(&mut self, cells: &[Inline<'_>]) -> Result<(), Error> {
        self.each(|w| w.table_row(cells))
    }

    fn end_table(&mut self) -> Result<(), Error> {
        self.each(|w| w.end_table())
    }

    fn codeblock(&mut self, lang: &str, text: &str) -> Result<(), Error> {
        self.each(|w| w.codeblock(lang, text))
    }

    fn disable_output(&mut self) {
        for t in &mut self.targets {
            t.disable_output();
        }
    }

    fn enable_output(&mut self) {
        for t in &mut self.targets {
            t.enable_output();
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        self.each(|w| w.close())
    }
}

/// Writer that accepts everything and emits nothing. Useful as a
/// placeholder target.
#[derive(Default)]
pub struct NullWriter;

impl NullWriter {
    /// A fresh null writer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocWriter for NullWriter {
    fn para(&mut self, _a: &Inline<'_>) -> Result<(), Error> {
        Ok(())
    }

    fn paraf(&mut self, _template: &str, _args: &[Inline<'_>]) -> Result<(), Error> {
        Ok(())
    }

    fn section(&mut self, _a: &Inline<'_>) -> Result<(), Error> {
        Ok(())
    }

    fn attr_section(&mut self, _attrs: &Attrs, _a: &Inline<'_>) -> Result<(), Error> {
        Ok(())
    }

    fn attr_sectionf(
        &mut self,
        _attrs: &Attrs,
        _template: &str,
        _args: &[Inline<'_>],
    ) -> Result<(), Error> {
        Ok(())
    }

    fn begin_section(&mut self, _a: &Inline<'_>) -> Result<(), Error> {
        Ok(())
    }

    fn begin_attr_section(&mut self, _attrs: &Attrs, _a: &Inline<'_>) -> Result<(), Error> {
        Ok(())
    }

    fn begin_attr_sectionf(
        &mut self,
        _attrs: &Attrs,
        _template: &str,
        _args: &[Inline<'_>],
    ) -> Result<(), Error> {
        Ok(())
    }

    fn end_section(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn list_title(&mut self, _a: &Inline<'_>) -> Result<(), Error> {
        Ok(())
    }

    fn list_titlef(&mut self, _template: &str, _args: &[Inline<'_>]) -> Result<(), Error> {
        Ok(())
    }

    fn begin_list(&mut self, _kind: ListKind) -> Result<(), Error> {
        Ok(())
    }

    fn list_item(&mut self, _a: &Inline<'_>) -> Result<(), Error> {
        Ok(())
    }

    fn list_item_paras(&mut self, _paras: &[Inline<'_>]) -> Result<(), Error> {
        Ok(())
    }

    fn end_list(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn begin_table(&mut self, _headers: &[Inline<'_>]) -> Result<(), Error> {
        Ok(())
    }

    fn table_row(&mut self, _cells: &[Inline<'_>]) -> Result<(), Error> {
        Ok(())
    }

    fn end_table(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn codeblock(&mut self, _lang: &str, _text: &str) -> Result<(), Error> {
        Ok(())
    }

    fn disable_output(&mut self) {}

    fn enable_output(&mut self) {}

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::value::{code, strong};

    #[test]
    fn test_text_document() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(
            &mut out,
            TextOptions {
                numbered_sections: true,
                underlined_sections: true,
                ..TextOptions::default()
            },
        )
        .unwrap();
        w.begin_section("INTRO").unwrap();
        w.para("First paragraph.").unwrap();
        w.list_title("Things:").unwrap();
        w.list(ListKind::UNORDERED, |w| {
            w.list_item("alpha")?;
            w.list_item("beta")
        })
        .unwrap();
        w.end_section().unwrap();
        w.begin_section("DATA").unwrap();
        w.begin_table(&["id".into(), "name".into()]).unwrap();
        w.table_row(&[1.into(), "one".into()]).unwrap();
        w.table_row(&[2.into(), "two".into()]).unwrap();
        w.end_table().unwrap();
        w.end_section().unwrap();
        w.close().unwrap();
        drop(w);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1. INTRO\n\
             ========\n\
             \n\
             First paragraph.\n\
             \n\
             Things:\n\
             * alpha\n\
             * beta\n\
             \n\
             2. DATA\n\
             =======\n\
             \n\
             id name\n\
             -- ----\n\
             1  one\n\
             2  two\n\
             \n"
        );
    }

    #[test]
    fn test_markdown_document() {
        let mut out = Vec::new();
        let mut w = MarkdownWriter::new(&mut out, MarkdownOptions::default()).unwrap();
        w.begin_section("Guide").unwrap();
        w.paraf("Version {} of {}.", &[2.into(), strong("it")])
            .unwrap();
        w.begin_attr_section(&Attrs::id("setup"), "Setup").unwrap();
        w.begin_list(ListKind::ORDERED | ListKind::BROAD).unwrap();
        w.list_item("install").unwrap();
        w.list_item_paras(&["configure".into(), "then run".into()])
            .unwrap();
        w.end_list().unwrap();
        w.codeblock("sh", "make run").unwrap();
        w.end_section().unwrap();
        w.end_section().unwrap();
        w.close().unwrap();
        drop(w);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# Guide\n\
             \n\
             Version 2 of <strong>it</strong>\\.\n\
             \n\
             ## Setup {#setup}\n\
             \n\
             1. install\n\
             \n\
             2. configure\n\
             \n\
             \x20  then run\n\
             \n\
             ```sh\nmake run\n```\n\
             \n"
        );
    }

    #[test]
    fn test_html_document() {
        let mut out = Vec::new();
        let mut w = HtmlWriter::new(
            &mut out,
            HtmlOptions {
                title: String::from("T"),
                ..HtmlOptions::default()
            },
        )
        .unwrap();
        w.begin_section("Top").unwrap();
        w.para("Hello <world>.").unwrap();
        w.begin_list(ListKind::UNORDERED).unwrap();
        w.list_item("a").unwrap();
        w.begin_list(ListKind::ORDERED).unwrap();
        w.list_item("b").unwrap();
        w.end_list().unwrap();
        w.list_item("c").unwrap();
        w.end_list().unwrap();
        w.end_section().unwrap();
        w.close().unwrap();
        drop(w);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<html>\n\
             <head>\n\
             \x20 <title>T</title>\n\
             </head>\n\
             <body>\n\
             <h1>Top</h1>\n\
             \n\
             <p>Hello &lt;world&gt;.</p>\n\
             \n\
             <ul>\n\
             \x20 <li>a</li>\n\
             \x20 <ol>\n\
             \x20   <li>b</li>\n\
             \x20 </ol>\n\
             \x20 <li>c</li>\n\
             </ul>\n\
             \n\
             </body>\n\
             </html>\n"
        );
    }

    #[test]
    fn test_suppressed_items_keep_numbering() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        w.begin_list(ListKind::ORDERED).unwrap();
        w.list_item("one").unwrap();
        w.disable_output();
        w.list_item("two").unwrap();
        w.enable_output();
        w.list_item("three").unwrap();
        w.end_list().unwrap();
        w.close().unwrap();
        drop(w);

        assert_eq!(String::from_utf8(out).unwrap(), "1. one\n3. three\n\n");
    }

    #[test]
    fn test_bom() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(
            &mut out,
            TextOptions {
                bom: true,
                ..TextOptions::default()
            },
        )
        .unwrap();
        w.para("x").unwrap();
        w.close().unwrap();
        drop(w);
        assert_eq!(String::from_utf8(out).unwrap(), "\u{FEFF}x\n\n");
    }

    #[test]
    fn test_header_only_table_renders_nothing() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        w.para("before").unwrap();
        w.table(&["h1".into(), "h2".into()], |_| Ok(())).unwrap();
        w.para("after").unwrap();
        w.close().unwrap();
        drop(w);
        assert_eq!(String::from_utf8(out).unwrap(), "before\n\nafter\n\n");
    }

    #[test]
    fn test_table_scope_helper() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        w.table(&["k".into(), "v".into()], |w| {
            w.table_row(&["a".into(), 1.into()])
        })
        .unwrap();
        w.close().unwrap();
        drop(w);
        assert_eq!(String::from_utf8(out).unwrap(), "k v\n- -\na 1\n\n");
    }

    #[test]
    fn test_close_reports_unclosed_list() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        w.begin_list(ListKind::UNORDERED).unwrap();
        assert!(matches!(w.close(), Err(Error::UnclosedList)));
        assert!(matches!(w.close(), Err(Error::AlreadyClosed)));
    }

    #[test]
    fn test_close_reports_unclosed_section() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        w.begin_section("s").unwrap();
        assert!(matches!(w.close(), Err(Error::UnclosedSection)));
    }

    #[test]
    fn test_close_with_appends_final_paragraphs() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        w.para("body").unwrap();
        w.close_with(|p| p.para("closing note")).unwrap();
        assert!(matches!(w.close(), Err(Error::AlreadyClosed)));
        drop(w);
        assert_eq!(String::from_utf8(out).unwrap(), "body\n\nclosing note\n\n");
    }

    #[test]
    fn test_attr_sectionf_formats_heading() {
        let mut out = Vec::new();
        let mut w = MarkdownWriter::new(&mut out, MarkdownOptions::default()).unwrap();
        w.attr_sectionf(&Attrs::id("setup"), "Setup {}", &[code("cfg")])
            .unwrap();
        w.close().unwrap();
        drop(w);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# Setup `cfg` {#setup}\n\n"
        );
    }

    #[test]
    fn test_begin_attr_sectionf_opens_scope() {
        let mut out = Vec::new();
        let mut w = MarkdownWriter::new(&mut out, MarkdownOptions::default()).unwrap();
        w.begin_attr_sectionf(&Attrs::id("p1"), "Part {}", &[1.into()])
            .unwrap();
        w.para("x").unwrap();
        w.end_section().unwrap();
        w.close().unwrap();
        drop(w);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# Part 1 {#p1}\n\nx\n\n"
        );
    }

    #[test]
    fn test_list_titlef_formats_title() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        w.list_titlef("Options for {}:", &["app".into()]).unwrap();
        w.begin_list(ListKind::UNORDERED).unwrap();
        w.list_item("x").unwrap();
        w.end_list().unwrap();
        w.close().unwrap();
        drop(w);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Options for app:\n* x\n\n"
        );
    }

    #[test]
    fn test_operations_after_close_are_ignored() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        w.para("x").unwrap();
        w.close().unwrap();
        w.para("ignored").unwrap();
        drop(w);
        assert_eq!(String::from_utf8(out).unwrap(), "x\n\n");
    }

    #[test]
    #[should_panic(expected = "not allowed in Table mode")]
    fn test_paragraph_inside_table_panics() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        w.begin_table(&["h".into()]).unwrap();
        let _ = w.para("x");
    }

    #[test]
    #[should_panic(expected = "not allowed in List mode")]
    fn test_table_inside_list_panics() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        w.begin_list(ListKind::UNORDERED).unwrap();
        let _ = w.begin_table(&["h".into()]);
    }

    #[test]
    fn test_mode_queries() {
        let mut out = Vec::new();
        let mut w = TextWriter::new(&mut out, TextOptions::default()).unwrap();
        assert_eq!(w.mode(), Mode::Flow);
        w.begin_list(ListKind::UNORDERED).unwrap();
        assert_eq!(w.mode(), Mode::List);
        w.end_list().unwrap();
        w.close().unwrap();
        assert_eq!(w.mode(), Mode::Closed);
    }

    #[test]
    fn test_multi_writer_fans_out() {
        let mut t_out = Vec::new();
        let mut m_out = Vec::new();
        let mut tw = TextWriter::new(&mut t_out, TextOptions::default()).unwrap();
        let mut mw = MarkdownWriter::new(&mut m_out, MarkdownOptions::default()).unwrap();
        {
            let mut multi =
                MultiWriter::new(vec![&mut tw as &mut dyn DocWriter, &mut mw]);
            multi.begin_section(&Inline::from("Doc")).unwrap();
            multi.para(&Inline::from("a+b")).unwrap();
            multi.begin_list(ListKind::UNORDERED).unwrap();
            multi.list_item(&Inline::from("x")).unwrap();
            multi.end_list().unwrap();
            multi.begin_table(&["h".into()]).unwrap();
            multi.table_row(&["c".into()]).unwrap();
            multi.end_table().unwrap();
            multi.end_section().unwrap();
            multi.close().unwrap();
        }
        drop(tw);
        drop(mw);
        assert_eq!(
            String::from_utf8(t_out).unwrap(),
            "Doc\n\na+b\n\n* x\n\nh\n-\nc\n\n"
        );
        assert_eq!(
            String::from_utf8(m_out).unwrap(),
            "# Doc\n\na\\+b\n\n- x\n\nh\n-\nc\n\n"
        );
    }

    #[test]
    fn test_null_writer_accepts_everything() {
        let mut w = NullWriter::new();
        w.begin_section(&Inline::from("s")).unwrap();
        w.para(&Inline::from("p")).unwrap();
        w.end_section().unwrap();
        w.close().unwrap();
    }
}
