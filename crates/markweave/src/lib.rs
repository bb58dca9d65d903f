//! Structured document emitter with pluggable output dialects.
//!
//! This crate provides a mode-checked [`Writer`] that builds a document
//! through explicit operations (paragraphs, nested sections, lists, tables,
//! code blocks) and renders it through an output dialect.
//!
//! # Architecture
//!
//! Dialects implement two capability traits instead of inheriting from each
//! other:
//! - [`InlineFormat`]: escaping, code spans, style spans, link spans
//! - [`BlockFormat`]: paragraphs, headings, list and table layout
//!
//! Three dialects ship with the crate: [`TextWriter`] (plain text with
//! optional numbered and underlined headings), [`MarkdownWriter`], and
//! [`HtmlWriter`] (a complete HTML document). The writer derives its current
//! [`Mode`] from the nesting stacks, so calling an operation in the wrong
//! place is caught immediately: a wrong-mode call panics, while recoverable
//! conditions come back as [`Error`].
//!
//! Inline content arrives as [`Inline`] values, built implicitly through
//! `From` conversions or through the helpers ([`link`], [`strong`],
//! [`code`], [`with`], ...).
//!
//! # Example
//!
//! ```
//! use markweave::{ListKind, MarkdownOptions, MarkdownWriter, link};
//!
//! let mut out = Vec::new();
//! let mut w = MarkdownWriter::new(&mut out, MarkdownOptions::default())?;
//! w.begin_section("Report")?;
//! w.paraf("See {}.", &[link("the docs", "https://example.com")])?;
//! w.list(ListKind::UNORDERED, |w| {
//!     w.list_item("first")?;
//!     w.list_item("second")
//! })?;
//! w.end_section()?;
//! w.close()?;
//! # Ok::<(), markweave::Error>(())
//! ```

mod backend;
mod error;
mod html;
mod markdown;
mod printer;
mod table;
mod text;
mod value;
mod writer;

pub use backend::{
    ASCII_QUOTES, BlockFormat, BlockState, InlineFormat, ListLevel, Mode, Quotes,
    TYPOGRAPHIC_QUOTES,
};
pub use error::Error;
pub use html::{HtmlDialect, HtmlOptions};
pub use markdown::{MarkdownDialect, MarkdownOptions};
pub use printer::{CONVERSION_ERR_MARKER, Printer, UrlFilter};
pub use table::{TableDecor, TableGrid, print_row, print_rule};
pub use text::{TextDialect, TextOptions};
pub use value::{
    Attrs, Callback, Inline, MarshalInline, Style, code, code_raw, double_quoted, emphasized,
    link, raw, single_quoted, strong, styled, url, with,
};
pub use writer::{
    DocWriter, HtmlWriter, ListKind, MarkdownWriter, MultiWriter, NullWriter, ParagraphScope,
    TextWriter, Writer,
};
