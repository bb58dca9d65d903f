//! Inline printer: converts [`Inline`] values into dialect-correct inline
//! text inside an in-flight buffer.
//!
//! The printer is handed to callbacks and custom marshalers, giving them the
//! full inline surface: raw and escaped text, code spans, nested style
//! spans, and link spans. Structural misuse (nesting links, closing a style
//! that is not open) panics; an unconvertible value embeds a visible `#ERR`
//! marker and reports [`Error::Unsupported`] without aborting the document.

use crate::backend::{InlineFormat, InlineState};
use crate::error::Error;
use crate::value::{Inline, Style};

/// Marker embedded in the output where a value could not be converted.
pub const CONVERSION_ERR_MARKER: &str = "#ERR";

/// Rewrites link targets before emission.
pub type UrlFilter = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Inline printer over a dialect's inline formatter.
///
/// Obtained through callback values ([`with`](crate::with)) and
/// [`MarshalInline`](crate::MarshalInline) implementations; never
/// constructed directly by callers.
pub struct Printer<'a> {
    pub(crate) buf: &'a mut String,
    pub(crate) fmt: &'a dyn InlineFormat,
    pub(crate) state: &'a mut InlineState,
    pub(crate) url_filter: Option<&'a UrlFilter>,
}

impl Printer<'_> {
    /// Sub-printer targeting a scratch buffer, sharing state and dialect.
    fn sub<'b>(&'b mut self, buf: &'b mut String) -> Printer<'b> {
        Printer {
            buf,
            fmt: self.fmt,
            state: &mut *self.state,
            url_filter: self.url_filter,
        }
    }

    fn filter_url(&self, url: &str) -> String {
        match self.url_filter {
            Some(f) => f(url),
            None => url.to_owned(),
        }
    }

    /// Write text with dialect escaping.
    pub fn write_str(&mut self, s: &str) {
        self.fmt.escape(self.buf, s);
    }

    /// Write pre-escaped content verbatim.
    pub fn write_raw(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    /// Write a code span with escaped content.
    pub fn code_str(&mut self, s: &str) {
        self.fmt.code_str(self.buf, s);
    }

    /// Write a code span with verbatim content.
    pub fn code_raw(&mut self, s: &str) {
        self.fmt.code_raw(self.buf, s);
    }

    /// Open a link span. At most one link may be open at a time; nesting is
    /// a usage error and panics.
    pub fn begin_link(&mut self, url: &str) {
        assert!(
            self.state.pending_link.is_none(),
            "markweave: begin_link inside an open link span"
        );
        let url = self.filter_url(url);
        self.fmt.begin_link(self.buf, &url);
        self.state.pending_link = Some(url);
    }

    /// Close the open link span. Panics when no link is open.
    pub fn end_link(&mut self) {
        let url = self
            .state
            .pending_link
            .take()
            .expect("markweave: end_link without begin_link");
        self.fmt.end_link(self.buf, &url);
    }

    /// Open a styled span. Spans close strictly LIFO.
    pub fn begin_styled(&mut self, style: Style) {
        self.state.style_stack.push(style);
        self.fmt.begin_styled(self.buf, style);
    }

    /// Close the innermost styled span. Panics when none is open.
    pub fn end_styled(&mut self) {
        let style = self
            .state
            .style_stack
            .pop()
            .expect("markweave: end_styled without begin_styled");
        self.fmt.end_styled(self.buf, style);
    }

    /// Styled span around a converted value.
    pub fn styled(&mut self, style: Style, a: &Inline<'_>) -> Result<(), Error> {
        self.begin_styled(style);
        let r = self.print(a);
        self.end_styled();
        r
    }

    /// One-shot link with a converted caption. The caption collapses to the
    /// URL when empty or identical to it.
    pub fn simple_link(&mut self, caption: Option<&Inline<'_>>, url: &str) -> Result<(), Error> {
        assert!(
            self.state.pending_link.is_none(),
            "markweave: simple_link inside an open link span"
        );
        let url = self.filter_url(url);
        let mut scratch = String::new();
        let r = match caption {
            Some(c) => self.sub(&mut scratch).print(c),
            None => Ok(()),
        };
        self.fmt.simple_link(self.buf, &scratch, &url);
        r
    }

    /// Convert a value into inline content, resolving the capability set in
    /// priority order.
    ///
    /// On conversion failure the `#ERR` marker is written at the current
    /// position and the error is returned; the buffer remains usable.
    pub fn print(&mut self, a: &Inline<'_>) -> Result<(), Error> {
        match a {
            Inline::Empty => Ok(()),
            Inline::Raw(s) => {
                self.write_raw(s);
                Ok(())
            }
            Inline::Text(s) => {
                self.write_str(s);
                Ok(())
            }
            Inline::Code(s) => {
                self.code_str(s);
                Ok(())
            }
            Inline::CodeRaw(s) => {
                self.code_raw(s);
                Ok(())
            }
            Inline::Link { caption, url } => self.simple_link(caption.as_deref(), url),
            Inline::Styled(style, inner) => self.styled(*style, inner),
            Inline::With(f) => match f(&mut *self) {
                Ok(()) => Ok(()),
                Err(e) => {
                    self.write_str(CONVERSION_ERR_MARKER);
                    Err(e)
                }
            },
            Inline::Marshal(m) => match m.marshal_inline(&mut *self) {
                Ok(()) => Ok(()),
                Err(e) => {
                    self.write_str(CONVERSION_ERR_MARKER);
                    Err(e)
                }
            },
            Inline::Unsupported(type_name) => {
                self.write_str(CONVERSION_ERR_MARKER);
                Err(Error::Unsupported {
                    type_name: *type_name,
                })
            }
        }
    }

    /// Substitute `{}` placeholders in `template` with converted arguments.
    ///
    /// Literal template segments pass through dialect escaping; `{{` and
    /// `}}` produce literal braces. Placeholders beyond the argument list
    /// are written as literal `{}`. The first conversion error is returned
    /// after the whole template has been processed.
    pub fn printf(&mut self, template: &str, args: &[Inline<'_>]) -> Result<(), Error> {
        let mut first_err = None;
        let mut arg_iter = args.iter();
        let mut lit = String::new();
        let mut rest = template;

        while let Some(i) = rest.find(['{', '}']) {
            lit.push_str(&rest[..i]);
            let tail = &rest[i..];
            if tail.starts_with("{}") {
                self.write_str(&lit);
                lit.clear();
                match arg_iter.next() {
                    Some(a) => {
                        if let Err(e) = self.print(a) {
                            first_err.get_or_insert(e);
                        }
                    }
                    None => self.write_str("{}"),
                }
                rest = &tail[2..];
            } else if tail.starts_with("{{") {
                lit.push('{');
                rest = &tail[2..];
            } else if tail.starts_with("}}") {
                lit.push('}');
                rest = &tail[2..];
            } else {
                // lone brace, kept literal
                lit.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
        lit.push_str(rest);
        if !lit.is_empty() {
            self.write_str(&lit);
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backend::TYPOGRAPHIC_QUOTES;
    use crate::html::HtmlDialect;
    use crate::markdown::MarkdownDialect;
    use crate::text::TextDialect;
    use crate::value::{Inline, MarshalInline, link, url};
    use crate::{HtmlOptions, MarkdownOptions, TextOptions};

    struct MyStruct;

    impl MarshalInline for MyStruct {
        fn marshal_inline(&self, p: &mut Printer<'_>) -> Result<(), Error> {
            p.begin_styled(Style::SingleQuoted);
            p.write_str("q");
            p.code_str("c[]<&>");
            p.end_styled();
            p.begin_link("url");
            p.write_str("a");
            p.end_link();
            p.code_str("c`d");
            Ok(())
        }
    }

    fn render(fmt: &dyn InlineFormat, a: &Inline<'_>) -> (String, Option<Error>) {
        let mut buf = String::new();
        let mut state = InlineState::default();
        let mut p = Printer {
            buf: &mut buf,
            fmt,
            state: &mut state,
            url_filter: None,
        };
        let err = p.print(a).err();
        (buf, err)
    }

    #[test]
    fn test_conversion_matrix() {
        let html = HtmlDialect::new(&HtmlOptions {
            quotation_marks: TYPOGRAPHIC_QUOTES,
            ..HtmlOptions::default()
        });
        let md = MarkdownDialect::new(&MarkdownOptions {
            quotation_marks: TYPOGRAPHIC_QUOTES,
            ..MarkdownOptions::default()
        });
        let txt = TextDialect::new(&TextOptions {
            quotation_marks: TYPOGRAPHIC_QUOTES,
            ..TextOptions::default()
        });

        let ms = MyStruct;
        let cases: Vec<(&str, Inline<'_>, &str, &str, &str)> = vec![
            ("empty string", Inline::from(""), "", "", ""),
            ("simple string", Inline::from("abc"), "abc", "abc", "abc"),
            (
                "string with specials",
                Inline::from("<a>"),
                "&lt;a&gt;",
                "\\<a\\>",
                "<a>",
            ),
            (
                "string with backslash",
                Inline::from("a\\c"),
                "a\\c",
                "a\\\\c",
                "a\\c",
            ),
            ("int", Inline::from(42), "42", "42", "42"),
            ("bool", Inline::from(true), "true", "true", "true"),
            (
                "floating point",
                Inline::from(3.14159),
                "3.14159",
                "3.14159",
                "3.14159",
            ),
            (
                "raw",
                crate::raw("<>@#$%`@"),
                "<>@#$%`@",
                "<>@#$%`@",
                "<>@#$%`@",
            ),
            (
                "simple-link-full",
                link("c", "url"),
                "<a href=\"url\">c</a>",
                "[c](url)",
                "[c](url)",
            ),
            (
                "simple-link-urls",
                link("url", "url"),
                "<a href=\"url\">url</a>",
                "[url]",
                "url",
            ),
            (
                "simple-link-nocaption",
                url("url"),
                "<a href=\"url\">url</a>",
                "[url]",
                "url",
            ),
            (
                "custom marshaler",
                Inline::marshal(&ms),
                "\u{2018}q<code>c[]&lt;&&gt;</code>\u{2019}<a href=\"url\">a</a><code>c`d</code>",
                "\u{2018}q`c[]<&>`\u{2019}[a](url)<code>c`d</code>",
                "\u{2018}q`c[]<&>`\u{2019}[a](url)`c`d`",
            ),
        ];

        for (name, a, want_html, want_md, want_txt) in cases {
            assert_eq!(render(&html, &a).0, want_html, "html: {name}");
            assert_eq!(render(&md, &a).0, want_md, "markdown: {name}");
            assert_eq!(render(&txt, &a).0, want_txt, "text: {name}");
        }
    }

    #[test]
    fn test_unsupported_writes_marker_and_reports() {
        struct Opaque;
        let txt = TextDialect::new(&TextOptions::default());
        let (out, err) = render(&txt, &Inline::unsupported::<Opaque>());
        assert_eq!(out, "#ERR");
        assert!(matches!(err, Some(Error::Unsupported { .. })));
    }

    #[test]
    fn test_printf_substitution_and_escaping() {
        let md = MarkdownDialect::new(&MarkdownOptions::default());
        let mut buf = String::new();
        let mut state = InlineState::default();
        let mut p = Printer {
            buf: &mut buf,
            fmt: &md,
            state: &mut state,
            url_filter: None,
        };
        p.printf("a+b = {} {{literal}} {}", &[Inline::from(3), Inline::from("<x>")])
            .unwrap();
        assert_eq!(buf, "a\\+b = 3 \\{literal\\} \\<x\\>");
    }

    #[test]
    fn test_printf_missing_argument_is_literal() {
        let txt = TextDialect::new(&TextOptions::default());
        let mut buf = String::new();
        let mut state = InlineState::default();
        let mut p = Printer {
            buf: &mut buf,
            fmt: &txt,
            state: &mut state,
            url_filter: None,
        };
        p.printf("x {} y {}", &[Inline::from(1)]).unwrap();
        assert_eq!(buf, "x 1 y {}");
    }

    #[test]
    fn test_url_filter_applied_to_links() {
        let txt = TextDialect::new(&TextOptions::default());
        let filter: UrlFilter = Box::new(|u: &str| u.rsplit('/').next().unwrap_or(u).to_owned());
        let mut buf = String::new();
        let mut state = InlineState::default();
        let mut p = Printer {
            buf: &mut buf,
            fmt: &txt,
            state: &mut state,
            url_filter: Some(&filter),
        };
        p.print(&link("test", "../../path.txt")).unwrap();
        p.write_str(" ");
        p.print(&url("../../path.txt")).unwrap();
        assert_eq!(buf, "[test](path.txt) path.txt");
    }

    #[test]
    #[should_panic(expected = "begin_link inside an open link span")]
    fn test_nested_link_panics() {
        let txt = TextDialect::new(&TextOptions::default());
        let mut buf = String::new();
        let mut state = InlineState::default();
        let mut p = Printer {
            buf: &mut buf,
            fmt: &txt,
            state: &mut state,
            url_filter: None,
        };
        p.begin_link("a");
        p.begin_link("b");
    }
}
