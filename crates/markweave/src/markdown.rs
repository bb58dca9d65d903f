//! Markdown backend.
//!
//! Escaping backslash-escapes the syntactically significant punctuation set
//! and rewrites literal newlines to `\n`. Strong/emphasis spans use
//! `<strong>`/`<em>` tags: the native `**`/`*` markers are not reliably
//! distinguishable from surrounding text without full Markdown-grammar
//! awareness.

use std::io::{self, Write};

use crate::backend::{BlockFormat, BlockState, InlineFormat, ListLevel, Quotes};
use crate::printer::UrlFilter;
use crate::table::{TableDecor, TableGrid, print_row, print_rule};
use crate::value::{Attrs, Style};

/// Characters that receive a backslash escape.
const BACKSLASH_ESCAPED: &str = "\\`*_{}[]()#+-.!<>";

/// Options for the Markdown writer.
#[derive(Default)]
pub struct MarkdownOptions {
    /// Prepend a byte-order mark.
    pub bom: bool,
    /// Quotation marks for quoted style spans.
    pub quotation_marks: Quotes,
    /// Rewrites every link target before emission.
    pub url_filter: Option<UrlFilter>,
}

/// Markdown dialect.
pub struct MarkdownDialect {
    quotes: Quotes,
}

impl MarkdownDialect {
    /// Dialect configured from the given options.
    #[must_use]
    pub fn new(opts: &MarkdownOptions) -> Self {
        Self {
            quotes: opts.quotation_marks,
        }
    }
}

pub(crate) fn md_escape(buf: &mut String, s: &str) {
    for c in s.chars() {
        if c == '\n' {
            buf.push_str("\\n");
        } else if BACKSLASH_ESCAPED.contains(c) {
            buf.push('\\');
            buf.push(c);
        } else {
            buf.push(c);
        }
    }
}

impl InlineFormat for MarkdownDialect {
    fn escape(&self, buf: &mut String, s: &str) {
        md_escape(buf, s);
    }

    fn code_str(&self, buf: &mut String, s: &str) {
        // a backtick in the content breaks a single-backtick fence; fall
        // back to an HTML code tag (content that also contains a literal
        // `</code>` is a known limitation)
        if s.contains('`') {
            buf.push_str("<code>");
            buf.push_str(s);
            buf.push_str("</code>");
        } else {
            buf.push('`');
            buf.push_str(s);
            buf.push('`');
        }
    }

    fn code_raw(&self, buf: &mut String, s: &str) {
        buf.push('`');
        buf.push_str(s);
        buf.push('`');
    }

    fn begin_styled(&self, buf: &mut String, style: Style) {
        match style {
            Style::SingleQuoted | Style::DoubleQuoted => buf.push(self.quotes.open(style)),
            Style::Strong => buf.push_str("<strong>"),
            Style::Emphasized => buf.push_str("<em>"),
        }
    }

    fn end_styled(&self, buf: &mut String, style: Style) {
        match style {
            Style::SingleQuoted | Style::DoubleQuoted => buf.push(self.quotes.close(style)),
            Style::Strong => buf.push_str("</strong>"),
            Style::Emphasized => buf.push_str("</em>"),
        }
    }

    fn begin_link(&self, buf: &mut String, _url: &str) {
        buf.push('[');
    }

    fn end_link(&self, buf: &mut String, url: &str) {
        buf.push_str("](");
        buf.push_str(url);
        buf.push(')');
    }

    fn simple_link(&self, buf: &mut String, caption: &str, url: &str) {
        if caption.is_empty() || caption == url {
            buf.push('[');
            buf.push_str(url);
            buf.push(']');
        } else {
            buf.push('[');
            buf.push_str(caption);
            buf.push_str("](");
            buf.push_str(url);
            buf.push(')');
        }
    }
}

fn heading_attr_suffix(aa: &Attrs) -> String {
    let mut segments = Vec::new();
    if !aa.identifier.is_empty() {
        segments.push(format!("#{}", aa.identifier));
    }
    for c in &aa.classes {
        segments.push(format!(".{c}"));
    }
    for (k, v) in &aa.key_vals {
        segments.push(format!("{k}={v}"));
    }
    if segments.is_empty() {
        String::new()
    } else {
        format!(" {{{}}}", segments.join(" "))
    }
}

impl<W: Write> BlockFormat<W> for MarkdownDialect {
    fn para(&self, st: &mut BlockState<W>, s: &str) -> io::Result<()> {
        st.put_block(s)?;
        st.want_emptyln();
        Ok(())
    }

    fn heading(
        &self,
        st: &mut BlockState<W>,
        counters: &[i64],
        attrs: Option<&Attrs>,
        s: &str,
    ) -> io::Result<()> {
        if st.enabled() {
            let mut line = "#".repeat(counters.len());
            line.push(' ');
            line.push_str(s);
            if let Some(aa) = attrs {
                line.push_str(&heading_attr_suffix(aa));
            }
            st.put_block(&line)?;
        }
        st.want_emptyln();
        Ok(())
    }

    fn list_title(&self, st: &mut BlockState<W>, s: &str) -> io::Result<()> {
        st.put_block(s)?;
        st.want_emptyln();
        Ok(())
    }

    fn list_level_start(
        &self,
        st: &mut BlockState<W>,
        _levels: &[ListLevel],
        from_broad: bool,
    ) -> io::Result<()> {
        if from_broad {
            st.want_emptyln();
        }
        Ok(())
    }

    fn list_level_done(
        &self,
        st: &mut BlockState<W>,
        levels: &[ListLevel],
        to_broad: bool,
    ) -> io::Result<()> {
        if levels.len() == 1 || to_broad {
            st.want_emptyln();
        } else {
            st.want_nextln();
        }
        Ok(())
    }

    fn list_item(
        &self,
        st: &mut BlockState<W>,
        levels: &[ListLevel],
        paragraphs: &[String],
    ) -> io::Result<()> {
        let level = levels.last().copied().unwrap_or(ListLevel {
            counter: -1,
            broad: false,
        });
        let indent = levels.len() - 1;
        if st.enabled() {
            let marker = if level.is_ordered() {
                format!("{}. ", level.counter)
            } else {
                String::from("- ")
            };
            let first = paragraphs.first().map_or("", String::as_str);
            st.put_block_ex(indent, &marker, first, "")?;
            if paragraphs.len() > 1 {
                let cont_indent = " ".repeat(marker.len());
                for p in &paragraphs[1..] {
                    st.want_emptyln();
                    st.put_block_ex(indent, &cont_indent, p, "")?;
                }
            }
        }
        if level.broad {
            st.want_emptyln();
        } else {
            st.want_nextln();
        }
        Ok(())
    }

    fn end_table(&self, st: &mut BlockState<W>, grid: &TableGrid) -> io::Result<()> {
        if st.enabled() && grid.has_data() {
            // columns are sized from the header row only
            let mut widths = Vec::new();
            let _ = TableGrid::measure_cells(grid.header(), &mut widths);
            let cell_decor = TableDecor {
                left: "",
                sep: " | ",
                right: "",
            };
            let rule_decor = TableDecor {
                left: "",
                sep: "-|-",
                right: "",
            };
            st.flush_separators()?;
            print_row(st.sink(), grid.header(), cell_decor, &widths)?;
            st.write_all("\n")?;
            print_rule(st.sink(), "-", rule_decor, &widths)?;
            for row in grid.data_rows() {
                st.write_all("\n")?;
                print_row(st.sink(), row, cell_decor, &[])?;
            }
        }
        st.want_emptyln();
        Ok(())
    }

    fn codeblock(&self, st: &mut BlockState<W>, lang: &str, text: &str) -> io::Result<()> {
        st.want_emptyln();
        if st.enabled() {
            st.flush_separators()?;
            st.write_all("```")?;
            st.write_all(lang)?;
            st.write_all("\n")?;
            st.write_all(text)?;
            st.write_all("\n```")?;
        }
        st.want_emptyln();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_md_escape() {
        let cases: &[(&str, &str)] = &[
            ("", ""),
            ("abc", "abc"),
            ("\\n", "\\\\n"),
            ("{}", "\\{\\}"),
            ("a+b", "a\\+b"),
            ("<a>", "\\<a\\>"),
            ("## head", "\\#\\# head"),
            ("line\nbreak", "line\\nbreak"),
        ];
        for (arg, want) in cases {
            let mut b = String::new();
            md_escape(&mut b, arg);
            assert_eq!(&b, want, "escaping {arg:?}");
        }
    }

    #[test]
    fn test_code_span_backtick_fallback() {
        let d = MarkdownDialect::new(&MarkdownOptions::default());
        let mut b = String::new();
        d.code_str(&mut b, "plain");
        assert_eq!(b, "`plain`");
        let mut b = String::new();
        d.code_str(&mut b, "a`b");
        assert_eq!(b, "<code>a`b</code>");
    }

    #[test]
    fn test_heading_attrs() {
        let d = MarkdownDialect::new(&MarkdownOptions::default());
        let mut st = BlockState::new(Vec::new());
        st.sect_level_in();
        let aa = Attrs::id("ident").with_class("cls").with_key_val("k", "v");
        BlockFormat::heading(&d, &mut st, &[1, 1], Some(&aa), "Subsection").unwrap();
        let out = String::from_utf8(st.into_sink()).unwrap();
        assert_eq!(out, "## Subsection {#ident .cls k=v}");
    }

    #[test]
    fn test_table_sized_from_header() {
        let d = MarkdownDialect::new(&MarkdownOptions::default());
        let mut st = BlockState::new(Vec::new());
        st.sect_level_in();
        st.table.push_row(vec!["th".into(), "thead".into()]);
        st.table.push_row(vec!["tcell".into(), "tcell".into()]);
        let grid = st.take_table();
        BlockFormat::end_table(&d, &mut st, &grid).unwrap();
        let out = String::from_utf8(st.into_sink()).unwrap();
        assert_eq!(out, "th | thead\n---|------\ntcell | tcell");
    }
}
