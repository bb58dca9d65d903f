//! Plain text backend.
//!
//! Escaping is a no-op: this dialect favors human readability over literal
//! round-trip fidelity, so style markers are emitted as-is without collision
//! detection against the content.

use std::io::{self, Write};

use markweave_width::str_width;

use crate::backend::{BlockFormat, BlockState, InlineFormat, ListLevel, Quotes};
use crate::printer::UrlFilter;
use crate::table::{TableDecor, TableGrid, print_row, print_rule};
use crate::value::{Attrs, Style};

/// Options for the plain text writer.
pub struct TextOptions {
    /// Prepend a byte-order mark.
    pub bom: bool,
    /// Quotation marks for quoted style spans.
    pub quotation_marks: Quotes,
    /// Content inserted before each unordered list item (defaults to `* `).
    pub list_item_prefix: String,
    /// Underline level-1/2 headings with `=`/`-` rules.
    pub underlined_sections: bool,
    /// Prefix headings with a dotted numeric path (`1.2. `).
    pub numbered_sections: bool,
    /// Rewrites every link target before emission.
    pub url_filter: Option<UrlFilter>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            bom: false,
            quotation_marks: Quotes::default(),
            list_item_prefix: String::from("* "),
            underlined_sections: false,
            numbered_sections: false,
            url_filter: None,
        }
    }
}

/// Plain text dialect.
pub struct TextDialect {
    quotes: Quotes,
    list_item_prefix: String,
    underlined_sections: bool,
    numbered_sections: bool,
}

impl TextDialect {
    /// Dialect configured from the given options.
    #[must_use]
    pub fn new(opts: &TextOptions) -> Self {
        Self {
            quotes: opts.quotation_marks,
            list_item_prefix: if opts.list_item_prefix.is_empty() {
                String::from("* ")
            } else {
                opts.list_item_prefix.clone()
            },
            underlined_sections: opts.underlined_sections,
            numbered_sections: opts.numbered_sections,
        }
    }
}

impl InlineFormat for TextDialect {
    fn escape(&self, buf: &mut String, s: &str) {
        buf.push_str(s);
    }

    fn code_str(&self, buf: &mut String, s: &str) {
        buf.push('`');
        buf.push_str(s);
        buf.push('`');
    }

    fn code_raw(&self, buf: &mut String, s: &str) {
        self.code_str(buf, s);
    }

    fn begin_styled(&self, buf: &mut String, style: Style) {
        match style {
            Style::SingleQuoted | Style::DoubleQuoted => buf.push(self.quotes.open(style)),
            Style::Strong => buf.push_str("**"),
            Style::Emphasized => buf.push('*'),
        }
    }

    fn end_styled(&self, buf: &mut String, style: Style) {
        match style {
            Style::SingleQuoted | Style::DoubleQuoted => buf.push(self.quotes.close(style)),
            Style::Strong => buf.push_str("**"),
            Style::Emphasized => buf.push('*'),
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
            buf.push_str(url);
        } else {
            buf.push('[');
            buf.push_str(caption);
            buf.push_str("](");
            buf.push_str(url);
            buf.push(')');
        }
    }
}

impl<W: Write> BlockFormat<W> for TextDialect {
    fn para(&self, st: &mut BlockState<W>, s: &str) -> io::Result<()> {
        st.put_block(s)?;
        st.want_emptyln();
        Ok(())
    }

    fn heading(
        &self,
        st: &mut BlockState<W>,
        counters: &[i64],
        _attrs: Option<&Attrs>,
        s: &str,
    ) -> io::Result<()> {
        if st.enabled() {
            let level = counters.len();
            let underlined = self.underlined_sections && level <= 2;
            if self.numbered_sections || underlined {
                let mut line = String::new();
                if self.numbered_sections {
                    for c in counters {
                        line.push_str(&c.to_string());
                        line.push('.');
                    }
                    line.push(' ');
                }
                line.push_str(s);
                st.put_block(&line)?;
                if underlined {
                    let width = str_width(&line);
                    st.write_all("\n")?;
                    st.write_repeat(width, if level == 1 { "=" } else { "-" })?;
                }
            } else {
                st.put_block(s)?;
            }
        }
        st.want_emptyln();
        Ok(())
    }

    fn list_title(&self, st: &mut BlockState<W>, s: &str) -> io::Result<()> {
        st.put_block(s)?;
        st.want_nextln();
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
            st.force_nextln();
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
            let prefix = if level.is_ordered() {
                format!("{}. ", level.counter)
            } else {
                self.list_item_prefix.clone()
            };
            let first = paragraphs.first().map_or("", String::as_str);
            st.put_block_ex(indent, &prefix, first, "")?;
            if paragraphs.len() > 1 {
                let cont_indent = " ".repeat(str_width(&prefix));
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
            let widths = grid.column_widths();
            let decor = TableDecor {
                left: "",
                sep: " ",
                right: "",
            };
            st.flush_separators()?;
            print_row(st.sink(), grid.header(), decor, &widths)?;
            st.write_all("\n")?;
            print_rule(st.sink(), "-", decor, &widths)?;
            for row in grid.data_rows() {
                st.write_all("\n")?;
                print_row(st.sink(), row, decor, &widths)?;
            }
        }
        st.want_emptyln();
        Ok(())
    }

    fn codeblock(&self, st: &mut BlockState<W>, _lang: &str, text: &str) -> io::Result<()> {
        st.want_emptyln();
        if st.enabled() {
            st.flush_separators()?;
            st.write_all(text)?;
        }
        st.want_emptyln();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn buf_escape(d: &TextDialect, s: &str) -> String {
        let mut b = String::new();
        d.escape(&mut b, s);
        b
    }

    #[test]
    fn test_escape_is_identity() {
        let d = TextDialect::new(&TextOptions::default());
        assert_eq!(buf_escape(&d, "<a> & `b` *c*"), "<a> & `b` *c*");
    }

    #[test]
    fn test_heading_numbered_and_underlined() {
        let d = TextDialect::new(&TextOptions {
            numbered_sections: true,
            underlined_sections: true,
            ..TextOptions::default()
        });
        let mut st = BlockState::new(Vec::new());
        st.sect_level_in();
        BlockFormat::heading(&d, &mut st, &[1], None, "SECTION").unwrap();
        BlockFormat::heading(&d, &mut st, &[1, 2], None, "SUB").unwrap();
        let out = String::from_utf8(st.into_sink()).unwrap();
        assert_eq!(out, "1. SECTION\n==========\n\n1.2. SUB\n--------");
    }

    #[test]
    fn test_heading_underlined_without_numbering() {
        let d = TextDialect::new(&TextOptions {
            underlined_sections: true,
            ..TextOptions::default()
        });
        let mut st = BlockState::new(Vec::new());
        st.sect_level_in();
        BlockFormat::heading(&d, &mut st, &[1], None, "Title").unwrap();
        let out = String::from_utf8(st.into_sink()).unwrap();
        assert_eq!(out, "Title\n=====");
    }

    #[test]
    fn test_underline_uses_display_width() {
        let d = TextDialect::new(&TextOptions {
            underlined_sections: true,
            ..TextOptions::default()
        });
        let mut st = BlockState::new(Vec::new());
        st.sect_level_in();
        BlockFormat::heading(&d, &mut st, &[1], None, "常用").unwrap();
        let out = String::from_utf8(st.into_sink()).unwrap();
        assert_eq!(out, "常用\n====");
    }
}
