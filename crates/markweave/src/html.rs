//! HTML fragment backend.
//!
//! Escaping replaces only the two structurally significant angle-bracket
//! characters with entity references; the ampersand is deliberately left
//! alone to preserve the observed behavior of earlier releases, at the cost
//! of fidelity for content containing entity-like sequences.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::backend::{BlockFormat, BlockState, InlineFormat, ListLevel, Quotes};
use crate::printer::UrlFilter;
use crate::table::TableGrid;
use crate::value::{Attrs, Style};

/// Options for the HTML writer.
#[derive(Default)]
pub struct HtmlOptions {
    /// Prepend a byte-order mark.
    pub bom: bool,
    /// Quotation marks for quoted style spans.
    pub quotation_marks: Quotes,
    /// Document title, rendered into `<head>` when non-empty.
    pub title: String,
    /// Inline style-sheet text, rendered into `<head>` when non-empty.
    pub style: String,
    /// CSS class applied to list-title paragraphs.
    pub list_title_class: String,
    /// Rewrites every link target before emission.
    pub url_filter: Option<UrlFilter>,
}

/// HTML dialect.
pub struct HtmlDialect {
    quotes: Quotes,
    title: String,
    style: String,
    list_title_class: String,
}

impl HtmlDialect {
    /// Dialect configured from the given options.
    #[must_use]
    pub fn new(opts: &HtmlOptions) -> Self {
        Self {
            quotes: opts.quotation_marks,
            title: opts.title.clone(),
            style: opts.style.clone(),
            list_title_class: opts.list_title_class.clone(),
        }
    }
}

pub(crate) fn html_escape(buf: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            _ => buf.push(c),
        }
    }
}

impl InlineFormat for HtmlDialect {
    fn escape(&self, buf: &mut String, s: &str) {
        html_escape(buf, s);
    }

    fn code_str(&self, buf: &mut String, s: &str) {
        buf.push_str("<code>");
        html_escape(buf, s);
        buf.push_str("</code>");
    }

    fn code_raw(&self, buf: &mut String, s: &str) {
        buf.push_str("<code>");
        buf.push_str(s);
        buf.push_str("</code>");
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

    fn begin_link(&self, buf: &mut String, url: &str) {
        let _ = write!(buf, "<a href=\"{url}\">");
    }

    fn end_link(&self, buf: &mut String, _url: &str) {
        buf.push_str("</a>");
    }

    fn simple_link(&self, buf: &mut String, caption: &str, url: &str) {
        let _ = write!(buf, "<a href=\"{url}\">");
        if caption.is_empty() {
            buf.push_str(url);
        } else {
            buf.push_str(caption);
        }
        buf.push_str("</a>");
    }
}

fn heading_open_tag(tagname: &str, attrs: Option<&Attrs>) -> String {
    let mut t = format!("<{tagname}");
    if let Some(aa) = attrs {
        if !aa.identifier.is_empty() {
            let _ = write!(t, " id=\"{}\"", aa.identifier);
        }
        if !aa.classes.is_empty() {
            let _ = write!(t, " class=\"{}\"", aa.classes.join(" "));
        }
        for (k, v) in &aa.key_vals {
            let _ = write!(t, " {k}=\"{v}\"");
        }
    }
    t.push('>');
    t
}

impl HtmlDialect {
    fn head<W: Write>(&self, st: &mut BlockState<W>) -> io::Result<()> {
        if self.title.is_empty() && self.style.is_empty() {
            return Ok(());
        }
        st.put_block("<head>")?;
        st.want_nextln();
        if !self.title.is_empty() {
            let mut title = String::new();
            html_escape(&mut title, &self.title);
            st.put_block_ex(1, "<title>", &title, "</title>")?;
            st.want_nextln();
        }
        if !self.style.is_empty() {
            st.put_block_ex(1, "<style>", &self.style, "</style>")?;
            st.want_nextln();
        }
        st.put_block("</head>")?;
        st.want_nextln();
        Ok(())
    }
}

impl<W: Write> BlockFormat<W> for HtmlDialect {
    fn open_document(&self, st: &mut BlockState<W>) -> io::Result<()> {
        st.put_block("<html>")?;
        st.want_nextln();
        self.head(st)?;
        st.put_block("<body>")?;
        st.want_nextln();
        Ok(())
    }

    fn close_document(&self, st: &mut BlockState<W>) -> io::Result<()> {
        st.put_block("</body>")?;
        st.want_nextln();
        st.put_block("</html>")?;
        st.want_nextln();
        Ok(())
    }

    fn para(&self, st: &mut BlockState<W>, s: &str) -> io::Result<()> {
        st.put_block_ex(0, "<p>", s, "</p>")?;
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
        let level = counters.len().min(6);
        let tagname = format!("h{level}");
        let open = heading_open_tag(&tagname, attrs);
        st.put_block_ex(0, &open, s, &format!("</{tagname}>"))?;
        st.want_emptyln();
        Ok(())
    }

    fn list_title(&self, st: &mut BlockState<W>, s: &str) -> io::Result<()> {
        if self.list_title_class.is_empty() {
            st.put_block_ex(0, "<p>", s, "</p>")?;
        } else {
            let open = format!("<p class=\"{}\">", self.list_title_class);
            st.put_block_ex(0, &open, s, "</p>")?;
        }
        st.want_nextln();
        Ok(())
    }

    fn list_level_start(
        &self,
        st: &mut BlockState<W>,
        levels: &[ListLevel],
        _from_broad: bool,
    ) -> io::Result<()> {
        if st.enabled() {
            let n = levels.len() - 1;
            let tag = if levels[n].is_ordered() { "<ol>" } else { "<ul>" };
            st.put_block_ex(n, tag, "", "")?;
        }
        st.want_nextln();
        Ok(())
    }

    fn list_level_done(
        &self,
        st: &mut BlockState<W>,
        levels: &[ListLevel],
        _to_broad: bool,
    ) -> io::Result<()> {
        if st.enabled() {
            let n = levels.len() - 1;
            let tag = if levels[n].is_ordered() { "</ol>" } else { "</ul>" };
            st.put_block_ex(n, tag, "", "")?;
        }
        if levels.len() == 1 {
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
        if st.enabled() {
            let n = levels.len() - 1;
            let broad = levels[n].broad;
            if paragraphs.is_empty() {
                st.put_block_ex(n + 1, "<li>", "", "</li>")?;
            } else {
                let wrap = broad || paragraphs.len() > 1;
                for (i, p) in paragraphs.iter().enumerate() {
                    let mut before = String::new();
                    let mut after = String::new();
                    if wrap {
                        before.push_str("<p>");
                        after.push_str("</p>");
                    }
                    let mut lvl = n + 1;
                    if i == 0 {
                        before.insert_str(0, "<li>");
                    } else {
                        st.want_nextln();
                        lvl += 1;
                    }
                    if i == paragraphs.len() - 1 {
                        after.push_str("</li>");
                    }
                    st.put_block_ex(lvl, &before, p, &after)?;
                }
            }
        }
        st.want_nextln();
        Ok(())
    }

    fn end_table(&self, st: &mut BlockState<W>, grid: &TableGrid) -> io::Result<()> {
        if st.enabled() && grid.has_data() {
            st.flush_separators()?;
            st.write_all("<table>\n<thead><tr>")?;
            for c in grid.header() {
                st.write_all("<th>")?;
                st.write_all(c)?;
                st.write_all("</th>")?;
            }
            st.write_all("</tr></thead>\n<tbody>")?;
            for row in grid.data_rows() {
                st.write_all("\n<tr>")?;
                for c in row {
                    st.write_all("<td>")?;
                    st.write_all(c)?;
                    st.write_all("</td>")?;
                }
                st.write_all("</tr>")?;
            }
            st.write_all("\n</tbody>\n</table>")?;
        }
        st.want_emptyln();
        Ok(())
    }

    fn codeblock(&self, st: &mut BlockState<W>, lang: &str, text: &str) -> io::Result<()> {
        st.want_emptyln();
        if st.enabled() {
            st.flush_separators()?;
            st.write_all("<pre")?;
            if !lang.is_empty() {
                st.write_all(" lang=\"")?;
                st.write_all(lang)?;
                st.write_all("\"")?;
            }
            st.write_all(">\n")?;
            let mut escaped = String::new();
            html_escape(&mut escaped, text);
            st.write_all(&escaped)?;
            st.write_all("\n</pre>")?;
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
    fn test_escape_angle_brackets_only() {
        let mut b = String::new();
        html_escape(&mut b, "<a> & \"q\"");
        // the ampersand is intentionally not escaped
        assert_eq!(b, "&lt;a&gt; & \"q\"");
    }

    #[test]
    fn test_heading_attrs_sorted() {
        let aa = Attrs::id("ident")
            .with_class("cls")
            .with_key_val("b", "2")
            .with_key_val("a", "1");
        let t = heading_open_tag("h2", Some(&aa));
        assert_eq!(t, "<h2 id=\"ident\" class=\"cls\" a=\"1\" b=\"2\">");
    }

    #[test]
    fn test_codeblock_escapes_content() {
        let d = HtmlDialect::new(&HtmlOptions::default());
        let mut st = BlockState::new(Vec::new());
        st.sect_level_in();
        BlockFormat::codeblock(&d, &mut st, "rust", "if a < b {}").unwrap();
        let out = String::from_utf8(st.into_sink()).unwrap();
        // the block registers a blank separator before flushing
        assert_eq!(out, "\n\n<pre lang=\"rust\">\nif a &lt; b {}\n</pre>");
    }

    #[test]
    fn test_table_structure() {
        let d = HtmlDialect::new(&HtmlOptions::default());
        let mut st = BlockState::new(Vec::new());
        st.sect_level_in();
        st.table.push_row(vec!["h1".into(), "h2".into()]);
        st.table.push_row(vec!["c1".into(), "c2".into()]);
        let grid = st.take_table();
        BlockFormat::end_table(&d, &mut st, &grid).unwrap();
        let out = String::from_utf8(st.into_sink()).unwrap();
        assert_eq!(
            out,
            "<table>\n<thead><tr><th>h1</th><th>h2</th></tr></thead>\n<tbody>\n<tr><td>c1</td><td>c2</td></tr>\n</tbody>\n</table>"
        );
    }
}
