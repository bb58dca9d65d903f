//! Inline values and the conversion capability set.
//!
//! [`Inline`] is the closed set of things that can be turned into inline
//! content. The [`Printer`](crate::Printer) resolves it in a fixed priority
//! order: raw content, link/style wrappers, callbacks, custom marshalers,
//! display values, text, primitives. The order is semantically meaningful —
//! a wrapper is unwrapped before its payload is looked at, and a custom
//! marshaler wins over plain stringification.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;
use crate::printer::Printer;

/// Decoration applied to an inline span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Style {
    /// Single quotation marks around the span.
    SingleQuoted,
    /// Double quotation marks around the span.
    DoubleQuoted,
    /// Emphasized (italic) span.
    Emphasized,
    /// Strong (bold) span.
    Strong,
}

/// Identifier, classes, and key-value attributes for a heading.
///
/// Rendered as `{#id .class key=val}` in Markdown and as `id`/`class`/named
/// attributes in HTML. Keys are emitted in sorted order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attrs {
    /// Element identifier (`#id`).
    pub identifier: String,
    /// CSS classes.
    pub classes: Vec<String>,
    /// Additional key-value attributes.
    pub key_vals: BTreeMap<String, String>,
}

impl Attrs {
    /// Attrs with just an identifier.
    #[must_use]
    pub fn id(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Add a class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add a key-value attribute.
    #[must_use]
    pub fn with_key_val(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.key_vals.insert(key.into(), val.into());
        self
    }
}

/// Custom inline marshaling capability.
///
/// Implement this to control exactly how a type renders as inline content.
/// A marshaler takes priority over [`fmt::Display`]-based conversion.
pub trait MarshalInline {
    /// Write this value through the given printer.
    fn marshal_inline(&self, p: &mut Printer<'_>) -> Result<(), Error>;
}

/// Functional inline content builder for more involved formatting.
pub type Callback<'a> = Box<dyn for<'p> Fn(&mut Printer<'p>) -> Result<(), Error> + 'a>;

/// A value convertible to inline content.
///
/// Usually constructed implicitly through `From` conversions or through the
/// helper constructors ([`link`], [`strong`], [`raw`], ...). Primitives
/// convert to pre-formatted raw content since their canonical renderings
/// never require dialect escaping; strings convert to escaped text.
pub enum Inline<'a> {
    /// Nothing.
    Empty,
    /// Pre-escaped content, written verbatim.
    Raw(Cow<'a, str>),
    /// Plain text, escaped by the dialect.
    Text(Cow<'a, str>),
    /// Code span, content escaped by the dialect.
    Code(Cow<'a, str>),
    /// Code span, content written verbatim.
    CodeRaw(Cow<'a, str>),
    /// Link with optional caption. An empty caption (or one identical to the
    /// URL) collapses to the URL itself.
    Link {
        /// Caption content, converted recursively.
        caption: Option<Box<Inline<'a>>>,
        /// Link target, passed through the configured URL filter.
        url: Cow<'a, str>,
    },
    /// Styled span around inner content.
    Styled(Style, Box<Inline<'a>>),
    /// Callback receiving the inline printer.
    With(Callback<'a>),
    /// Value with a custom marshaler.
    Marshal(&'a dyn MarshalInline),
    /// A value with no conversion; renders as a `#ERR` marker and reports
    /// [`Error::Unsupported`].
    Unsupported(&'static str),
}

impl<'a> Inline<'a> {
    /// Inline text from any [`fmt::Display`] value (errors, paths, ...).
    #[must_use]
    pub fn display(v: &impl fmt::Display) -> Inline<'static> {
        Inline::Text(Cow::Owned(v.to_string()))
    }

    /// Inline content from a custom marshaler.
    #[must_use]
    pub fn marshal(v: &'a dyn MarshalInline) -> Self {
        Inline::Marshal(v)
    }

    /// Marker for a type that has no inline conversion.
    #[must_use]
    pub fn unsupported<T>() -> Inline<'static> {
        Inline::Unsupported(std::any::type_name::<T>())
    }
}

/// Pre-escaped content written verbatim into the output.
pub fn raw<'a>(s: impl Into<Cow<'a, str>>) -> Inline<'a> {
    Inline::Raw(s.into())
}

/// Code span with dialect-escaped content.
pub fn code<'a>(s: impl Into<Cow<'a, str>>) -> Inline<'a> {
    Inline::Code(s.into())
}

/// Code span with verbatim content.
pub fn code_raw<'a>(s: impl Into<Cow<'a, str>>) -> Inline<'a> {
    Inline::CodeRaw(s.into())
}

/// Link with a caption.
pub fn link<'a>(caption: impl Into<Inline<'a>>, url: impl Into<Cow<'a, str>>) -> Inline<'a> {
    Inline::Link {
        caption: Some(Box::new(caption.into())),
        url: url.into(),
    }
}

/// Bare link; the URL doubles as the caption.
pub fn url<'a>(url: impl Into<Cow<'a, str>>) -> Inline<'a> {
    Inline::Link {
        caption: None,
        url: url.into(),
    }
}

/// Styled span around inner content.
pub fn styled<'a>(style: Style, a: impl Into<Inline<'a>>) -> Inline<'a> {
    Inline::Styled(style, Box::new(a.into()))
}

/// Single-quoted span.
pub fn single_quoted<'a>(a: impl Into<Inline<'a>>) -> Inline<'a> {
    styled(Style::SingleQuoted, a)
}

/// Double-quoted span.
pub fn double_quoted<'a>(a: impl Into<Inline<'a>>) -> Inline<'a> {
    styled(Style::DoubleQuoted, a)
}

/// Emphasized (italic) span.
pub fn emphasized<'a>(a: impl Into<Inline<'a>>) -> Inline<'a> {
    styled(Style::Emphasized, a)
}

/// Strong (bold) span.
pub fn strong<'a>(a: impl Into<Inline<'a>>) -> Inline<'a> {
    styled(Style::Strong, a)
}

/// Callback-driven inline content.
pub fn with<'a>(f: impl for<'p> Fn(&mut Printer<'p>) -> Result<(), Error> + 'a) -> Inline<'a> {
    Inline::With(Box::new(f))
}

impl<'a> From<&'a str> for Inline<'a> {
    fn from(s: &'a str) -> Self {
        Inline::Text(Cow::Borrowed(s))
    }
}

impl From<String> for Inline<'_> {
    fn from(s: String) -> Self {
        Inline::Text(Cow::Owned(s))
    }
}

impl<'a> From<&'a String> for Inline<'a> {
    fn from(s: &'a String) -> Self {
        Inline::Text(Cow::Borrowed(s))
    }
}

impl<'a> From<Cow<'a, str>> for Inline<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Inline::Text(s)
    }
}

impl From<char> for Inline<'_> {
    fn from(c: char) -> Self {
        Inline::Text(Cow::Owned(c.to_string()))
    }
}

impl<'a> From<&'a [u8]> for Inline<'a> {
    fn from(b: &'a [u8]) -> Self {
        Inline::Text(String::from_utf8_lossy(b))
    }
}

impl From<bool> for Inline<'_> {
    fn from(v: bool) -> Self {
        // `true`/`false` tokens never require escaping
        Inline::Raw(Cow::Borrowed(if v { "true" } else { "false" }))
    }
}

macro_rules! inline_from_number {
    ($($t:ty),*) => {$(
        impl From<$t> for Inline<'_> {
            fn from(v: $t) -> Self {
                // canonical digit renderings never require escaping
                Inline::Raw(Cow::Owned(v.to_string()))
            }
        }
    )*};
}

inline_from_number!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_conversions_are_raw() {
        assert!(matches!(Inline::from(42_i32), Inline::Raw(s) if s == "42"));
        assert!(matches!(Inline::from(true), Inline::Raw(s) if s == "true"));
        assert!(matches!(Inline::from(3.14_f64), Inline::Raw(s) if s == "3.14"));
        assert!(matches!(Inline::from(3.14159_f64), Inline::Raw(s) if s == "3.14159"));
    }

    #[test]
    fn test_string_conversions_are_text() {
        assert!(matches!(Inline::from("<a>"), Inline::Text(s) if s == "<a>"));
        assert!(matches!(Inline::from(String::from("x")), Inline::Text(s) if s == "x"));
    }

    #[test]
    fn test_attrs_builder() {
        let aa = Attrs::id("ident").with_class("cls").with_key_val("k", "v");
        assert_eq!(aa.identifier, "ident");
        assert_eq!(aa.classes, vec!["cls"]);
        assert_eq!(aa.key_vals.get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_unsupported_carries_type_name() {
        struct Opaque;
        let v = Inline::unsupported::<Opaque>();
        assert!(matches!(v, Inline::Unsupported(name) if name.contains("Opaque")));
    }
}
