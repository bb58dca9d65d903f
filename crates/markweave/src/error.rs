//! Error types for document writing.
//!
//! Only recoverable conditions are represented here. Structural misuse of the
//! writer (calling an operation outside its legal mode, unpaired
//! `end_styled`, nesting links) signals a caller logic defect and panics
//! instead; see the crate-level docs.

/// Error from document writing operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The sink failed to accept bytes.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// A value with no inline conversion was printed. The output contains a
    /// `#ERR` marker at the offending position; the rest of the document is
    /// unaffected.
    #[error("unsupported value type: {type_name}")]
    Unsupported {
        /// Name of the offending type.
        type_name: &'static str,
    },

    /// A style span was still open when the writer was closed.
    #[error("unpaired begin_styled call")]
    UnclosedStyle,

    /// A link span was still open when the writer was closed.
    #[error("unpaired begin_link call")]
    UnclosedLink,

    /// A list was still open when the writer was closed.
    #[error("unpaired begin_list call")]
    UnclosedList,

    /// A section scope was still open when the writer was closed.
    #[error("unpaired begin_section call")]
    UnclosedSection,

    /// A table was still open when the writer was closed.
    #[error("unpaired begin_table call")]
    UnclosedTable,

    /// `close` was called more than once.
    #[error("writer already closed")]
    AlreadyClosed,
}
