use thiserror::Error;

/// Errors raised while reading or writing markup documents.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The markup reader rejected the input.
    #[error("markup syntax error at byte {position}: {message}")]
    Syntax {
        /// Byte offset reported by the reader.
        position: u64,
        /// Reader error message.
        message: String,
    },

    /// Start and end tags do not pair up.
    #[error("unbalanced markup: {0}")]
    Unbalanced(String),

    /// The document has a second top-level element.
    #[error("document has more than one root element: <{0}>")]
    MultipleRoots(String),

    /// The document contains no element at all.
    #[error("document has no root element")]
    EmptyDocument,

    /// Converting between text and in-memory form failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}
