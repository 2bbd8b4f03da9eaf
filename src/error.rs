//! Error taxonomy shared by the CBOR codec, the JSON codec, and the
//! pointer/patch engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// CBOR input ended mid-item.
    #[error("truncated CBOR input at offset {offset}")]
    Truncated { offset: usize },

    /// An indefinite-length string/container held a sub-item of the wrong
    /// major type (e.g. a text chunk inside an indefinite byte string).
    #[error("malformed indefinite-length item at offset {offset}")]
    MalformedIndefinite { offset: usize },

    /// Major type 7 addition byte named an unassigned simple value.
    #[error("unsupported simple value {0}")]
    UnsupportedSimple(u8),

    /// JSON lexer saw a character that is not valid in its current state.
    #[error("unexpected character {found:?} at line {line}, column {column}")]
    UnexpectedChar { found: char, line: usize, column: usize },

    /// JSON lexer expected one of `true`/`false`/`null`/`inf`/`nan` but the
    /// input diverged partway through.
    #[error("expected literal {expected:?} at line {line}, column {column}")]
    CharacterSequence { expected: &'static str, line: usize, column: usize },

    /// A `\uXXXX` escape contained a non-hex digit.
    #[error("invalid hex digit in \\u escape at line {line}, column {column}")]
    HexValue { line: usize, column: usize },

    /// A UTF-16 surrogate pair was malformed (lone high/low surrogate).
    #[error("malformed UTF-16 surrogate pair at line {line}, column {column}")]
    Utf16 { line: usize, column: usize },

    /// A bare CR or LF occurred inside a JSON string literal.
    #[error("unescaped line break inside string at line {line}, column {column}")]
    StringBreakline { line: usize, column: usize },

    /// A JSON string literal was never terminated.
    #[error("unterminated string starting at line {line}, column {column}")]
    StringInfinity { line: usize, column: usize },

    /// A `\uXXXX` escape decoded to a scalar value with no valid codepoint.
    #[error("invalid unicode codepoint at line {line}, column {column}")]
    StringCodepoint { line: usize, column: usize },

    /// Number grammar matched but the numeric conversion itself failed.
    #[error("could not convert number {text:?} at line {line}, column {column}")]
    ConvertNumber { text: String, line: usize, column: usize },

    /// The serializer was asked to emit a CBOR-only value as JSON.
    #[error("{0} has no JSON representation")]
    UnsupportedType(&'static str),

    /// An operation violated a tree-mutation precondition: inserting an
    /// owned value, removing from a non-container, indexing through a
    /// non-container, or similar programmer error. Debug builds additionally
    /// `debug_assert!` at the call site; this variant is what release
    /// builds return instead of panicking.
    #[error("precondition violated: {0}")]
    PreconditionViolated(&'static str),

    /// Recursive descent (CBOR tag/container nesting, JSON object/array
    /// nesting) exceeded the configured depth limit.
    #[error("nesting depth exceeded limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
