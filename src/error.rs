/// Error type for the tally crate
///
/// Every variant is a final answer for its input: evaluating the same text
/// again fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input was rejected before it reached the lexer
    #[error("ValidationError: {0}")]
    ValidationError(String),
    /// Unrecognized character or identifier in the input
    #[error("LexError: {0}")]
    LexError(String),
    /// Malformed expression syntax
    #[error("ParseError: {0}")]
    ParseError(String),
    /// Mathematical domain violation while evaluating
    #[error("EvalError: {0}")]
    EvalError(String),
}

impl Error {
    /// Stable lowercase name of the error category, as reported to clients
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match *self {
            Self::ValidationError(_) => "validation",
            Self::LexError(_) => "lex",
            Self::ParseError(_) => "parse",
            Self::EvalError(_) => "eval",
        }
    }

    /// The message without its category prefix
    #[must_use]
    pub fn message(&self) -> &str {
        match *self {
            Self::ValidationError(ref message)
            | Self::LexError(ref message)
            | Self::ParseError(ref message)
            | Self::EvalError(ref message) => message,
        }
    }
}
