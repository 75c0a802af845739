use thiserror::Error;

use crate::range::Range;

#[derive(Error, Debug, PartialEq, Clone)]
pub enum LexerError {
    #[error("Unexpected character {0:?}")]
    UnexpectedCharacter(char, Range),
    #[error("Unterminated C string")]
    UnterminatedString(Range),
    #[error("Invalid escape sequence `{0}`")]
    InvalidEscape(String, Range),
}

impl LexerError {
    #[cold]
    pub fn range(&self) -> Range {
        match self {
            LexerError::UnexpectedCharacter(_, range) => *range,
            LexerError::UnterminatedString(range) => *range,
            LexerError::InvalidEscape(_, range) => *range,
        }
    }
}
