use thiserror::Error;

use crate::lexer::token::{Expected, Token};

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ParseError {
    #[error("Expected {expected} but got `{found}`")]
    UnexpectedToken { expected: Expected, found: Token },
}

impl ParseError {
    #[cold]
    pub fn token(&self) -> &Token {
        match self {
            ParseError::UnexpectedToken { found, .. } => found,
        }
    }

    #[cold]
    pub fn expected(&self) -> Expected {
        match self {
            ParseError::UnexpectedToken { expected, .. } => *expected,
        }
    }
}
