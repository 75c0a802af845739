use miette::{Diagnostic, SourceOffset, SourceSpan};

use crate::{ast::error::ParseError, lexer::error::LexerError, range::Range};

#[derive(Debug, thiserror::Error, PartialEq, Clone)]
pub enum InnerError {
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl InnerError {
    #[cold]
    pub fn range(&self) -> Range {
        match self {
            InnerError::Lexer(err) => err.range(),
            InnerError::Parse(err) => err.token().range,
        }
    }
}

/// A failure to decode an MI response, carrying the input so it can be rendered as a
/// diagnostic.
#[derive(PartialEq, Debug, thiserror::Error)]
#[error("{cause}")]
pub struct Error {
    /// The underlying cause of the error.
    pub cause: InnerError,
    /// The text that was being decoded.
    pub source_code: String,
    /// Where in `source_code` decoding stopped.
    pub location: SourceSpan,
}

impl Error {
    pub fn from_error(source_code: impl Into<String>, cause: InnerError) -> Self {
        let source_code = source_code.into();
        let range = cause.range();

        let start = SourceOffset::from_location(
            &source_code,
            range.start.line as usize,
            range.start.column,
        )
        .offset();
        let end =
            SourceOffset::from_location(&source_code, range.end.line as usize, range.end.column)
                .offset();

        // End of input has nothing to point at.
        let len = if start >= source_code.len() {
            0
        } else {
            std::cmp::max(end.saturating_sub(start), 1)
        };

        Self {
            cause,
            location: SourceSpan::new(start.into(), len),
            source_code,
        }
    }

    /// Whether the input failed to tokenize.
    pub fn is_lexical(&self) -> bool {
        matches!(self.cause, InnerError::Lexer(_))
    }

    /// Whether the tokens did not fit the grammar.
    pub fn is_grammar(&self) -> bool {
        matches!(self.cause, InnerError::Parse(_))
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let c = match self.cause {
            InnerError::Lexer(LexerError::UnexpectedCharacter(_, _)) => {
                "LexerError::UnexpectedCharacter"
            }
            InnerError::Lexer(LexerError::UnterminatedString(_)) => {
                "LexerError::UnterminatedString"
            }
            InnerError::Lexer(LexerError::InvalidEscape(_, _)) => "LexerError::InvalidEscape",
            InnerError::Parse(ParseError::UnexpectedToken { .. }) => {
                "ParseError::UnexpectedToken"
            }
        };

        Some(Box::new(c))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let msg = match &self.cause {
            InnerError::Lexer(LexerError::UnexpectedCharacter(' ' | '\t' | '\r', _)) => {
                "MI output carries no whitespace outside C strings and prompts.".to_string()
            }
            InnerError::Lexer(LexerError::UnexpectedCharacter(_, _)) => {
                "This character cannot start any MI token.".to_string()
            }
            InnerError::Lexer(LexerError::UnterminatedString(_)) => {
                "Add the closing `\"`, or check for a backslash escaping it.".to_string()
            }
            InnerError::Lexer(LexerError::InvalidEscape(seq, _)) => escape_help(seq),
            InnerError::Parse(ParseError::UnexpectedToken { found, .. }) if found.is_eof() => {
                "Input ended early. A complete response ends with `(gdb)` and a newline."
                    .to_string()
            }
            InnerError::Parse(ParseError::UnexpectedToken { .. }) => {
                "Check the record against the MI output grammar.".to_string()
            }
        };

        Some(Box::new(msg))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(
            miette::LabeledSpan::new_with_span(Some(format!("{}", self.cause)), self.location),
        )))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source_code)
    }
}

fn escape_help(seq: &str) -> String {
    let digits = match seq.chars().nth(1) {
        Some('x') => 2,
        Some('u') => 4,
        Some('U') => 8,
        _ => return "A backslash at the end of a string escapes nothing.".to_string(),
    };

    if seq.len() < digits + 2 {
        format!("`{}` must be followed by {digits} hex digits.", &seq[..2])
    } else {
        format!("`{seq}` does not name a Unicode scalar value.")
    }
}
