//! `gdbmi` decodes the text gdb writes on its machine interface (`--interpreter=mi`) into a
//! typed [`Document`].
//!
//! ## Examples
//!
//! ```rust
//! use gdbmi::{Options, Value};
//!
//! let output = "=thread-group-added,id=\"i1\"\n~\"Reading symbols...\\n\"\n1^done,bkpt={number=\"1\",line=\"42\"}\n(gdb)\n";
//! let document = gdbmi::parse(output, Options::default()).unwrap();
//!
//! assert_eq!(document.out_of_band.len(), 2);
//! assert_eq!(document.console_output(), "Reading symbols...\n");
//!
//! let result = document.result.unwrap();
//! assert_eq!(result.token, Some(1));
//! assert_eq!(
//!     result.get("bkpt").and_then(|bkpt| bkpt.get("line")).and_then(Value::as_str),
//!     Some("42")
//! );
//!
//! // Strict mode rejects records after the result record.
//! assert!(gdbmi::parse("^done\n*stopped\n(gdb)\n", Options::pedantic()).is_err());
//! ```
mod ast;
mod error;
mod lexer;
mod range;

use std::str::FromStr;

use tracing::debug;

pub use ast::error::ParseError;
pub use ast::{
    AsyncKind, AsyncRecord, Document, NamedResult, OutOfBandRecord, Parser, ResultClass,
    ResultRecord, StreamKind, StreamRecord, Value,
};
pub use error::{Error, InnerError};
pub use lexer::Options;
pub use lexer::error::LexerError;
pub use lexer::token::{Expected, Token, TokenKind};
pub use range::{Position, Range};

/// Decodes one complete MI response, ending with the `(gdb)` prompt line.
pub fn parse(text: &str, options: Options) -> Result<Document, Error> {
    let span = tracing::trace_span!("parse", len = text.len(), pedantic = options.pedantic);
    let _enter = span.enter();

    let tokens = tokenize(text, options)?;
    let document = Parser::new(&tokens, options)
        .parse()
        .map_err(|e| failed(text, InnerError::Parse(e)))?;

    debug!(
        tokens = tokens.len(),
        records = document.out_of_band.len(),
        has_result = document.result.is_some(),
        "Parsed MI output"
    );

    Ok(document)
}

/// Splits `text` into tokens, ending with [`TokenKind::Eof`].
pub fn tokenize(text: &str, options: Options) -> Result<Vec<Token>, Error> {
    lexer::tokenize(text, options).map_err(|e| failed(text, InnerError::Lexer(e)))
}

#[cold]
fn failed(text: &str, cause: InnerError) -> Error {
    debug!(error = %cause, range = ?cause.range(), "Failed to decode MI output");
    Error::from_error(text, cause)
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s, Options::default())
    }
}
