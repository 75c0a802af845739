pub mod error;
pub mod token;
pub mod unescape;

use error::LexerError;
use nom::Parser;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag, take_while},
    character::complete::{anychar, char, digit1, satisfy},
    combinator::{map, map_res, recognize},
    multi::many0,
    sequence::{delimited, pair},
};
use nom_locate::position;
use token::{Token, TokenKind};
use unescape::unescape;

use crate::range::{Position, Range, Span};

const PROMPT: &str = "(gdb)";

macro_rules! define_token_parser {
    ($name:ident, $tag:expr, $kind:expr) => {
        fn $name(input: Span) -> IResult<Span, Token> {
            map(tag($tag), |span: Span| Token {
                range: span.into(),
                kind: $kind,
            })
            .parse(input)
        }
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Follow the published grammar exactly. By default out-of-band records after the result
    /// record, stream records without a trailing newline and spaces after `(gdb)` are accepted.
    pub pedantic: bool,
}

impl Options {
    pub fn pedantic() -> Self {
        Self { pedantic: true }
    }
}

/// Splits a complete MI response into tokens, terminated by [`TokenKind::Eof`].
///
/// Rules are tried in a fixed order and the first one that matches wins, so `123abc` lexes as
/// a token number followed by an identifier. Nothing is skipped: any character outside a C
/// string that no rule accepts is an error.
pub fn tokenize(input: &str, options: Options) -> Result<Vec<Token>, LexerError> {
    let (rest, mut tokens) = match many0(token(options)).parse(Span::new(input)) {
        Ok(result) => result,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => return Err(diagnose(e.input)),
        Err(nom::Err::Incomplete(_)) => return Err(diagnose(Span::new(input))),
    };

    if !rest.fragment().is_empty() {
        return Err(diagnose(rest));
    }

    let eof: Range = rest.into();
    tokens.push(Token {
        range: eof,
        kind: TokenKind::Eof,
    });

    Ok(tokens)
}

fn token<'a>(options: Options) -> impl FnMut(Span<'a>) -> IResult<Span<'a>, Token> {
    move |input| {
        alt((
            number,
            newline,
            prompt(options),
            ident,
            punctuations,
            c_string,
        ))
        .parse(input)
    }
}

fn number(input: Span) -> IResult<Span, Token> {
    map_res(digit1, |span: Span| {
        span.fragment().parse::<u64>().map(|n| Token {
            range: span.into(),
            kind: TokenKind::Number(n),
        })
    })
    .parse(input)
}

define_token_parser!(newline, "\n", TokenKind::NewLine);
define_token_parser!(l_bracket, "[", TokenKind::LBracket);
define_token_parser!(r_bracket, "]", TokenKind::RBracket);
define_token_parser!(l_brace, "{", TokenKind::LBrace);
define_token_parser!(r_brace, "}", TokenKind::RBrace);
define_token_parser!(comma, ",", TokenKind::Comma);
define_token_parser!(caret, "^", TokenKind::Caret);
define_token_parser!(asterisk, "*", TokenKind::Asterisk);
define_token_parser!(plus, "+", TokenKind::Plus);
define_token_parser!(equal, "=", TokenKind::Equal);
define_token_parser!(tilde, "~", TokenKind::Tilde);
define_token_parser!(at, "@", TokenKind::At);
define_token_parser!(ampersand, "&", TokenKind::Ampersand);

// gdb writes "(gdb) " before the newline. Outside pedantic mode the trailing spaces belong to
// the prompt.
fn prompt<'a>(options: Options) -> impl FnMut(Span<'a>) -> IResult<Span<'a>, Token> {
    move |input| {
        let prompt: IResult<Span, Span> = if options.pedantic {
            tag(PROMPT).parse(input)
        } else {
            recognize(pair(tag(PROMPT), take_while(|c: char| c == ' '))).parse(input)
        };
        let (rest, span) = prompt?;

        Ok((
            rest,
            Token {
                range: span.into(),
                kind: TokenKind::Prompt,
            },
        ))
    }
}

fn ident(input: Span) -> IResult<Span, Token> {
    map(
        recognize(pair(
            satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
        )),
        |span: Span| Token {
            range: span.into(),
            kind: TokenKind::Ident((*span.fragment()).into()),
        },
    )
    .parse(input)
}

fn punctuations(input: Span) -> IResult<Span, Token> {
    alt((
        l_bracket, r_bracket, l_brace, r_brace, comma, caret, asterisk, plus, equal, tilde, at,
        ampersand,
    ))
    .parse(input)
}

/// The undecoded contents of a C string, without the surrounding quotes.
fn raw_c_string(input: Span) -> IResult<Span, Span> {
    delimited(
        char('"'),
        recognize(many0(alt((
            is_not("\"\\"),
            recognize(pair(char('\\'), anychar)),
        )))),
        char('"'),
    )
    .parse(input)
}

fn c_string(input: Span) -> IResult<Span, Token> {
    let (span, start) = position(input)?;
    let (span, raw) = raw_c_string(span)?;
    let (span, end) = position(span)?;

    let decoded = unescape(raw.fragment()).map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Escaped))
    })?;

    Ok((
        span,
        Token {
            range: Range {
                start: start.into(),
                end: end.into(),
            },
            kind: TokenKind::CString(decoded),
        },
    ))
}

/// Works out why no rule matched at `rest`.
#[cold]
fn diagnose(rest: Span) -> LexerError {
    let start: Position = rest.into();
    let c = rest.fragment().chars().next().unwrap_or_default();

    if c != '"' {
        return LexerError::UnexpectedCharacter(
            c,
            Range {
                start,
                end: Position {
                    line: start.line,
                    column: start.column + 1,
                },
            },
        );
    }

    match raw_c_string(rest) {
        Ok((after, raw)) => {
            let range = Range {
                start,
                end: after.into(),
            };
            match unescape(raw.fragment()) {
                Err(e) => LexerError::InvalidEscape(e.0, range),
                // Unreachable in practice: a decodable string would have lexed.
                Ok(_) => LexerError::UnexpectedCharacter(c, range),
            }
        }
        Err(_) => LexerError::UnterminatedString(rest.into()),
    }
}
