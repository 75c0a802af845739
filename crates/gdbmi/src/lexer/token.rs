use std::fmt::{self, Display, Formatter};

use smol_str::SmolStr;

use crate::range::Range;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Token {
    pub range: Range,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(kind: TokenKind, range: Range) -> Self {
        Self { range, kind }
    }

    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum TokenKind {
    Ampersand,
    Asterisk,
    At,
    Caret,
    Comma,
    CString(String),
    Eof,
    Equal,
    Ident(SmolStr),
    LBrace,
    LBracket,
    NewLine,
    Number(u64),
    Plus,
    Prompt,
    RBrace,
    RBracket,
    Tilde,
}

impl TokenKind {
    /// Returns whether this token satisfies the expectation, ignoring any payload.
    pub fn is(&self, expected: Expected) -> bool {
        match expected {
            Expected::Ampersand => matches!(self, TokenKind::Ampersand),
            Expected::Asterisk => matches!(self, TokenKind::Asterisk),
            Expected::At => matches!(self, TokenKind::At),
            Expected::Caret => matches!(self, TokenKind::Caret),
            Expected::Comma => matches!(self, TokenKind::Comma),
            Expected::CString => matches!(self, TokenKind::CString(_)),
            Expected::Eof => matches!(self, TokenKind::Eof),
            Expected::Equal => matches!(self, TokenKind::Equal),
            Expected::Ident => matches!(self, TokenKind::Ident(_)),
            Expected::LBrace => matches!(self, TokenKind::LBrace),
            Expected::LBracket => matches!(self, TokenKind::LBracket),
            Expected::NewLine => matches!(self, TokenKind::NewLine),
            Expected::Number => matches!(self, TokenKind::Number(_)),
            Expected::Plus => matches!(self, TokenKind::Plus),
            Expected::Prompt => matches!(self, TokenKind::Prompt),
            Expected::RBrace => matches!(self, TokenKind::RBrace),
            Expected::RBracket => matches!(self, TokenKind::RBracket),
            Expected::Tilde => matches!(self, TokenKind::Tilde),
            Expected::OutOfBandRecord => matches!(
                self,
                TokenKind::Asterisk
                    | TokenKind::Plus
                    | TokenKind::Equal
                    | TokenKind::Tilde
                    | TokenKind::At
                    | TokenKind::Ampersand
            ),
            Expected::Value => matches!(
                self,
                TokenKind::LBracket | TokenKind::LBrace | TokenKind::CString(_)
            ),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.kind)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match &self {
            TokenKind::Ampersand => write!(f, "&"),
            TokenKind::Asterisk => write!(f, "*"),
            TokenKind::At => write!(f, "@"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::CString(s) => write!(f, "{:?}", s),
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Equal => write!(f, "="),
            TokenKind::Ident(ident) => write!(f, "{}", ident),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::NewLine => write!(f, "\\n"),
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Prompt => write!(f, "(gdb)"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Tilde => write!(f, "~"),
        }
    }
}

/// What a grammar rule was looking for when it failed.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Expected {
    Ampersand,
    Asterisk,
    At,
    Caret,
    Comma,
    CString,
    Eof,
    Equal,
    Ident,
    LBrace,
    LBracket,
    NewLine,
    Number,
    Plus,
    Prompt,
    RBrace,
    RBracket,
    Tilde,
    OutOfBandRecord,
    Value,
}

impl Display for Expected {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Expected::Ampersand => write!(f, "`&`"),
            Expected::Asterisk => write!(f, "`*`"),
            Expected::At => write!(f, "`@`"),
            Expected::Caret => write!(f, "`^`"),
            Expected::Comma => write!(f, "`,`"),
            Expected::CString => write!(f, "a C string"),
            Expected::Eof => write!(f, "end of input"),
            Expected::Equal => write!(f, "`=`"),
            Expected::Ident => write!(f, "an identifier"),
            Expected::LBrace => write!(f, "`{{`"),
            Expected::LBracket => write!(f, "`[`"),
            Expected::NewLine => write!(f, "a newline"),
            Expected::Number => write!(f, "a token number"),
            Expected::Plus => write!(f, "`+`"),
            Expected::Prompt => write!(f, "`(gdb)`"),
            Expected::RBrace => write!(f, "`}}`"),
            Expected::RBracket => write!(f, "`]`"),
            Expected::Tilde => write!(f, "`~`"),
            Expected::OutOfBandRecord => write!(f, "out-of-band record marker"),
            Expected::Value => write!(f, "list, tuple, or string"),
        }
    }
}
