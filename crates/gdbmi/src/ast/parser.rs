use smol_str::SmolStr;

use crate::lexer::Options;
use crate::lexer::token::{Expected, Token, TokenKind};
use crate::range::{Position, Range};

use super::error::ParseError;
use super::node::{
    AsyncKind, AsyncRecord, Document, NamedResult, OutOfBandRecord, ResultRecord, StreamKind,
    StreamRecord, Value,
};

static EOF: Token = Token {
    range: Range {
        start: Position { line: 1, column: 1 },
        end: Position { line: 1, column: 1 },
    },
    kind: TokenKind::Eof,
};

/// Recursive-descent parser over the output of [`crate::lexer::tokenize`].
///
/// The token slice is expected to end with [`TokenKind::Eof`]; running past the end behaves as
/// if it did.
pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    options: Options,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], options: Options) -> Self {
        Self {
            tokens,
            current: 0,
            options,
        }
    }

    pub fn parse(&mut self) -> Result<Document, ParseError> {
        self.parse_output()
    }

    fn parse_output(&mut self) -> Result<Document, ParseError> {
        let mut out_of_band = Vec::new();

        while !matches!(
            self.record_marker().kind,
            TokenKind::Caret | TokenKind::Prompt | TokenKind::Eof
        ) {
            out_of_band.push(self.parse_out_of_band_record()?);
        }

        let result = if matches!(self.record_marker().kind, TokenKind::Caret) {
            Some(self.parse_result_record()?)
        } else {
            None
        };

        if !self.options.pedantic {
            while !matches!(self.record_marker().kind, TokenKind::Prompt | TokenKind::Eof) {
                out_of_band.push(self.parse_out_of_band_record()?);
            }
        }

        self.expect(Expected::Prompt)?;
        self.expect(Expected::NewLine)?;
        self.expect(Expected::Eof)?;

        Ok(Document {
            out_of_band,
            result,
        })
    }

    fn parse_result_record(&mut self) -> Result<ResultRecord, ParseError> {
        let token = self.parse_token_number();
        self.expect(Expected::Caret)?;
        let class = self.parse_ident()?;

        let results = if self.check(Expected::Comma) {
            Some(self.parse_comma_prefixed_results(Expected::NewLine)?)
        } else {
            self.expect(Expected::NewLine)?;
            None
        };

        Ok(ResultRecord {
            token,
            class,
            results,
        })
    }

    fn parse_out_of_band_record(&mut self) -> Result<OutOfBandRecord, ParseError> {
        match self.record_marker().kind {
            TokenKind::Asterisk => self.parse_async_output(AsyncKind::Exec).map(Into::into),
            TokenKind::Plus => self.parse_async_output(AsyncKind::Status).map(Into::into),
            TokenKind::Equal => self.parse_async_output(AsyncKind::Notify).map(Into::into),
            TokenKind::Tilde => self.parse_stream_output(StreamKind::Console).map(Into::into),
            TokenKind::At => self.parse_stream_output(StreamKind::Target).map(Into::into),
            TokenKind::Ampersand => self.parse_stream_output(StreamKind::Log).map(Into::into),
            _ => Err(ParseError::UnexpectedToken {
                expected: Expected::OutOfBandRecord,
                found: self.token_at(self.marker_index()),
            }),
        }
    }

    fn parse_async_output(&mut self, kind: AsyncKind) -> Result<AsyncRecord, ParseError> {
        let token = self.parse_token_number();
        self.expect(Self::async_sigil(kind))?;
        let class = self.parse_ident()?;
        let results = self.parse_comma_prefixed_results(Expected::NewLine)?;

        Ok(AsyncRecord {
            token,
            kind,
            class,
            results,
        })
    }

    fn parse_stream_output(&mut self, kind: StreamKind) -> Result<StreamRecord, ParseError> {
        self.expect(Self::stream_sigil(kind))?;
        let text = self.parse_c_string()?;

        if self.options.pedantic {
            self.expect(Expected::NewLine)?;
        } else {
            self.accept(Expected::NewLine);
        }

        Ok(StreamRecord { kind, text })
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek().kind {
            TokenKind::LBracket => self.parse_list(),
            TokenKind::CString(_) => self.parse_c_string().map(Value::String),
            TokenKind::LBrace => self.parse_tuple(),
            _ => Err(ParseError::UnexpectedToken {
                expected: Expected::Value,
                found: self.token_at(self.current),
            }),
        }
    }

    fn parse_list(&mut self) -> Result<Value, ParseError> {
        self.expect(Expected::LBracket)?;

        if self.accept(Expected::RBracket).is_some() {
            return Ok(Value::List(Vec::new()));
        }

        // `[frame={...},frame={...}]` is a list of results rather than of values.
        if self.check(Expected::Ident) {
            let mut results = vec![self.parse_result()?];
            results.extend(self.parse_comma_prefixed_results(Expected::RBracket)?);
            return Ok(Value::Tuple(results));
        }

        let mut values = vec![self.parse_value()?];
        while self.accept(Expected::Comma).is_some() {
            values.push(self.parse_value()?);
        }
        self.expect(Expected::RBracket)?;

        Ok(Value::List(values))
    }

    fn parse_tuple(&mut self) -> Result<Value, ParseError> {
        self.expect(Expected::LBrace)?;

        if self.accept(Expected::RBrace).is_some() {
            return Ok(Value::Tuple(Vec::new()));
        }

        let mut results = vec![self.parse_result()?];
        results.extend(self.parse_comma_prefixed_results(Expected::RBrace)?);

        Ok(Value::Tuple(results))
    }

    fn parse_result(&mut self) -> Result<NamedResult, ParseError> {
        let name = self.parse_ident()?;
        self.expect(Expected::Equal)?;
        let value = self.parse_value()?;

        Ok(NamedResult { name, value })
    }

    fn parse_comma_prefixed_results(
        &mut self,
        terminator: Expected,
    ) -> Result<Vec<NamedResult>, ParseError> {
        let mut results = Vec::new();

        while self.accept(Expected::Comma).is_some() {
            results.push(self.parse_result()?);
        }
        self.expect(terminator)?;

        Ok(results)
    }

    fn parse_token_number(&mut self) -> Option<u64> {
        match self.accept(Expected::Number)?.kind {
            TokenKind::Number(n) => Some(n),
            _ => None,
        }
    }

    fn parse_ident(&mut self) -> Result<SmolStr, ParseError> {
        match &self.expect(Expected::Ident)?.kind {
            TokenKind::Ident(ident) => Ok(ident.clone()),
            _ => unreachable!(),
        }
    }

    fn parse_c_string(&mut self) -> Result<String, ParseError> {
        match &self.expect(Expected::CString)?.kind {
            TokenKind::CString(s) => Ok(s.clone()),
            _ => unreachable!(),
        }
    }

    #[inline(always)]
    fn async_sigil(kind: AsyncKind) -> Expected {
        match kind {
            AsyncKind::Exec => Expected::Asterisk,
            AsyncKind::Status => Expected::Plus,
            AsyncKind::Notify => Expected::Equal,
        }
    }

    #[inline(always)]
    fn stream_sigil(kind: StreamKind) -> Expected {
        match kind {
            StreamKind::Console => Expected::Tilde,
            StreamKind::Target => Expected::At,
            StreamKind::Log => Expected::Ampersand,
        }
    }

    /// The token that decides what kind of record starts here, looking past a token number.
    #[inline(always)]
    fn record_marker(&self) -> &'a Token {
        self.tokens.get(self.marker_index()).unwrap_or(&EOF)
    }

    #[inline(always)]
    fn marker_index(&self) -> usize {
        match self.peek().kind {
            TokenKind::Number(_) => self.current + 1,
            _ => self.current,
        }
    }

    /// An owned copy of the token at `index`. Past the end of a slice that lacks its `Eof`
    /// token, this is an `Eof` placed where the last token ends.
    #[cold]
    fn token_at(&self, index: usize) -> Token {
        match self.tokens.get(index) {
            Some(token) => token.clone(),
            None => {
                let end = self
                    .tokens
                    .last()
                    .map(|token| token.range.end)
                    .unwrap_or_default();
                Token::new(TokenKind::Eof, Range::new(end, end))
            }
        }
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token {
        self.tokens.get(self.current).unwrap_or(&EOF)
    }

    #[inline(always)]
    fn check(&self, expected: Expected) -> bool {
        self.peek().kind.is(expected)
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if self.current < self.tokens.len() {
            self.current += 1;
        }
        token
    }

    fn accept(&mut self, expected: Expected) -> Option<&'a Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, expected: Expected) -> Result<&'a Token, ParseError> {
        match self.accept(expected) {
            Some(token) => Ok(token),
            None => Err(ParseError::UnexpectedToken {
                expected,
                found: self.token_at(self.current),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use rstest::rstest;

    fn parse(input: &str, options: Options) -> Result<Document, ParseError> {
        let tokens = tokenize(input, options).unwrap();
        Parser::new(&tokens, options).parse()
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[rstest]
    #[case::done("^done\n(gdb)\n",
        Ok(Document {
            out_of_band: vec![],
            result: Some(ResultRecord { token: None, class: "done".into(), results: None }),
        }))]
    #[case::prompt_only("(gdb)\n",
        Ok(Document::default()))]
    #[case::token_and_tuple("1^done,bkpt={number=\"1\"}\n(gdb)\n",
        Ok(Document {
            out_of_band: vec![],
            result: Some(ResultRecord {
                token: Some(1),
                class: "done".into(),
                results: Some(vec![NamedResult::new("bkpt", Value::Tuple(vec![NamedResult::new("number", "1")]))]),
            }),
        }))]
    #[case::exec_async("*stopped,reason=\"breakpoint-hit\"\n(gdb)\n",
        Ok(Document {
            out_of_band: vec![OutOfBandRecord::Async(AsyncRecord {
                token: None,
                kind: AsyncKind::Exec,
                class: "stopped".into(),
                results: vec![NamedResult::new("reason", "breakpoint-hit")],
            })],
            result: None,
        }))]
    #[case::async_with_token("42*running,thread-id=\"all\"\n(gdb)\n",
        Ok(Document {
            out_of_band: vec![OutOfBandRecord::Async(AsyncRecord {
                token: Some(42),
                kind: AsyncKind::Exec,
                class: "running".into(),
                results: vec![NamedResult::new("thread-id", "all")],
            })],
            result: None,
        }))]
    #[case::console_stream("~\"Hello\\n\"\n(gdb)\n",
        Ok(Document {
            out_of_band: vec![OutOfBandRecord::Stream(StreamRecord { kind: StreamKind::Console, text: "Hello\n".to_string() })],
            result: None,
        }))]
    #[case::every_sigil("+download,section=\".text\"\n=thread-created,id=\"1\"\n@\"target\"\n&\"log\"\n^running\n(gdb)\n",
        Ok(Document {
            out_of_band: vec![
                OutOfBandRecord::Async(AsyncRecord {
                    token: None,
                    kind: AsyncKind::Status,
                    class: "download".into(),
                    results: vec![NamedResult::new("section", ".text")],
                }),
                OutOfBandRecord::Async(AsyncRecord {
                    token: None,
                    kind: AsyncKind::Notify,
                    class: "thread-created".into(),
                    results: vec![NamedResult::new("id", "1")],
                }),
                OutOfBandRecord::Stream(StreamRecord { kind: StreamKind::Target, text: "target".to_string() }),
                OutOfBandRecord::Stream(StreamRecord { kind: StreamKind::Log, text: "log".to_string() }),
            ],
            result: Some(ResultRecord { token: None, class: "running".into(), results: None }),
        }))]
    #[case::nested_values("^done,stack=[frame={level=\"0\",args=[]},frame={level=\"1\",args=[\"a\",{x=\"1\"}]}],empty={}\n(gdb)\n",
        Ok(Document {
            out_of_band: vec![],
            result: Some(ResultRecord {
                token: None,
                class: "done".into(),
                results: Some(vec![
                    NamedResult::new("stack", Value::Tuple(vec![
                        NamedResult::new("frame", Value::Tuple(vec![
                            NamedResult::new("level", "0"),
                            NamedResult::new("args", Value::List(vec![])),
                        ])),
                        NamedResult::new("frame", Value::Tuple(vec![
                            NamedResult::new("level", "1"),
                            NamedResult::new("args", Value::List(vec![
                                string("a"),
                                Value::Tuple(vec![NamedResult::new("x", "1")]),
                            ])),
                        ])),
                    ])),
                    NamedResult::new("empty", Value::Tuple(vec![])),
                ]),
            }),
        }))]
    #[case::duplicate_names_kept("^done,a=\"1\",a=\"2\"\n(gdb)\n",
        Ok(Document {
            out_of_band: vec![],
            result: Some(ResultRecord {
                token: None,
                class: "done".into(),
                results: Some(vec![NamedResult::new("a", "1"), NamedResult::new("a", "2")]),
            }),
        }))]
    fn test_parse(#[case] input: &str, #[case] expected: Result<Document, ParseError>) {
        assert_eq!(parse(input, Options::default()), expected);
        assert_eq!(parse(input, Options::pedantic()), expected);
    }

    #[rstest]
    #[case::oob_after_result("^done\n*stopped\n(gdb)\n", Expected::Prompt, TokenKind::Asterisk)]
    #[case::stream_without_newline("~\"a\"~\"b\"\n(gdb)\n", Expected::NewLine, TokenKind::Tilde)]
    fn test_lenient_only(#[case] input: &str, #[case] expected: Expected, #[case] found: TokenKind) {
        assert!(parse(input, Options::default()).is_ok());

        let err = parse(input, Options::pedantic()).unwrap_err();
        assert_eq!(err.expected(), expected);
        assert_eq!(err.token().kind, found);
    }

    #[test]
    fn test_lenient_keeps_trailing_records_in_order() {
        let document = parse("~\"a\"\n^done\n=b\n~\"c\"\n(gdb)\n", Options::default()).unwrap();

        assert_eq!(
            document.out_of_band,
            vec![
                OutOfBandRecord::Stream(StreamRecord {
                    kind: StreamKind::Console,
                    text: "a".to_string()
                }),
                OutOfBandRecord::Async(AsyncRecord {
                    token: None,
                    kind: AsyncKind::Notify,
                    class: "b".into(),
                    results: vec![],
                }),
                OutOfBandRecord::Stream(StreamRecord {
                    kind: StreamKind::Console,
                    text: "c".to_string()
                }),
            ]
        );
        assert_eq!(document.result.map(|r| r.class), Some("done".into()));
    }

    #[rstest]
    #[case::missing_prompt("^done\n", Expected::Prompt, TokenKind::Eof)]
    #[case::missing_prompt_after_oob("*stopped\n", Expected::Prompt, TokenKind::Eof)]
    #[case::missing_final_newline("^done\n(gdb)", Expected::NewLine, TokenKind::Eof)]
    #[case::trailing_tokens("^done\n(gdb)\n^done\n", Expected::Eof, TokenKind::Caret)]
    #[case::second_result("^done\n^done\n(gdb)\n", Expected::OutOfBandRecord, TokenKind::Caret)]
    #[case::bare_ident("done\n(gdb)\n", Expected::OutOfBandRecord, TokenKind::Ident("done".into()))]
    #[case::result_missing_newline("^done(gdb)\n", Expected::NewLine, TokenKind::Prompt)]
    #[case::async_missing_newline("*stopped(gdb)\n", Expected::NewLine, TokenKind::Prompt)]
    #[case::async_missing_class("*,a=\"1\"\n(gdb)\n", Expected::Ident, TokenKind::Comma)]
    #[case::stream_with_token("1~\"x\"\n(gdb)\n", Expected::Tilde, TokenKind::Number(1))]
    #[case::stream_without_string("~done\n(gdb)\n", Expected::CString, TokenKind::Ident("done".into()))]
    #[case::bare_value("^done,a=b\n(gdb)\n", Expected::Value, TokenKind::Ident("b".into()))]
    #[case::missing_equal("^done,a\"1\"\n(gdb)\n", Expected::Equal, TokenKind::CString("1".to_string()))]
    #[case::unclosed_tuple("^done,a={b=\"1\"\n(gdb)\n", Expected::RBrace, TokenKind::NewLine)]
    #[case::unclosed_list("^done,a=[\"1\"\n(gdb)\n", Expected::RBracket, TokenKind::NewLine)]
    #[case::mixed_list("^done,a=[b=\"1\",\"2\"]\n(gdb)\n", Expected::Ident, TokenKind::CString("2".to_string()))]
    #[case::trailing_comma("^done,a=\"1\",\n(gdb)\n", Expected::Ident, TokenKind::NewLine)]
    #[case::empty_input("", Expected::Prompt, TokenKind::Eof)]
    fn test_parse_error(#[case] input: &str, #[case] expected: Expected, #[case] found: TokenKind) {
        let err = parse(input, Options::default()).unwrap_err();
        assert_eq!(err.expected(), expected);
        assert_eq!(err.token().kind, found);
    }

    #[test]
    fn test_error_position() {
        let err = parse("^done\n*stopped,reason=oops\n(gdb)\n", Options::default()).unwrap_err();
        assert_eq!(
            err.token().range,
            Range::new(Position::new(2, 17), Position::new(2, 21))
        );
    }

    #[test]
    fn test_parse_without_eof_token() {
        let mut tokens = tokenize("^done\n(gdb)\n", Options::default()).unwrap();
        tokens.pop();

        assert!(Parser::new(&tokens, Options::default()).parse().is_ok());
    }

    #[rstest]
    #[case::missing_prompt("^done\n", Expected::Prompt, Position::new(2, 1))]
    #[case::missing_newline("*stopped", Expected::NewLine, Position::new(1, 9))]
    #[case::missing_value("^done,a=", Expected::Value, Position::new(1, 9))]
    #[case::no_tokens("", Expected::Prompt, Position::new(1, 1))]
    fn test_error_position_without_eof_token(
        #[case] input: &str,
        #[case] expected: Expected,
        #[case] position: Position,
    ) {
        let mut tokens = tokenize(input, Options::default()).unwrap();
        tokens.pop();

        let err = Parser::new(&tokens, Options::default()).parse().unwrap_err();
        assert_eq!(err.expected(), expected);
        assert_eq!(
            err.token(),
            &Token::new(TokenKind::Eof, Range::new(position, position))
        );
    }
}
