use nom_locate::LocatedSpan;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type Span<'a> = LocatedSpan<&'a str>;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub struct Position {
    pub line: u32,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Position {
    pub fn new(line: u32, column: usize) -> Self {
        Position { line, column }
    }
}

/// A half-open region of the input, in 1-based lines and UTF-8 columns.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }
}

impl<'a> From<Span<'a>> for Position {
    fn from(span: Span<'a>) -> Self {
        Position {
            line: span.location_line(),
            column: span.get_utf8_column(),
        }
    }
}

impl<'a> From<Span<'a>> for Range {
    fn from(span: Span<'a>) -> Self {
        let start: Position = span.into();
        let fragment = span.fragment();

        // A newline token ends on the following line.
        let end = match fragment.rfind('\n') {
            Some(index) => Position {
                line: start.line + fragment.matches('\n').count() as u32,
                column: fragment[index + 1..].chars().count() + 1,
            },
            None => Position {
                line: start.line,
                column: start.column + fragment.chars().count(),
            },
        };

        Range { start, end }
    }
}
