//! The parser contract.
//!
//! Lexing and parsing GraphQL source text into a [`Document`](crate::ast::Document)
//! is outside this crate's scope: we only pin down the interface a parser is
//! expected to satisfy, plus the source-position bookkeeping every AST node
//! carries so the validator and executor can report locations.
//!
//! No tokenizer is shipped here. Tests and examples build documents directly
//! via the constructors in [`crate::ast`].

use derive_more::{Display, Error};

use crate::ast::Document;

/// A zero-based byte/line/column position in the original source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePosition {
    index: usize,
    line: usize,
    column: usize,
}

impl SourcePosition {
    pub fn new(index: usize, line: usize, column: usize) -> Self {
        SourcePosition { index, line, column }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

/// A value together with the source span it was parsed from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Spanning<T> {
    pub item: T,
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl<T> Spanning<T> {
    pub fn new(start: SourcePosition, end: SourcePosition, item: T) -> Self {
        Spanning { item, start, end }
    }

    pub fn zero_width(at: SourcePosition, item: T) -> Self {
        Spanning {
            item,
            start: at,
            end: at,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanning<U> {
        Spanning {
            item: f(self.item),
            start: self.start,
            end: self.end,
        }
    }

    pub fn as_ref(&self) -> Spanning<&T> {
        Spanning {
            item: &self.item,
            start: self.start,
            end: self.end,
        }
    }
}

/// A syntax error produced while lexing or parsing source text.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
#[display("{message} at {}:{}", position.line() + 1, position.column() + 1)]
pub struct ParseError {
    message: String,
    position: SourcePosition,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: SourcePosition) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> SourcePosition {
        self.position
    }
}

/// The external collaborator this crate expects but does not implement.
///
/// A real implementation lexes and parses `source` into a [`Document`],
/// reporting every syntax error it finds rather than stopping at the first.
pub trait Parse {
    fn parse_document(source: &str) -> Result<Document, Vec<ParseError>>;
}
