mod parser;
mod scanner;

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::value::{NodeArena, Value, ValueRef};

use parser::Parser;

/// Result of a successful parse: the root value, the offset just past it,
/// and the arena its nodes live in.
#[derive(Clone, Copy)]
pub struct Document<'a, 'n> {
    root: Value<'a>,
    end: usize,
    arena: &'n NodeArena<'a>,
}

impl<'a, 'n> Document<'a, 'n> {
    pub fn root(&self) -> ValueRef<'n, 'a> {
        ValueRef::new(self.root, self.arena)
    }

    pub fn value(&self) -> Value<'a> {
        self.root
    }

    /// Offset of the first byte after the root value.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn arena(&self) -> &'n NodeArena<'a> {
        self.arena
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        self.root().to_json_value()
    }
}

impl fmt::Debug for Document<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root())
            .field("end", &self.end)
            .finish()
    }
}

impl Serialize for Document<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root().serialize(serializer)
    }
}

pub fn parse<'a, 'n>(
    input: &'a mut [u8],
    arena: &'n mut NodeArena<'a>,
) -> Result<Document<'a, 'n>, ParseError> {
    parse_with_options(input, arena, &ParseOptions::default())
}

/// Parse `input` in place. Strings in the result borrow from `input`, which
/// is rewritten while unescaping and must not be parsed a second time.
pub fn parse_with_options<'a, 'n>(
    input: &'a mut [u8],
    arena: &'n mut NodeArena<'a>,
    options: &ParseOptions,
) -> Result<Document<'a, 'n>, ParseError> {
    let len = input.len();
    let outcome = Parser::new(input, &mut *arena, options).parse();
    let arena: &'n NodeArena<'a> = arena;

    match outcome {
        Ok((root, end)) => {
            tracing::debug!(
                len,
                end,
                nodes = arena.len(),
                zones = arena.stats().zones,
                "parsed document"
            );
            Ok(Document { root, end, arena })
        }
        Err(err) => {
            tracing::debug!(kind = err.kind.as_str(), offset = err.offset, "parse failed");
            Err(err)
        }
    }
}

/// Check `input` without keeping the tree. Returns the end offset.
pub fn validate(input: &mut [u8], options: &ParseOptions) -> Result<usize, ParseError> {
    let mut arena = NodeArena::new();
    let document = parse_with_options(input, &mut arena, options)?;
    Ok(document.end())
}
