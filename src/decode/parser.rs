use smallvec::SmallVec;

use crate::arena::Handle;
use crate::constants::{MAX_DEPTH, MAX_DEPTH_LIMIT};
use crate::decode::scanner::Scanner;
use crate::error::{ErrorKind, ParseError};
use crate::options::ParseOptions;
use crate::value::{Node, NodeArena, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

/// Open list of a container under construction: O(1) append through the
/// tail, and the head becomes the finished container's first node.
#[derive(Debug, Default, Clone, Copy)]
struct ListBuilder {
    head: Option<Handle>,
    tail: Option<Handle>,
}

impl ListBuilder {
    fn push<'a>(&mut self, arena: &mut NodeArena<'a>, node: Node<'a>) {
        let handle = arena.alloc(node);
        match self.tail {
            Some(tail) => arena[tail].next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
    }

    fn finish(self) -> Option<Handle> {
        self.head
    }
}

#[derive(Debug)]
struct Frame<'a> {
    kind: Container,
    list: ListBuilder,
    key: Option<&'a str>,
}

impl<'a> Frame<'a> {
    fn new(kind: Container) -> Self {
        Self {
            kind,
            list: ListBuilder::default(),
            key: None,
        }
    }
}

pub(crate) struct Parser<'a, 'n> {
    scanner: Scanner<'a>,
    arena: &'n mut NodeArena<'a>,
    stack: SmallVec<[Frame<'a>; MAX_DEPTH]>,
    max_depth: usize,
    separator: bool,
}

impl<'a, 'n> Parser<'a, 'n> {
    pub fn new(
        input: &'a mut [u8],
        arena: &'n mut NodeArena<'a>,
        options: &ParseOptions,
    ) -> Self {
        Self {
            scanner: Scanner::new(input, options.strict),
            arena,
            stack: SmallVec::new(),
            max_depth: options.max_depth.min(MAX_DEPTH_LIMIT),
            separator: true,
        }
    }

    /// Run to the end of the first complete value. Returns the value and the
    /// offset of the first byte after it; trailing input is left unread.
    pub fn parse(mut self) -> Result<(Value<'a>, usize), ParseError> {
        loop {
            self.scanner.skip_whitespace();
            let start = self.scanner.offset();
            let Some(byte) = self.scanner.peek() else {
                break;
            };

            let value = match byte {
                b'-' | b'0'..=b'9' => Value::Number(self.scanner.scan_number()?),
                b'"' => Value::String(self.scanner.scan_string()?),
                b't' => {
                    self.scanner.scan_literal(b"true")?;
                    Value::Bool(true)
                }
                b'f' => {
                    self.scanner.scan_literal(b"false")?;
                    Value::Bool(false)
                }
                b'n' => {
                    self.scanner.scan_literal(b"null")?;
                    Value::Null
                }
                b'[' | b'{' => {
                    if self.stack.len() >= self.max_depth {
                        return Err(ParseError::new(ErrorKind::StackOverflow, start));
                    }
                    let kind = if byte == b'[' {
                        Container::Array
                    } else {
                        Container::Object
                    };
                    self.stack.push(Frame::new(kind));
                    self.separator = true;
                    self.scanner.advance(1);
                    continue;
                }
                b']' | b'}' => self.close(byte, start)?,
                b':' => {
                    match self.stack.last() {
                        Some(frame) if !self.separator && frame.key.is_some() => {}
                        _ => return Err(ParseError::new(ErrorKind::UnexpectedCharacter, start)),
                    }
                    self.separator = true;
                    self.scanner.advance(1);
                    continue;
                }
                b',' => {
                    match self.stack.last() {
                        Some(frame) if !self.separator && frame.key.is_none() => {}
                        _ => return Err(ParseError::new(ErrorKind::UnexpectedCharacter, start)),
                    }
                    self.separator = true;
                    self.scanner.advance(1);
                    continue;
                }
                _ => return Err(ParseError::new(ErrorKind::UnexpectedCharacter, start)),
            };

            self.separator = false;

            let Some(frame) = self.stack.last_mut() else {
                return Ok((value, self.scanner.offset()));
            };

            match (frame.kind, frame.key.take()) {
                (Container::Object, None) => match value {
                    Value::String(key) => frame.key = Some(key),
                    _ => return Err(ParseError::new(ErrorKind::UnquotedKey, start)),
                },
                (Container::Object, key) => frame.list.push(self.arena, Node::new(key, value)),
                (Container::Array, _) => frame.list.push(self.arena, Node::new(None, value)),
            }
        }

        Err(ParseError::new(ErrorKind::BreakingBad, self.scanner.offset()))
    }

    fn close(&mut self, byte: u8, start: usize) -> Result<Value<'a>, ParseError> {
        let frame = self
            .stack
            .pop()
            .ok_or(ParseError::new(ErrorKind::StackUnderflow, start))?;

        let value = match (frame.kind, byte) {
            (Container::Array, b']') => Value::Array(frame.list.finish()),
            (Container::Object, b'}') if frame.key.is_none() => Value::Object(frame.list.finish()),
            (Container::Object, b'}') => {
                return Err(ParseError::new(ErrorKind::UnexpectedCharacter, start))
            }
            _ => return Err(ParseError::new(ErrorKind::MismatchBracket, start)),
        };
        self.scanner.advance(1);
        Ok(value)
    }
}
