use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    #[error("bad number")]
    BadNumber,
    #[error("bad string")]
    BadString,
    #[error("bad identifier")]
    BadIdentifier,
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("mismatched bracket")]
    MismatchBracket,
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unquoted key")]
    UnquotedKey,
    #[error("unexpected end of input")]
    BreakingBad,
}

impl ErrorKind {
    /// Numeric status, with 0 reserved for success.
    pub fn code(self) -> u8 {
        match self {
            ErrorKind::BadNumber => 1,
            ErrorKind::BadString => 2,
            ErrorKind::BadIdentifier => 3,
            ErrorKind::StackOverflow => 4,
            ErrorKind::StackUnderflow => 5,
            ErrorKind::MismatchBracket => 6,
            ErrorKind::UnexpectedCharacter => 7,
            ErrorKind::UnquotedKey => 8,
            ErrorKind::BreakingBad => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::BadNumber => "JSON_PARSE_BAD_NUMBER",
            ErrorKind::BadString => "JSON_PARSE_BAD_STRING",
            ErrorKind::BadIdentifier => "JSON_PARSE_BAD_IDENTIFIER",
            ErrorKind::StackOverflow => "JSON_PARSE_STACK_OVERFLOW",
            ErrorKind::StackUnderflow => "JSON_PARSE_STACK_UNDERFLOW",
            ErrorKind::MismatchBracket => "JSON_PARSE_MISMATCH_BRACKET",
            ErrorKind::UnexpectedCharacter => "JSON_PARSE_UNEXPECTED_CHARACTER",
            ErrorKind::UnquotedKey => "JSON_PARSE_UNQUOTED_KEY",
            ErrorKind::BreakingBad => "JSON_PARSE_BREAKING_BAD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Resolve a byte offset into a 1-based line and column.
    ///
    /// The column counts bytes from the most recent newline, so multi-byte
    /// characters widen it.
    pub fn from_offset(input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let before = &input[..offset];
        let line_start = memchr::memrchr(b'\n', before).map_or(0, |idx| idx + 1);
        let line = memchr::memchr_iter(b'\n', before).count() + 1;
        Self {
            offset,
            line,
            column: offset - line_start + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at byte {offset}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub offset: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Line and column of the failure. `input` must be an unmodified copy of
    /// the text: parsing unescapes strings in place, which can move or create
    /// newline bytes before the offset.
    pub fn location(&self, input: &[u8]) -> Location {
        Location::from_offset(input, self.offset)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Io(_) => None,
        }
    }
}
