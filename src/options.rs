use std::borrow::Cow;

use crate::constants::{DEFAULT_INDENT, MAX_DEPTH, MAX_DEPTH_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_depth: usize,
    pub strict: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nesting limit for arrays and objects, capped at [`MAX_DEPTH_LIMIT`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_LIMIT);
        self
    }

    /// Reject raw control bytes inside strings.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub indent: Cow<'static, str>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: impl Into<Cow<'static, str>>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_spaces(self, count: usize) -> Self {
        self.with_indent(" ".repeat(count))
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: Cow::Borrowed(DEFAULT_INDENT),
        }
    }
}
