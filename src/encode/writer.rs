use crate::num::number::NumberBuffer;
use crate::text::string::escape_with;

/// Destination for rendered text.
pub(crate) trait Output {
    fn push_str(&mut self, s: &str);
}

impl Output for String {
    fn push_str(&mut self, s: &str) {
        String::push_str(self, s);
    }
}

/// Fixed byte buffer that keeps counting once full, so the caller learns the
/// size it would have needed.
pub(crate) struct SliceOutput<'b> {
    buffer: Option<&'b mut [u8]>,
    needed: usize,
}

impl<'b> SliceOutput<'b> {
    pub fn new(buffer: Option<&'b mut [u8]>) -> Self {
        Self { buffer, needed: 0 }
    }

    /// NUL-terminate what was written and return the full size, terminator
    /// included. A short buffer gets its last byte replaced by the NUL.
    pub fn finish(self) -> usize {
        if let Some(buffer) = self.buffer {
            if self.needed < buffer.len() {
                buffer[self.needed] = 0;
            } else if let Some(last) = buffer.last_mut() {
                *last = 0;
            }
        }
        self.needed + 1
    }
}

impl Output for SliceOutput<'_> {
    fn push_str(&mut self, s: &str) {
        if let Some(buffer) = self.buffer.as_deref_mut() {
            let bytes = s.as_bytes();
            if self.needed < buffer.len() {
                let count = bytes.len().min(buffer.len() - self.needed);
                buffer[self.needed..self.needed + count].copy_from_slice(&bytes[..count]);
            }
        }
        self.needed += s.len();
    }
}

pub(crate) struct Writer<'o, O: Output> {
    out: O,
    indent: &'o str,
    numbers: NumberBuffer,
}

impl<'o, O: Output> Writer<'o, O> {
    pub fn new(out: O, indent: &'o str) -> Self {
        Self {
            out,
            indent,
            numbers: NumberBuffer::new(),
        }
    }

    pub fn finish(self) -> O {
        self.out
    }

    pub fn write_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub fn write_newline(&mut self) {
        self.out.push_str("\n");
    }

    pub fn write_indent(&mut self, depth: usize) {
        if self.indent.is_empty() {
            return;
        }
        for _ in 0..depth {
            self.out.push_str(self.indent);
        }
    }

    pub fn write_number(&mut self, value: f64) {
        let text = self.numbers.format(value);
        self.out.push_str(text);
    }

    pub fn write_quoted_string(&mut self, s: &str) {
        self.out.push_str("\"");
        let out = &mut self.out;
        escape_with(s, |piece| out.push_str(piece));
        self.out.push_str("\"");
    }

    pub fn write_key(&mut self, key: &str) {
        self.write_quoted_string(key);
        self.out.push_str(": ");
    }
}
