use std::mem;

use crate::constants::{hex_value, is_delimiter, is_digit, is_whitespace};
use crate::error::{ErrorKind, ParseError};

/// Byte cursor over the unconsumed tail of a mutable input buffer.
///
/// Consumed bytes are split off the front, so strings handed out as `&'a str`
/// never alias the region that is still being rewritten.
pub(crate) struct Scanner<'a> {
    rest: &'a mut [u8],
    offset: usize,
    strict: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a mut [u8], strict: bool) -> Self {
        Self {
            rest: input,
            offset: 0,
            strict,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Next byte, or `None` at the end of the slice or a NUL terminator.
    pub fn peek(&self) -> Option<u8> {
        match self.rest.first() {
            Some(0) | None => None,
            Some(&byte) => Some(byte),
        }
    }

    fn byte_at(&self, idx: usize) -> u8 {
        self.rest.get(idx).copied().unwrap_or(0)
    }

    pub fn advance(&mut self, count: usize) {
        self.take(count);
    }

    fn take(&mut self, count: usize) -> &'a mut [u8] {
        let (head, tail) = mem::take(&mut self.rest).split_at_mut(count);
        self.rest = tail;
        self.offset += count;
        head
    }

    fn error(&self, kind: ErrorKind, idx: usize) -> ParseError {
        ParseError::new(kind, self.offset + idx)
    }

    pub fn skip_whitespace(&mut self) {
        let count = self
            .rest
            .iter()
            .position(|&byte| !is_whitespace(byte))
            .unwrap_or(self.rest.len());
        self.advance(count);
    }

    /// Match `word` exactly at the cursor, followed by a delimiter.
    pub fn scan_literal(&mut self, word: &[u8]) -> Result<(), ParseError> {
        if !self.rest.starts_with(word) || !is_delimiter(self.byte_at(word.len())) {
            return Err(self.error(ErrorKind::BadIdentifier, 0));
        }
        self.advance(word.len());
        Ok(())
    }

    pub fn scan_number(&mut self) -> Result<f64, ParseError> {
        let mut idx = 0;
        if self.byte_at(0) == b'-' {
            idx = 1;
            let next = self.byte_at(1);
            if !is_digit(next) && next != b'.' {
                return Err(self.error(ErrorKind::BadNumber, 1));
            }
        }

        let mut digits = 0;
        while is_digit(self.byte_at(idx)) {
            idx += 1;
            digits += 1;
        }
        if self.byte_at(idx) == b'.' {
            idx += 1;
            while is_digit(self.byte_at(idx)) {
                idx += 1;
                digits += 1;
            }
        }
        if digits == 0 {
            return Err(self.error(ErrorKind::BadNumber, idx));
        }

        let mantissa_end = idx;
        let mut exponent_digits = 0;
        if matches!(self.byte_at(idx), b'e' | b'E') {
            idx += 1;
            if matches!(self.byte_at(idx), b'+' | b'-') {
                idx += 1;
            }
            while is_digit(self.byte_at(idx)) {
                idx += 1;
                exponent_digits += 1;
            }
        }

        if !is_delimiter(self.byte_at(idx)) {
            return Err(self.error(ErrorKind::BadNumber, idx));
        }

        // an exponent marker without digits counts as `e0`
        let text_end = if exponent_digits > 0 { idx } else { mantissa_end };
        let number = std::str::from_utf8(&self.rest[..text_end])
            .ok()
            .and_then(|text| text.parse::<f64>().ok())
            .ok_or_else(|| self.error(ErrorKind::BadNumber, 0))?;

        self.advance(idx);
        Ok(number)
    }

    /// Scan a string starting at its opening quote, unescaping it in place.
    ///
    /// The byte after the payload is overwritten with NUL and the cursor ends
    /// past the closing quote.
    pub fn scan_string(&mut self) -> Result<&'a str, ParseError> {
        let quote = self.offset;
        self.advance(1);

        let (read, written) = self.unescape_in_place()?;

        let after = read + 1;
        if !is_delimiter(self.byte_at(after)) {
            return Err(self.error(ErrorKind::BadString, after));
        }

        let region = self.take(after);
        region[written] = 0;
        let (payload, _) = region.split_at_mut(written);
        let payload: &'a [u8] = payload;
        std::str::from_utf8(payload).map_err(|_| ParseError::new(ErrorKind::BadString, quote))
    }

    /// Returns the index of the closing quote and the unescaped length.
    fn unescape_in_place(&mut self) -> Result<(usize, usize), ParseError> {
        let strict = self.strict;
        let base = self.offset;
        let buf = &mut *self.rest;
        let fail = |idx: usize| ParseError::new(ErrorKind::BadString, base + idx);

        let mut read = 0;
        let mut write = 0;
        loop {
            let run = memchr::memchr3(b'"', b'\\', 0, &buf[read..]).unwrap_or(buf.len() - read);
            if strict {
                if let Some(bad) = buf[read..read + run].iter().position(|&b| is_control(b)) {
                    return Err(fail(read + bad));
                }
            }
            if write != read {
                buf.copy_within(read..read + run, write);
            }
            read += run;
            write += run;

            match buf.get(read) {
                Some(b'"') => return Ok((read, write)),
                Some(b'\\') => {}
                _ => return Err(fail(read)),
            }

            read += 1;
            let escaped = match buf.get(read) {
                Some(b'"') => b'"',
                Some(b'\\') => b'\\',
                Some(b'/') => b'/',
                Some(b'b') => 0x08,
                Some(b'f') => 0x0C,
                Some(b'n') => b'\n',
                Some(b'r') => b'\r',
                Some(b't') => b'\t',
                Some(b'u') => {
                    let mut code = 0u32;
                    for idx in read + 1..read + 5 {
                        let digit = buf.get(idx).copied().and_then(hex_value);
                        code = code * 16 + digit.ok_or_else(|| fail(idx))?;
                    }
                    read += 5;

                    // a high surrogate directly followed by an escaped low one
                    // forms a single astral character
                    if (0xD800..0xDC00).contains(&code) {
                        if let Some(low) = low_surrogate_at(buf, read) {
                            code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                            read += 6;
                        }
                    }

                    let ch = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
                    let len = ch.len_utf8();
                    ch.encode_utf8(&mut buf[write..write + len]);
                    write += len;
                    continue;
                }
                _ => return Err(fail(read)),
            };
            buf[write] = escaped;
            read += 1;
            write += 1;
        }
    }
}

/// Code unit of a `\uDC00`-`\uDFFF` escape starting at `idx`.
fn low_surrogate_at(buf: &[u8], idx: usize) -> Option<u32> {
    let escape = buf.get(idx..idx + 6)?;
    if !escape.starts_with(b"\\u") {
        return None;
    }
    let code = escape[2..]
        .iter()
        .try_fold(0u32, |code, &byte| Some(code * 16 + hex_value(byte)?))?;
    (0xDC00..0xE000).contains(&code).then_some(code)
}

fn is_control(byte: u8) -> bool {
    byte < 0x20 || byte == 0x7F
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(input: &str) -> Result<f64, ParseError> {
        let mut buf = input.as_bytes().to_vec();
        Scanner::new(&mut buf, false).scan_number()
    }

    fn string(input: &str, strict: bool) -> Result<String, ParseError> {
        let mut buf = input.as_bytes().to_vec();
        let mut scanner = Scanner::new(&mut buf, strict);
        scanner.scan_string().map(str::to_string)
    }

    #[rstest::rstest]
    #[case("0", 0.0)]
    #[case("-42", -42.0)]
    #[case("013", 13.0)]
    #[case("-.666", -0.666)]
    #[case("1.", 1.0)]
    #[case("13.19e+1", 131.9)]
    #[case("0.123456789e-12", 0.123456789e-12)]
    #[case("1.234567890E+34", 1.234567890e34)]
    #[case("0e", 0.0)]
    #[case("2e+", 2.0)]
    #[case("7,", 7.0)]
    #[case("7]", 7.0)]
    #[case("1e400", f64::INFINITY)]
    fn test_scan_number(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(number(input).unwrap(), expected);
    }

    #[rstest::rstest]
    #[case("-", 1)]
    #[case("-x", 1)]
    #[case("-.", 2)]
    #[case("0x14", 1)]
    #[case("0e+-1", 3)]
    #[case("1\"", 1)]
    #[case("1.5.2", 3)]
    fn test_scan_number_errors(#[case] input: &str, #[case] offset: usize) {
        let err = number(input).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadNumber);
        assert_eq!(err.offset, offset);
    }

    #[rstest::rstest]
    fn test_number_stops_at_delimiter() {
        let mut buf = b"12 , 3".to_vec();
        let mut scanner = Scanner::new(&mut buf, false);
        assert_eq!(scanner.scan_number().unwrap(), 12.0);
        assert_eq!(scanner.offset(), 2);
        scanner.skip_whitespace();
        assert_eq!(scanner.peek(), Some(b','));
    }

    #[rstest::rstest]
    #[case(r#""plain""#, "plain")]
    #[case(r#""""#, "")]
    #[case(r#""\u0041""#, "A")]
    #[case(r#""\u00e9""#, "\u{e9}")]
    #[case(r#""\u4567""#, "\u{4567}")]
    #[case(r#""\"\\\/\b\f\n\r\t""#, "\"\\/\u{8}\u{c}\n\r\t")]
    #[case(r#""a\nb\nc""#, "a\nb\nc")]
    #[case(r#""\ud83d\ude00""#, "\u{1f600}")]
    #[case(r#""x\uD834\uDD1Ey""#, "x\u{1d11e}y")]
    #[case(r#""\ud83d""#, "\u{fffd}")]
    #[case(r#""\ude00\ud83d""#, "\u{fffd}\u{fffd}")]
    #[case(r#""\ud83dx""#, "\u{fffd}x")]
    #[case(r#""\ud83d\u0041""#, "\u{fffd}A")]
    #[case(r#""\ud83d\n""#, "\u{fffd}\n")]
    #[case("\"tab\tinside\"", "tab\tinside")]
    #[case("\"привет\"", "привет")]
    fn test_scan_string(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(string(input, false).unwrap(), expected);
    }

    #[rstest::rstest]
    #[case(r#""unterminated"#, 13)]
    #[case(r#""bad \x15""#, 6)]
    #[case(r#""bad \017""#, 6)]
    #[case(r#""\u12g4""#, 5)]
    #[case(r#""\u12""#, 5)]
    #[case(r#""ok"x"#, 4)]
    #[case("\"nul\0\"", 4)]
    fn test_scan_string_errors(#[case] input: &str, #[case] offset: usize) {
        let err = string(input, false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadString);
        assert_eq!(err.offset, offset);
    }

    #[rstest::rstest]
    fn test_strict_rejects_control_bytes() {
        let err = string("\"tab\there\"", true).unwrap_err();
        assert_eq!(err.offset, 4);
        let err = string("\"x\\n\nline\"", true).unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(string(r#""a\tb""#, true).unwrap(), "a\tb");
    }

    #[rstest::rstest]
    fn test_string_is_rewritten_in_place() {
        let mut buf = br#""a\u00e9b" ,"#.to_vec();
        {
            let mut scanner = Scanner::new(&mut buf, false);
            assert_eq!(scanner.scan_string().unwrap(), "a\u{e9}b");
            assert_eq!(scanner.offset(), 10);
        }
        assert_eq!(&buf[..6], &[b'"', b'a', 0xC3, 0xA9, b'b', 0]);
        assert_eq!(&buf[10..], b" ,");
    }

    #[rstest::rstest]
    fn test_surrogate_pair_shrinks_in_place() {
        let mut buf = br#""\ud83d\ude00":"#.to_vec();
        {
            let mut scanner = Scanner::new(&mut buf, false);
            assert_eq!(scanner.scan_string().unwrap(), "\u{1f600}");
            assert_eq!(scanner.offset(), 14);
            assert_eq!(scanner.peek(), Some(b':'));
        }
        assert_eq!(&buf[1..6], &[0xF0, 0x9F, 0x98, 0x80, 0]);
    }

    #[rstest::rstest]
    fn test_fast_path_overwrites_closing_quote() {
        let mut buf = br#""key":1"#.to_vec();
        {
            let mut scanner = Scanner::new(&mut buf, false);
            assert_eq!(scanner.scan_string().unwrap(), "key");
            assert_eq!(scanner.peek(), Some(b':'));
        }
        assert_eq!(buf, b"\"key\0:1");
    }

    #[rstest::rstest]
    #[case("true", true)]
    #[case("true,", true)]
    #[case("truth", false)]
    #[case("tru", false)]
    #[case("True", false)]
    #[case("true[", false)]
    fn test_scan_literal(#[case] input: &str, #[case] ok: bool) {
        let mut buf = input.as_bytes().to_vec();
        let mut scanner = Scanner::new(&mut buf, false);
        let result = scanner.scan_literal(b"true");
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(err.kind, ErrorKind::BadIdentifier);
            assert_eq!(err.offset, 0);
        }
    }

    #[rstest::rstest]
    fn test_peek_stops_at_nul() {
        let mut buf = b"  \0[".to_vec();
        let mut scanner = Scanner::new(&mut buf, false);
        scanner.skip_whitespace();
        assert_eq!(scanner.offset(), 2);
        assert_eq!(scanner.peek(), None);
    }
}
