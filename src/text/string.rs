/// Feed the escaped form of `value` to `push`, one run at a time.
pub fn escape_with<F: FnMut(&str)>(value: &str, mut push: F) {
    let bytes = value.as_bytes();
    let mut start = 0;
    let mut unicode = *b"\\u0000";
    for (idx, &byte) in bytes.iter().enumerate() {
        let escaped = match byte {
            b'"' => "\\\"",
            b'\\' => "\\\\",
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            0x08 => "\\b",
            0x0C => "\\f",
            0x00..=0x1F => {
                unicode[4] = HEX_DIGITS[(byte >> 4) as usize];
                unicode[5] = HEX_DIGITS[(byte & 0x0F) as usize];
                // six ASCII bytes
                std::str::from_utf8(&unicode).unwrap_or_default()
            }
            _ => continue,
        };
        if start < idx {
            push(&value[start..idx]);
        }
        push(escaped);
        start = idx + 1;
    }
    if start < value.len() {
        push(&value[start..]);
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

pub fn escape_string_into(out: &mut String, value: &str) {
    escape_with(value, |piece| out.push_str(piece));
}
