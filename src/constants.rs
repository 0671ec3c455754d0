pub const ZONE_SIZE: usize = 4096;

pub const MAX_DEPTH: usize = 32;

/// Ceiling for any configured depth. Writing, serializing and converting a
/// document recurse once per level.
pub const MAX_DEPTH_LIMIT: usize = 1024;

pub const DEFAULT_INDENT: &str = "\t";

const WHITESPACE: u8 = 1 << 0;
const DELIMITER: u8 = 1 << 1;
const DIGIT: u8 = 1 << 2;
const HEX: u8 = 1 << 3;

static CLASSES: [u8; 256] = build_classes();

const fn build_classes() -> [u8; 256] {
    let mut table = [0u8; 256];

    let spaces = [b' ', b'\t', b'\n', 0x0B, 0x0C, b'\r'];
    let mut i = 0;
    while i < spaces.len() {
        table[spaces[i] as usize] |= WHITESPACE | DELIMITER;
        i += 1;
    }

    let structural = [b',', b':', b']', b'}', 0];
    let mut i = 0;
    while i < structural.len() {
        table[structural[i] as usize] |= DELIMITER;
        i += 1;
    }

    let mut b = b'0';
    while b <= b'9' {
        table[b as usize] |= DIGIT | HEX;
        b += 1;
    }

    let mut b = b'a';
    while b <= b'f' {
        table[b as usize] |= HEX;
        table[(b - 32) as usize] |= HEX;
        b += 1;
    }

    table
}

#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    CLASSES[byte as usize] & WHITESPACE != 0
}

/// Bytes that may legally follow a number, string or literal. NUL counts so a
/// C-style terminator behaves like the end of the input.
#[inline]
pub fn is_delimiter(byte: u8) -> bool {
    CLASSES[byte as usize] & DELIMITER != 0
}

#[inline]
pub fn is_digit(byte: u8) -> bool {
    CLASSES[byte as usize] & DIGIT != 0
}

#[inline]
pub fn hex_value(byte: u8) -> Option<u32> {
    if CLASSES[byte as usize] & HEX == 0 {
        return None;
    }
    let value = match byte {
        b'0'..=b'9' => byte - b'0',
        _ => (byte | 0x20) - b'a' + 10,
    };
    Some(u32::from(value))
}
