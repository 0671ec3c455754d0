mod writer;

use std::io::Write;

use crate::value::{Value, ValueRef};
use crate::{Result, WriteOptions};

use writer::{Output, SliceOutput, Writer};

/// Render `value` into `buffer` and return the number of bytes the full text
/// needs, including a trailing NUL.
///
/// Pass `None` to only measure. A buffer that is too small receives as much
/// as fits, NUL-terminated in its last byte; compare the return value with
/// the buffer length to detect truncation.
///
/// ```
/// use bumpjson::{encode, parse, NodeArena, WriteOptions};
///
/// let mut input = br#"{"a": [1, 2]}"#.to_vec();
/// let mut arena = NodeArena::new();
/// let doc = parse(&mut input, &mut arena).unwrap();
///
/// let options = WriteOptions::new().with_spaces(2);
/// let needed = encode::write_to_buffer(doc.root(), None, &options);
/// let mut out = vec![0u8; needed];
/// assert_eq!(encode::write_to_buffer(doc.root(), Some(&mut out), &options), needed);
/// assert_eq!(&out[..needed - 1], b"{\n  \"a\": [\n    1,\n    2\n  ]\n}");
/// ```
pub fn write_to_buffer(
    value: ValueRef<'_, '_>,
    buffer: Option<&mut [u8]>,
    options: &WriteOptions,
) -> usize {
    let mut writer = Writer::new(SliceOutput::new(buffer), &options.indent);
    write_value(&mut writer, value, 0);
    writer.finish().finish()
}

pub fn to_string(value: ValueRef<'_, '_>, options: &WriteOptions) -> String {
    let mut writer = Writer::new(String::new(), &options.indent);
    write_value(&mut writer, value, 0);
    writer.finish()
}

pub fn to_vec(value: ValueRef<'_, '_>, options: &WriteOptions) -> Vec<u8> {
    to_string(value, options).into_bytes()
}

pub fn to_writer<W: Write>(
    mut writer: W,
    value: ValueRef<'_, '_>,
    options: &WriteOptions,
) -> Result<()> {
    writer.write_all(to_string(value, options).as_bytes())?;
    Ok(())
}

fn write_value<O: Output>(writer: &mut Writer<'_, O>, value: ValueRef<'_, '_>, depth: usize) {
    match value.value() {
        Value::Number(number) => writer.write_number(number),
        Value::String(text) => writer.write_quoted_string(text),
        Value::Bool(true) => writer.write_str("true"),
        Value::Bool(false) => writer.write_str("false"),
        Value::Null => writer.write_str("null"),
        Value::Array(_) => write_array(writer, value, depth),
        Value::Object(_) => write_object(writer, value, depth),
    }
}

fn write_array<O: Output>(writer: &mut Writer<'_, O>, value: ValueRef<'_, '_>, depth: usize) {
    if value.is_empty() {
        writer.write_str("[]");
        return;
    }
    writer.write_str("[");
    writer.write_newline();
    let mut items = value.elements().peekable();
    while let Some(item) = items.next() {
        writer.write_indent(depth + 1);
        write_value(writer, item, depth + 1);
        if items.peek().is_some() {
            writer.write_str(",");
        }
        writer.write_newline();
    }
    writer.write_indent(depth);
    writer.write_str("]");
}

fn write_object<O: Output>(writer: &mut Writer<'_, O>, value: ValueRef<'_, '_>, depth: usize) {
    if value.is_empty() {
        writer.write_str("{}");
        return;
    }
    writer.write_str("{");
    writer.write_newline();
    let mut members = value.members().peekable();
    while let Some((key, item)) = members.next() {
        writer.write_indent(depth + 1);
        writer.write_key(key);
        write_value(writer, item, depth + 1);
        if members.peek().is_some() {
            writer.write_str(",");
        }
        writer.write_newline();
    }
    writer.write_indent(depth);
    writer.write_str("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NodeArena;
    use crate::{parse, WriteOptions};

    fn render(input: &str, options: &WriteOptions) -> String {
        let mut buf = input.as_bytes().to_vec();
        let mut arena = NodeArena::new();
        let doc = parse(&mut buf, &mut arena).unwrap();
        to_string(doc.root(), options)
    }

    #[rstest::rstest]
    #[case("null", "null")]
    #[case("true", "true")]
    #[case(" false ", "false")]
    #[case("-0.5", "-0.5")]
    #[case("1e2", "100")]
    #[case(r#""a\"b""#, r#""a\"b""#)]
    #[case("[]", "[]")]
    #[case("{}", "{}")]
    #[case("[[]]", "[\n\t[]\n]")]
    fn test_scalars_and_empty(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(render(input, &WriteOptions::default()), expected);
    }

    #[rstest::rstest]
    fn test_nested_layout_with_tabs() {
        let out = render(r#"{"a":[1,{"b":null}],"c":"d"}"#, &WriteOptions::default());
        assert_eq!(
            out,
            "{\n\t\"a\": [\n\t\t1,\n\t\t{\n\t\t\t\"b\": null\n\t\t}\n\t],\n\t\"c\": \"d\"\n}"
        );
    }

    #[rstest::rstest]
    fn test_empty_indent() {
        let out = render("[1,[2]]", &WriteOptions::new().with_indent(""));
        assert_eq!(out, "[\n1,\n[\n2\n]\n]");
    }

    #[rstest::rstest]
    fn test_two_pass_write() {
        let mut buf = br#"{"key": "value", "n": [true]}"#.to_vec();
        let mut arena = NodeArena::new();
        let doc = parse(&mut buf, &mut arena).unwrap();
        let options = WriteOptions::default();

        let needed = write_to_buffer(doc.root(), None, &options);
        let expected = to_string(doc.root(), &options);
        assert_eq!(needed, expected.len() + 1);

        let mut out = vec![0xFFu8; needed];
        assert_eq!(write_to_buffer(doc.root(), Some(&mut out), &options), needed);
        assert_eq!(&out[..needed - 1], expected.as_bytes());
        assert_eq!(out[needed - 1], 0);

        let mut short = vec![0xFFu8; 5];
        assert_eq!(write_to_buffer(doc.root(), Some(&mut short), &options), needed);
        assert_eq!(&short, b"{\n\t\"\0");
    }

    #[rstest::rstest]
    fn test_to_writer_and_vec() {
        let mut buf = b"[1,2]".to_vec();
        let mut arena = NodeArena::new();
        let doc = parse(&mut buf, &mut arena).unwrap();
        let options = WriteOptions::new().with_spaces(1);

        let mut sink = Vec::new();
        to_writer(&mut sink, doc.root(), &options).unwrap();
        assert_eq!(sink, to_vec(doc.root(), &options));
        assert_eq!(sink, b"[\n 1,\n 2\n]");
    }
}
