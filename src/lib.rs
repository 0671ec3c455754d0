pub mod arena;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod num;
pub mod options;
pub mod text;
pub mod value;

use std::io::Write;

pub use crate::arena::{Arena, ArenaStats, Handle, Span};
pub use crate::decode::{parse, parse_with_options, validate, Document};
pub use crate::error::{Error, ErrorKind, Location, ParseError};
pub use crate::options::{ParseOptions, WriteOptions};
pub use crate::value::{Node, NodeArena, Nodes, Tag, Value, ValueRef};

pub type Result<T> = std::result::Result<T, Error>;

pub fn to_string(value: ValueRef<'_, '_>) -> String {
    to_string_with_options(value, &WriteOptions::default())
}

pub fn to_string_with_options(value: ValueRef<'_, '_>, options: &WriteOptions) -> String {
    encode::to_string(value, options)
}

pub fn to_vec(value: ValueRef<'_, '_>) -> Vec<u8> {
    to_vec_with_options(value, &WriteOptions::default())
}

pub fn to_vec_with_options(value: ValueRef<'_, '_>, options: &WriteOptions) -> Vec<u8> {
    encode::to_vec(value, options)
}

pub fn to_writer<W: Write>(writer: W, value: ValueRef<'_, '_>) -> Result<()> {
    to_writer_with_options(writer, value, &WriteOptions::default())
}

pub fn to_writer_with_options<W: Write>(
    writer: W,
    value: ValueRef<'_, '_>,
    options: &WriteOptions,
) -> Result<()> {
    encode::to_writer(writer, value, options)
}

pub fn write_to_buffer(
    value: ValueRef<'_, '_>,
    buffer: Option<&mut [u8]>,
    options: &WriteOptions,
) -> usize {
    encode::write_to_buffer(value, buffer, options)
}

/// Parse a copy of `input` and convert the result to a `serde_json::Value`.
pub fn decode_to_value(input: &[u8]) -> Result<serde_json::Value> {
    decode_to_value_with_options(input, &ParseOptions::default())
}

pub fn decode_to_value_with_options(
    input: &[u8],
    options: &ParseOptions,
) -> Result<serde_json::Value> {
    let mut buffer = input.to_vec();
    let mut arena = NodeArena::new();
    let document = parse_with_options(&mut buffer, &mut arena, options)?;
    Ok(document.to_json_value())
}
