use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::arena::{Arena, Handle};
use crate::num::number::as_integral;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Number,
    String,
    Bool,
    Null,
    Array,
    Object,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Number => "number",
            Tag::String => "string",
            Tag::Bool => "bool",
            Tag::Null => "null",
            Tag::Array => "array",
            Tag::Object => "object",
        }
    }
}

/// A parsed value. Strings borrow from the parsed buffer, containers hold the
/// handle of their first node (`None` when empty).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Number(f64),
    String(&'a str),
    Bool(bool),
    Null,
    Array(Option<Handle>),
    Object(Option<Handle>),
}

impl<'a> Value<'a> {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Number(_) => Tag::Number,
            Value::String(_) => Tag::String,
            Value::Bool(_) => Tag::Bool,
            Value::Null => Tag::Null,
            Value::Array(_) => Tag::Array,
            Value::Object(_) => Tag::Object,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(flag) => Some(flag),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// First node of a container.
    pub fn head(&self) -> Option<Handle> {
        match self {
            Value::Array(head) | Value::Object(head) => *head,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<'a> {
    pub key: Option<&'a str>,
    pub value: Value<'a>,
    pub next: Option<Handle>,
}

impl<'a> Node<'a> {
    pub(crate) fn new(key: Option<&'a str>, value: Value<'a>) -> Self {
        Self {
            key,
            value,
            next: None,
        }
    }
}

pub type NodeArena<'a> = Arena<Node<'a>>;

pub struct Nodes<'n, 'a> {
    arena: &'n NodeArena<'a>,
    cursor: Option<Handle>,
}

impl<'n, 'a> Nodes<'n, 'a> {
    pub fn new(arena: &'n NodeArena<'a>, head: Option<Handle>) -> Self {
        Self {
            arena,
            cursor: head,
        }
    }
}

impl<'n, 'a> Iterator for Nodes<'n, 'a> {
    type Item = &'n Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.arena.get(self.cursor?)?;
        self.cursor = node.next;
        Some(node)
    }
}

/// A value paired with the arena holding its nodes, for traversal.
#[derive(Clone, Copy)]
pub struct ValueRef<'n, 'a> {
    value: Value<'a>,
    arena: &'n NodeArena<'a>,
}

impl<'n, 'a> ValueRef<'n, 'a> {
    pub fn new(value: Value<'a>, arena: &'n NodeArena<'a>) -> Self {
        Self { value, arena }
    }

    pub fn value(&self) -> Value<'a> {
        self.value
    }

    pub fn tag(&self) -> Tag {
        self.value.tag()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value.as_str()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_array(&self) -> bool {
        matches!(self.value, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.value, Value::Object(_))
    }

    /// Nodes of a container in source order; empty for scalars.
    pub fn iter(&self) -> Nodes<'n, 'a> {
        Nodes::new(self.arena, self.value.head())
    }

    pub fn elements(&self) -> impl Iterator<Item = ValueRef<'n, 'a>> + 'n {
        let arena = self.arena;
        self.iter().map(move |node| ValueRef::new(node.value, arena))
    }

    pub fn members(&self) -> impl Iterator<Item = (&'a str, ValueRef<'n, 'a>)> + 'n {
        let arena = self.arena;
        self.iter()
            .map(move |node| (node.key.unwrap_or_default(), ValueRef::new(node.value, arena)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.head().is_none()
    }

    /// First member named `key`. Objects may repeat keys; later duplicates are
    /// only reachable through [`ValueRef::members`].
    pub fn get(&self, key: &str) -> Option<ValueRef<'n, 'a>> {
        if !self.is_object() {
            return None;
        }
        self.members()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    pub fn at(&self, index: usize) -> Option<ValueRef<'n, 'a>> {
        if !self.is_array() {
            return None;
        }
        self.elements().nth(index)
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        match self.value {
            Value::Number(number) => number_to_json(number),
            Value::String(text) => serde_json::Value::String(text.to_string()),
            Value::Bool(flag) => serde_json::Value::Bool(flag),
            Value::Null => serde_json::Value::Null,
            Value::Array(_) => {
                serde_json::Value::Array(self.elements().map(|item| item.to_json_value()).collect())
            }
            Value::Object(_) => {
                let map = self
                    .members()
                    .map(|(key, value)| (key.to_string(), value.to_json_value()))
                    .collect();
                serde_json::Value::Object(map)
            }
        }
    }
}

fn number_to_json(number: f64) -> serde_json::Value {
    if let Some(integer) = as_integral(number) {
        return serde_json::Value::from(integer);
    }
    serde_json::Number::from_f64(number)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl<'n, 'a> From<ValueRef<'n, 'a>> for serde_json::Value {
    fn from(value: ValueRef<'n, 'a>) -> Self {
        value.to_json_value()
    }
}

impl fmt::Debug for ValueRef<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Number(number) => write!(f, "{number}"),
            Value::String(text) => write!(f, "{text:?}"),
            Value::Bool(flag) => write!(f, "{flag}"),
            Value::Null => f.write_str("null"),
            Value::Array(_) => f.debug_list().entries(self.elements()).finish(),
            Value::Object(_) => f.debug_map().entries(self.members()).finish(),
        }
    }
}

impl Serialize for ValueRef<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Number(number) => match as_integral(number) {
                Some(integer) => serializer.serialize_i64(integer),
                None => serializer.serialize_f64(number),
            },
            Value::String(text) => serializer.serialize_str(text),
            Value::Bool(flag) => serializer.serialize_bool(flag),
            Value::Null => serializer.serialize_unit(),
            Value::Array(_) => {
                let mut seq = serializer.serialize_seq(None)?;
                for item in self.elements() {
                    seq.serialize_element(&item)?;
                }
                seq.end()
            }
            Value::Object(_) => {
                let mut map = serializer.serialize_map(None)?;
                for (key, value) in self.members() {
                    map.serialize_entry(key, &value)?;
                }
                map.end()
            }
        }
    }
}
