// Copyright 2024 The DocAssert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub(crate) mod canonical;
pub mod path;

use crate::error::{Error, Result};
use indexmap::IndexMap;
use path::{Key, Path};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;

/// A JSON-like value with an extra [`Tree::Undefined`] placeholder.
///
/// `Undefined` is a value in its own right: a mapping holding
/// `"x": Undefined` differs from a mapping without `"x"`. A key that is not
/// there at all is never stored; lookups report it as `None`.
///
/// Mapping keys keep their insertion order for display. Equality ignores it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Tree {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Tree>),
    Object(IndexMap<String, Tree>),
    Undefined,
}

impl Tree {
    /// An empty mapping.
    pub fn object() -> Self {
        Tree::Object(IndexMap::new())
    }

    pub fn as_array(&self) -> Option<&Vec<Tree>> {
        match self {
            Tree::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Tree>> {
        match self {
            Tree::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Inserts `value` under `key` and returns the mapping for chaining.
    ///
    /// Only meant for mappings. Debug builds panic on anything else, release
    /// builds return it unchanged.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Tree>) -> Self {
        debug_assert!(
            matches!(self, Tree::Object(_)),
            "`Tree::with` called on a non-mapping"
        );
        if let Tree::Object(map) = &mut self {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// A copy with every mapping's keys sorted, recursively.
    pub(crate) fn sorted(&self) -> Tree {
        match self {
            Tree::Array(items) => Tree::Array(items.iter().map(Tree::sorted).collect()),
            Tree::Object(map) => {
                let mut map: IndexMap<String, Tree> = map
                    .iter()
                    .map(|(key, value)| (key.clone(), value.sorted()))
                    .collect();
                map.sort_keys();
                Tree::Object(map)
            }
            other => other.clone(),
        }
    }

    /// Converts to a [`Value`], substituting the reserved sentinel string for
    /// every [`Tree::Undefined`].
    pub fn to_json(&self) -> Value {
        match self {
            Tree::Null => Value::Null,
            Tree::Bool(b) => Value::Bool(*b),
            Tree::Number(n) => Value::Number(n.clone()),
            Tree::String(s) => Value::String(s.clone()),
            Tree::Array(items) => Value::Array(items.iter().map(Tree::to_json).collect()),
            Tree::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Tree::Undefined => Value::String(canonical::UNDEFINED_SENTINEL.to_string()),
        }
    }

    /// Reads the value at `path`.
    ///
    /// Returns `None` as soon as a segment has nothing to address: a missing
    /// key, an out-of-bounds or non-numeric index into a sequence, or any
    /// segment below a primitive.
    pub fn get(&self, path: &Path) -> Option<&Tree> {
        path.keys()
            .iter()
            .try_fold(self, |node, key| node.child(key))
    }

    /// Mutable counterpart of [`Tree::get`].
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Tree> {
        let mut node = self;
        for key in path.keys() {
            node = node.child_mut(key)?;
        }
        Some(node)
    }

    /// Writes `value` at `path`, creating missing intermediate containers.
    ///
    /// A missing or `Undefined` intermediate becomes a sequence when the next
    /// segment is an index, and a mapping otherwise. Indexing past the end of
    /// a sequence pads it with [`Tree::Undefined`]. A field segment on a
    /// sequence, or any segment below a primitive, fails with
    /// [`Error::PathConflict`].
    pub fn set(&mut self, path: &Path, value: Tree) -> Result<()> {
        let Some(last) = path.keys().last() else {
            *self = value;
            return Ok(());
        };

        let mut node = self;
        for pair in path.keys().windows(2) {
            let (key, next) = (&pair[0], &pair[1]);
            node = node
                .child_or_insert(key, next)
                .ok_or_else(|| conflict(path, key))?;
        }

        let slot = node.slot(last).ok_or_else(|| conflict(path, last))?;
        *slot = value;

        Ok(())
    }

    fn child(&self, key: &Key) -> Option<&Tree> {
        match (self, key) {
            (Tree::Object(map), key) => map.get(&*key.as_field()),
            (Tree::Array(items), Key::Idx(idx)) => items.get(*idx),
            _ => None,
        }
    }

    fn child_mut(&mut self, key: &Key) -> Option<&mut Tree> {
        match (self, key) {
            (Tree::Object(map), key) => map.get_mut(&*key.as_field()),
            (Tree::Array(items), Key::Idx(idx)) => items.get_mut(*idx),
            _ => None,
        }
    }

    /// The child at `key`, replacing a missing or `Undefined` child with an
    /// empty container shaped for `next`.
    fn child_or_insert(&mut self, key: &Key, next: &Key) -> Option<&mut Tree> {
        let child = self.slot(key)?;
        if child.is_undefined() {
            *child = match next {
                Key::Idx(_) => Tree::Array(vec![]),
                Key::Field(_) => Tree::object(),
            };
        }
        Some(child)
    }

    /// The writable position for `key`, created as `Undefined` when missing.
    fn slot(&mut self, key: &Key) -> Option<&mut Tree> {
        match (self, key) {
            (Tree::Object(map), key) => Some(
                map.entry(key.as_field().into_owned())
                    .or_insert(Tree::Undefined),
            ),
            (Tree::Array(items), Key::Idx(idx)) => {
                if *idx >= items.len() {
                    items.resize(*idx + 1, Tree::Undefined);
                }
                items.get_mut(*idx)
            }
            _ => None,
        }
    }

    fn is_undefined(&self) -> bool {
        matches!(self, Tree::Undefined)
    }

    fn write_pretty(&self, f: &mut fmt::Formatter, indent: usize) -> fmt::Result {
        match self {
            Tree::Null => write!(f, "null"),
            Tree::Bool(b) => write!(f, "{}", b),
            Tree::Number(n) => write!(f, "{}", n),
            Tree::String(s) => write_json_string(f, s),
            Tree::Undefined => write!(f, "undefined"),
            Tree::Array(items) if items.is_empty() => write!(f, "[]"),
            Tree::Array(items) => {
                writeln!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    write!(f, "{:width$}", "", width = indent + 2)?;
                    item.write_pretty(f, indent + 2)?;
                    end_entry(f, i + 1 == items.len())?;
                }
                write!(f, "{:width$}]", "", width = indent)
            }
            Tree::Object(map) if map.is_empty() => write!(f, "{{}}"),
            Tree::Object(map) => {
                writeln!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    write!(f, "{:width$}", "", width = indent + 2)?;
                    write_json_string(f, key)?;
                    write!(f, ": ")?;
                    value.write_pretty(f, indent + 2)?;
                    end_entry(f, i + 1 == map.len())?;
                }
                write!(f, "{:width$}}}", "", width = indent)
            }
        }
    }
}

fn conflict(path: &Path, key: &Key) -> Error {
    Error::PathConflict {
        path: path.to_string(),
        segment: key.to_string(),
    }
}

fn write_json_string(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

fn end_entry(f: &mut fmt::Formatter, last: bool) -> fmt::Result {
    if last {
        writeln!(f)
    } else {
        writeln!(f, ",")
    }
}

/// Pretty-prints with two-space indentation; `Undefined` shows as `undefined`.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_pretty(f, 0)
    }
}

/// Writes plain JSON in key insertion order, with `Undefined` as the
/// sentinel string.
impl Serialize for Tree {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Tree::from)
    }
}

impl From<Value> for Tree {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Tree::Null,
            Value::Bool(b) => Tree::Bool(b),
            Value::Number(n) => Tree::Number(n),
            Value::String(s) => Tree::String(s),
            Value::Array(items) => Tree::Array(items.into_iter().map(Tree::from).collect()),
            Value::Object(map) => Tree::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Tree::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for Tree {
    fn from(value: &Value) -> Self {
        Tree::from(value.clone())
    }
}

impl From<bool> for Tree {
    fn from(b: bool) -> Self {
        Tree::Bool(b)
    }
}

impl From<i64> for Tree {
    fn from(n: i64) -> Self {
        Tree::Number(n.into())
    }
}

impl From<u64> for Tree {
    fn from(n: u64) -> Self {
        Tree::Number(n.into())
    }
}

/// Non-finite floats have no JSON number form and become `Null`.
impl From<f64> for Tree {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Tree::Null, Tree::Number)
    }
}

impl From<&str> for Tree {
    fn from(s: &str) -> Self {
        Tree::String(s.to_string())
    }
}

impl From<String> for Tree {
    fn from(s: String) -> Self {
        Tree::String(s)
    }
}

impl<T: Into<Tree>> From<Vec<T>> for Tree {
    fn from(items: Vec<T>) -> Self {
        Tree::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Tree>> FromIterator<T> for Tree {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Tree::Array(iter.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Tree>> FromIterator<(K, V)> for Tree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tree::Object(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
