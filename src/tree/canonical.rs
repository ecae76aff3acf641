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

//! Deterministic string form of a [`Tree`], used as the sort key for
//! order-insensitive sequences.

use super::Tree;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Stands in for [`Tree::Undefined`] wherever a JSON form is required, so an
/// `Undefined` element never collapses into `null` or a dropped key.
///
/// A real string with this exact text shares `Undefined`'s canonical key.
/// Sorting then leaves the two in their input order, so a sequence holding
/// both is only order-insensitive up to that pair. The collision is accepted.
pub(crate) const UNDEFINED_SENTINEL: &str =
    "__undefined_sameish_06d0ef49-2162-4fa7-abb2-9cae431c185f__";

/// Serializes a tree with mapping keys in byte-wise sorted order and
/// `Undefined` replaced by [`UNDEFINED_SENTINEL`].
pub(crate) struct Canonical<'a> {
    tree: &'a Tree,
}

impl<'a> Canonical<'a> {
    pub(crate) fn new(tree: &'a Tree) -> Self {
        Self { tree }
    }
}

impl<'a> Serialize for Canonical<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.tree {
            Tree::Null => serializer.serialize_unit(),
            Tree::Bool(b) => serializer.serialize_bool(*b),
            Tree::Number(n) => n.serialize(serializer),
            Tree::String(s) => serializer.serialize_str(s),
            Tree::Undefined => serializer.serialize_str(UNDEFINED_SENTINEL),
            Tree::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&Canonical::new(item))?;
                }
                seq.end()
            }
            Tree::Object(entries) => {
                let mut sorted: Vec<_> = entries.iter().collect();
                sorted.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

                let mut map = serializer.serialize_map(Some(sorted.len()))?;
                for (key, value) in sorted {
                    map.serialize_entry(key, &Canonical::new(value))?;
                }
                map.end()
            }
        }
    }
}

/// Canonical compact JSON text of `tree`.
///
/// Two trees have the same key exactly when they are equal, treating the
/// sentinel string and `Undefined` as one value.
pub(crate) fn stringify(tree: &Tree) -> String {
    // string keys and finite numbers only, so serde_json cannot reject it
    serde_json::to_string(&Canonical::new(tree)).unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sorted_keys() {
        let a = Tree::from(json!({ "b": 1, "a": { "d": [3, 2], "c": null } }));
        assert_eq!(stringify(&a), r#"{"a":{"c":null,"d":[3,2]},"b":1}"#);
    }

    #[test]
    fn test_key_order_is_irrelevant() {
        let a: Tree = serde_json::from_str(r#"{"x": 1, "y": [true, "s"]}"#).unwrap();
        let b: Tree = serde_json::from_str(r#"{"y": [true, "s"], "x": 1}"#).unwrap();
        assert_eq!(stringify(&a), stringify(&b));
    }

    #[test]
    fn test_sequences_keep_order() {
        let a = Tree::from(json!([1, 2]));
        let b = Tree::from(json!([2, 1]));
        assert_ne!(stringify(&a), stringify(&b));
    }

    #[test]
    fn test_undefined_is_not_null() {
        let undefined = Tree::from(vec![Tree::Undefined]);
        let null = Tree::from(vec![Tree::Null]);
        assert_ne!(stringify(&undefined), stringify(&null));
        assert_eq!(
            stringify(&undefined),
            format!("[\"{}\"]", UNDEFINED_SENTINEL)
        );

        let with_key = Tree::object().with("x", Tree::Undefined);
        assert_ne!(stringify(&with_key), stringify(&Tree::object()));
    }

    #[test]
    fn test_sentinel_string_shares_the_undefined_key() {
        let sentinel = Tree::from(UNDEFINED_SENTINEL);
        assert_eq!(stringify(&sentinel), stringify(&Tree::Undefined));
        assert_ne!(sentinel, Tree::Undefined);
    }

    #[test]
    fn test_numbers_keep_their_representation() {
        assert_eq!(stringify(&Tree::from(1i64)), "1");
        assert_eq!(stringify(&Tree::from(1.0)), "1.0");
        assert_eq!(stringify(&Tree::from(-0.5)), "-0.5");
    }
}
