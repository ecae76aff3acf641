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

use crate::error::Result;
use crate::tree::{canonical, path::Path, Tree};
use serde_json::Number;
use tracing::{debug, trace};

/// How should numbers be compared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum NumericMode {
    /// Different numeric types aren't considered equal: `1` differs from `1.0`.
    #[default]
    Strict,
    /// All numbers are converted to float during normalization.
    ///
    /// Integers above 2^53 lose precision.
    AssumeFloat,
}

/// Produces the comparison-ready form of one side.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Normalizer<'p, 'a> {
    compare_paths: &'p [Path<'a>],
    ignore_order_paths: &'p [Path<'a>],
    numeric_mode: NumericMode,
}

impl<'p, 'a> Normalizer<'p, 'a> {
    pub(crate) fn new(
        compare_paths: &'p [Path<'a>],
        ignore_order_paths: &'p [Path<'a>],
        numeric_mode: NumericMode,
    ) -> Self {
        Self {
            compare_paths,
            ignore_order_paths,
            numeric_mode,
        }
    }

    /// Returns a fresh tree; `input` is never modified or aliased.
    pub(crate) fn normalize(&self, input: &Tree) -> Result<Tree> {
        let mut output = if self.compare_paths.is_empty() {
            input.clone()
        } else {
            self.project(input)?
        };

        if self.numeric_mode == NumericMode::AssumeFloat {
            output = assume_float(output);
        }

        for path in self.ignore_order_paths {
            sort_unordered(&mut output, path);
        }

        Ok(output)
    }

    /// Builds a sparse tree holding only the values found at the compare paths.
    fn project(&self, input: &Tree) -> Result<Tree> {
        let mut output = Tree::object();

        for path in self.compare_paths {
            match input.get(path) {
                Some(value) => {
                    trace!(%path, "projecting value");
                    output.set(path, value.clone())?;
                }
                None => trace!(%path, "nothing to project"),
            }
        }

        Ok(output)
    }
}

fn sort_unordered(output: &mut Tree, path: &Path) {
    match output.get_mut(path) {
        Some(Tree::Array(items)) => {
            // stable: canonically equal elements keep their relative order
            items.sort_by_cached_key(canonical::stringify);
            debug!(%path, len = items.len(), "sorted order-insensitive sequence");
        }
        Some(_) => trace!(%path, "order-insensitive path is not a sequence"),
        None => trace!(%path, "order-insensitive path is absent"),
    }
}

fn assume_float(tree: Tree) -> Tree {
    match tree {
        Tree::Number(n) => Tree::Number(
            n.as_f64()
                .and_then(Number::from_f64)
                .unwrap_or(n),
        ),
        Tree::Array(items) => Tree::Array(items.into_iter().map(assume_float).collect()),
        Tree::Object(map) => Tree::Object(
            map.into_iter()
                .map(|(key, value)| (key, assume_float(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use crate::tree::path::DottedPath;
    use serde_json::json;

    fn paths(raw: &[&'static str]) -> Vec<Path<'static>> {
        raw.iter().map(|p| p.dotted_path().unwrap()).collect()
    }

    fn normalize(input: &Tree, compare: &[&'static str], ignore_order: &[&'static str]) -> Tree {
        let compare = paths(compare);
        let ignore_order = paths(ignore_order);
        Normalizer::new(&compare, &ignore_order, NumericMode::Strict)
            .normalize(input)
            .unwrap()
    }

    #[test]
    fn test_full_copy() {
        let input = Tree::from(json!({ "a": [1, { "b": 2 }] })).with("u", Tree::Undefined);
        let output = normalize(&input, &[], &[]);
        assert_eq!(output, input);
    }

    #[test]
    fn test_projection() {
        let input = Tree::from(json!({
            "user": { "name": "Bob", "age": 30, "tags": ["x"] },
            "system": { "version": "1.0.0" },
        }));
        let output = normalize(&input, &["user.name", "system.version"], &[]);
        assert_eq!(
            output,
            Tree::from(json!({ "user": { "name": "Bob" }, "system": { "version": "1.0.0" } }))
        );
    }

    #[test]
    fn test_projection_skips_absent_values() {
        let input = Tree::from(json!({ "a": 1 }));
        let output = normalize(&input, &["b", "c.d", "a.x"], &[]);
        assert_eq!(output, Tree::object());
    }

    #[test]
    fn test_projection_keeps_undefined() {
        let input = Tree::object().with("x", Tree::Undefined).with("y", 1i64);
        let output = normalize(&input, &["x"], &[]);
        assert_eq!(output, Tree::object().with("x", Tree::Undefined));
    }

    #[test]
    fn test_projection_through_sequences() {
        let input = Tree::from(json!({ "items": [{ "id": 1, "x": 0 }, { "id": 2, "x": 0 }] }));
        let output = normalize(&input, &["items.1.id"], &[]);
        let items = vec![Tree::Undefined, Tree::from(json!({ "id": 2 }))];
        assert_eq!(output, Tree::object().with("items", items));

        let output = normalize(&input, &["items", "items.0.id"], &[]);
        assert_eq!(output, input);
    }

    #[test]
    fn test_sorting() {
        let input = Tree::from(json!({ "items": [3, 1, 2], "kept": [3, 1, 2] }));
        let output = normalize(&input, &[], &["items"]);
        assert_eq!(
            output,
            Tree::from(json!({ "items": [1, 2, 3], "kept": [3, 1, 2] }))
        );
    }

    #[test]
    fn test_sorting_uses_canonical_keys() {
        // canonical text order, not numeric order
        let input = Tree::from(json!({ "n": [10, 9, 100] }));
        let output = normalize(&input, &[], &["n"]);
        assert_eq!(output, Tree::from(json!({ "n": [10, 100, 9] })));

        let input = Tree::from(json!({ "users": [{ "id": 2, "a": 0 }, { "a": 0, "id": 1 }] }));
        let output = normalize(&input, &[], &["users"]);
        assert_eq!(
            output,
            Tree::from(json!({ "users": [{ "a": 0, "id": 1 }, { "a": 0, "id": 2 }] }))
        );
    }

    #[test]
    fn test_sorting_projected_elements() {
        let input = Tree::from(json!({ "items": [2, 1, 3], "noise": true }));
        let output = normalize(&input, &["items.0", "items.1"], &["items"]);
        assert_eq!(output, Tree::from(json!({ "items": [1, 2] })));
    }

    #[test]
    fn test_sorting_non_sequences_is_a_no_op() {
        let input = Tree::from(json!({ "value": "not-an-array", "nested": { "n": 1 } }));
        let output = normalize(&input, &[], &["value", "missing", "nested.n.deeper"]);
        assert_eq!(output, input);
    }

    #[test]
    fn test_sorting_after_projection() {
        let input = Tree::from(json!({ "data": { "tags": ["c", "a", "b"], "other": 1 } }));
        let output = normalize(&input, &["data.tags"], &["data.tags"]);
        assert_eq!(
            output,
            Tree::from(json!({ "data": { "tags": ["a", "b", "c"] } }))
        );
    }

    #[test]
    fn test_input_is_untouched() {
        let input = Tree::from(json!({ "items": [2, 1] }));
        let snapshot = input.clone();
        let output = normalize(&input, &[], &["items"]);
        assert_eq!(input, snapshot);
        assert_ne!(output, input);
    }

    #[test]
    fn test_assume_float() {
        let compare = paths(&[]);
        let ignore = paths(&["n"]);
        let input = Tree::from(json!({ "n": [2, 1.0], "m": 3 }));
        let output = Normalizer::new(&compare, &ignore, NumericMode::AssumeFloat)
            .normalize(&input)
            .unwrap();
        assert_eq!(output, Tree::from(json!({ "n": [1.0, 2.0], "m": 3.0 })));
    }

    #[test]
    fn test_conflicting_projection() {
        let compare = paths(&["a", "a.0.b"]);
        let input = Tree::from(json!({ "a": [{ "b": 1 }] }));
        assert!(Normalizer::new(&compare, &[], NumericMode::Strict)
            .normalize(&input)
            .is_ok());

        // "a" is projected as a string, then "a.x" has to be written through it
        let mut output = Tree::object().with("a", "text");
        let err = output
            .set(&"a.x".dotted_path().unwrap(), Tree::Null)
            .unwrap_err();
        assert!(matches!(err, Error::PathConflict { .. }));
    }
}
