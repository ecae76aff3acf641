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

#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

use crate::normalize::Normalizer;
use tracing::debug;

mod error;
mod json_diff;
mod normalize;
mod render;
mod tree;

pub use error::{Error, Result};
pub use normalize::NumericMode;
pub use render::{
    DiffRenderer, LineDiff, LogSink, PathReport, Snapshot, StdoutSink, TracingSink,
    NO_VISUAL_DIFFERENCE,
};
pub use tree::path::{DottedPath, Key, Path};
pub use tree::Tree;

/// Builder for a near-equality check.
///
/// Both sides are normalized the same way: optionally projected onto the
/// compare paths, then every order-insensitive sequence is sorted by its
/// canonical form. The normalized values are then compared structurally.
///
/// # Examples
///
/// ```
/// use sameish::{Sameish, Tree};
/// use serde_json::json;
///
/// let before = Tree::from(json!({ "user": { "name": "Bob", "tags": ["a", "b"] }, "v": 1 }));
/// let after = Tree::from(json!({ "user": { "name": "Bob", "tags": ["b", "a"] }, "v": 2 }));
///
/// let same = Sameish::new(&before, &after)
///     .compare_path("user.name")
///     .compare_path("user.tags")
///     .ignore_order_path("user.tags")
///     .compare()
///     .unwrap();
/// assert!(same);
/// ```
pub struct Sameish<'a> {
    before: &'a Tree,
    after: &'a Tree,
    compare_paths: Vec<&'a str>,
    ignore_order_paths: Vec<&'a str>,
    numeric_mode: NumericMode,
    log_diff: bool,
    sink: Box<dyn LogSink + 'a>,
    renderer: Box<dyn DiffRenderer + 'a>,
}

impl<'a> Sameish<'a> {
    /// Constructs a builder comparing `before` with `after`.
    ///
    /// Without further configuration the whole trees are compared, array
    /// order matters and no diff is rendered.
    pub fn new(before: &'a Tree, after: &'a Tree) -> Self {
        Self {
            before,
            after,
            compare_paths: vec![],
            ignore_order_paths: vec![],
            numeric_mode: NumericMode::default(),
            log_diff: false,
            sink: Box::new(StdoutSink),
            renderer: Box::new(LineDiff),
        }
    }

    /// Restricts the comparison to `path`. May be called repeatedly; once any
    /// path is given, everything outside the listed paths is ignored.
    ///
    /// ```
    /// use sameish::{Sameish, Tree};
    /// use serde_json::json;
    ///
    /// let before = Tree::from(json!({ "a": 1, "b": 2 }));
    /// let after = Tree::from(json!({ "a": 1, "b": 999 }));
    /// assert!(Sameish::new(&before, &after).compare_path("a").compare().unwrap());
    /// ```
    pub fn compare_path(mut self, path: &'a str) -> Self {
        self.compare_paths.push(path);
        self
    }

    pub fn compare_paths<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.compare_paths.extend(paths);
        self
    }

    /// Treats the sequence at `path`, if there is one, as an unordered multiset.
    ///
    /// ```
    /// use sameish::{Sameish, Tree};
    /// use serde_json::json;
    ///
    /// let before = Tree::from(json!({ "items": [1, 2, 3] }));
    /// let after = Tree::from(json!({ "items": [3, 1, 2] }));
    /// assert!(Sameish::new(&before, &after).ignore_order_path("items").compare().unwrap());
    /// ```
    pub fn ignore_order_path(mut self, path: &'a str) -> Self {
        self.ignore_order_paths.push(path);
        self
    }

    pub fn ignore_order_paths<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.ignore_order_paths.extend(paths);
        self
    }

    /// Changes how numbers are compared. Defaults to [`NumericMode::Strict`].
    pub fn numeric_mode(mut self, numeric_mode: NumericMode) -> Self {
        self.numeric_mode = numeric_mode;
        self
    }

    /// Renders a diff of the normalized values and hands it to the sink.
    pub fn log_diff(mut self, log_diff: bool) -> Self {
        self.log_diff = log_diff;
        self
    }

    /// Replaces the default [`StdoutSink`].
    pub fn with_sink(mut self, sink: impl LogSink + 'a) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replaces the default [`LineDiff`] renderer.
    pub fn with_renderer(mut self, renderer: impl DiffRenderer + 'a) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Runs the comparison.
    ///
    /// Every configured path is parsed before either side is touched, so a
    /// malformed path fails with [`Error::InvalidPath`] without rendering
    /// anything. [`Error::PathConflict`] surfaces if a projected write cannot
    /// be placed.
    pub fn compare(mut self) -> Result<bool> {
        let compare_paths = parse_all(&self.compare_paths)?;
        let ignore_order_paths = parse_all(&self.ignore_order_paths)?;

        let normalizer = Normalizer::new(&compare_paths, &ignore_order_paths, self.numeric_mode);
        let before = normalizer.normalize(self.before)?;
        let after = normalizer.normalize(self.after)?;

        if self.log_diff {
            let rendered = self.renderer.render(&before, &after);
            self.sink.log(rendered.as_deref().unwrap_or(""));
        }

        let same = before == after;
        debug!(
            same,
            compare_paths = compare_paths.len(),
            ignore_order_paths = ignore_order_paths.len(),
            "compared normalized values"
        );

        Ok(same)
    }
}

fn parse_all<'a>(raw: &[&'a str]) -> Result<Vec<Path<'a>>> {
    raw.iter().copied().map(Path::parse).collect()
}
