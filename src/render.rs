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

use crate::json_diff;
use crate::tree::Tree;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Text produced by [`LineDiff`] when both sides print identically.
pub const NO_VISUAL_DIFFERENCE: &str = "Compared values have no visual difference.";

/// Turns the normalized `before` and `after` values into readable text.
///
/// Returning `None` is allowed; the sink then receives an empty string.
///
/// Any `Fn(&Tree, &Tree) -> Option<String>` closure is a renderer:
///
/// ```
/// use sameish::{Sameish, Tree};
///
/// let (before, after) = (Tree::from(1i64), Tree::from(2i64));
/// let mut seen = String::new();
/// Sameish::new(&before, &after)
///     .log_diff(true)
///     .with_renderer(|b: &Tree, a: &Tree| Some(format!("{} -> {}", b, a)))
///     .with_sink(|diff: &str| seen.push_str(diff))
///     .compare()
///     .unwrap();
/// assert_eq!(seen, "1 -> 2");
/// ```
pub trait DiffRenderer {
    fn render(&self, before: &Tree, after: &Tree) -> Option<String>;
}

impl<F> DiffRenderer for F
where
    F: Fn(&Tree, &Tree) -> Option<String>,
{
    fn render(&self, before: &Tree, after: &Tree) -> Option<String> {
        self(before, after)
    }
}

/// Receives the rendered diff.
pub trait LogSink {
    fn log(&mut self, diff: &str);
}

impl<F> LogSink for F
where
    F: FnMut(&str),
{
    fn log(&mut self, diff: &str) {
        self(diff)
    }
}

/// Prints the diff to standard output. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn log(&mut self, diff: &str) {
        println!("{}", diff);
    }
}

/// Emits the diff as a `tracing` event at `INFO` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&mut self, diff: &str) {
        tracing::info!(target: "sameish::diff", "{}", diff);
    }
}

/// Line-oriented diff of the pretty-printed values. The default renderer.
///
/// Mapping keys are printed sorted so key order never shows up as a change.
/// Lines only in `after` start with `+ `, lines only in `before` with `- `,
/// shared lines with two spaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineDiff;

impl DiffRenderer for LineDiff {
    fn render(&self, before: &Tree, after: &Tree) -> Option<String> {
        let old = format!("{}\n", before.sorted());
        let new = format!("{}\n", after.sorted());

        if old == new {
            return Some(NO_VISUAL_DIFFERENCE.to_string());
        }

        let mut out = String::new();
        for change in TextDiff::from_lines(&old, &new).iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "- ",
                ChangeTag::Insert => "+ ",
                ChangeTag::Equal => "  ",
            };
            out.push_str(sign);
            out.push_str(change.value());
        }

        Some(out.trim_end_matches('\n').to_string())
    }
}

/// Lists each differing path. Renders nothing when the values are equal.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathReport;

impl DiffRenderer for PathReport {
    fn render(&self, before: &Tree, after: &Tree) -> Option<String> {
        let differences = json_diff::diff(before, after);
        if differences.is_empty() {
            return None;
        }

        Some(
            differences
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<String>>()
                .join("\n"),
        )
    }
}

/// Both sides as one pretty JSON document, `{ "before": …, "after": … }`,
/// with mapping keys in insertion order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Snapshot;

#[derive(Serialize)]
struct Sides<'a> {
    before: &'a Tree,
    after: &'a Tree,
}

impl DiffRenderer for Snapshot {
    fn render(&self, before: &Tree, after: &Tree) -> Option<String> {
        serde_json::to_string_pretty(&Sides { before, after }).ok()
    }
}
