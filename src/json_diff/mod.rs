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

use crate::tree::path::{Key, Path};
use crate::tree::Tree;
use std::{collections::BTreeSet, fmt};

/// Walks both trees and collects every path where they disagree.
///
/// The result is empty exactly when `before == after`. Paths are visited in
/// sorted key and ascending index order so the output is deterministic.
pub(crate) fn diff<'a>(before: &'a Tree, after: &'a Tree) -> Vec<Difference<'a>> {
    let mut acc = vec![];
    diff_with(before, after, Path::root(), &mut acc);
    acc
}

fn diff_with<'a>(before: &'a Tree, after: &'a Tree, path: Path<'a>, acc: &mut Vec<Difference<'a>>) {
    let mut folder = DiffFolder { after, path, acc };

    fold_tree(before, &mut folder);
}

#[derive(Debug)]
struct DiffFolder<'a, 'b> {
    after: &'a Tree,
    path: Path<'a>,
    acc: &'b mut Vec<Difference<'a>>,
}

macro_rules! direct_compare {
    ($name:ident) => {
        fn $name(&mut self, before: &'a Tree) {
            if self.after != before {
                self.push(Some(before), Some(self.after), self.path.clone());
            }
        }
    };
}

impl<'a, 'b> DiffFolder<'a, 'b> {
    direct_compare!(on_null);
    direct_compare!(on_bool);
    direct_compare!(on_number);
    direct_compare!(on_string);
    direct_compare!(on_undefined);

    fn on_array(&mut self, before: &'a Tree, items: &'a [Tree]) {
        let after: &'a Tree = self.after;
        let Some(after) = after.as_array() else {
            self.push(Some(before), Some(self.after), self.path.clone());
            return;
        };

        for idx in 0..items.len().max(after.len()) {
            let path = self.path.append(Key::Idx(idx));
            self.compare_entry(items.get(idx), after.get(idx), path);
        }
    }

    fn on_object(&mut self, before: &'a Tree) {
        let after: &'a Tree = self.after;
        let (Some(entries), Some(after)) = (before.as_object(), after.as_object()) else {
            self.push(Some(before), Some(self.after), self.path.clone());
            return;
        };

        let all_keys = entries.keys().chain(after.keys()).collect::<BTreeSet<_>>();
        for key in all_keys {
            let path = self.path.append(Key::Field(key));
            self.compare_entry(entries.get(key), after.get(key), path);
        }
    }

    fn compare_entry(&mut self, before: Option<&'a Tree>, after: Option<&'a Tree>, path: Path<'a>) {
        match (before, after) {
            (Some(before), Some(after)) => diff_with(before, after, path, self.acc),
            (None, None) => unreachable!("at least one side holds the entry"),
            (before, after) => self.push(before, after, path),
        }
    }

    fn push(&mut self, before: Option<&'a Tree>, after: Option<&'a Tree>, path: Path<'a>) {
        self.acc.push(Difference {
            path,
            before,
            after,
        });
    }
}

/// One disagreement between the normalized `before` and `after` trees.
#[derive(Debug, PartialEq)]
pub(crate) struct Difference<'a> {
    path: Path<'a>,
    before: Option<&'a Tree>,
    after: Option<&'a Tree>,
}

impl<'a> Difference<'a> {
    #[cfg(test)]
    pub(crate) fn path(&self) -> String {
        self.path.to_string()
    }
}

impl<'a> fmt::Display for Difference<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.before, &self.after) {
            (Some(before), Some(after)) => {
                writeln!(f, "values at path \"{}\" are not equal:", self.path)?;
                writeln!(f, "    before:")?;
                writeln!(f, "{}", indent(before, 8))?;
                writeln!(f, "    after:")?;
                write!(f, "{}", indent(after, 8))?;
            }
            (None, Some(_)) => {
                write!(f, "value at path \"{}\" is missing from before", self.path)?;
            }
            (Some(_), None) => {
                write!(f, "value at path \"{}\" is missing from after", self.path)?;
            }
            (None, None) => unreachable!("can't both be missing"),
        }

        Ok(())
    }
}

fn indent(tree: &Tree, level: usize) -> String {
    tree.to_string()
        .lines()
        .map(|line| format!("{:level$}{}", "", line, level = level))
        .collect::<Vec<_>>()
        .join("\n")
}

fn fold_tree<'a>(tree: &'a Tree, folder: &mut DiffFolder<'a, '_>) {
    match tree {
        Tree::Null => folder.on_null(tree),
        Tree::Bool(_) => folder.on_bool(tree),
        Tree::Number(_) => folder.on_number(tree),
        Tree::String(_) => folder.on_string(tree),
        Tree::Undefined => folder.on_undefined(tree),
        Tree::Array(items) => folder.on_array(tree, items),
        Tree::Object(_) => folder.on_object(tree),
    }
}
