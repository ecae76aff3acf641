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

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::fmt;

const SEPARATOR: char = '.';

/// A dotted address into a [`Tree`](crate::Tree), such as `user.tags.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<'a> {
    keys: Vec<Key<'a>>,
}

/// One segment of a [`Path`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key<'a> {
    /// A canonical non-negative integer. Indexes sequences, and names the
    /// key with the same text on mappings.
    Idx(usize),
    Field(&'a str),
}

/// Parses a dotted path borrowed from `self`.
pub trait DottedPath {
    fn dotted_path(&self) -> Result<Path<'_>>;
}

impl DottedPath for str {
    fn dotted_path(&self) -> Result<Path<'_>> {
        Path::parse(self)
    }
}

impl<'a> Key<'a> {
    /// The key used when this segment addresses a mapping.
    pub fn as_field(&self) -> Cow<'a, str> {
        match self {
            Key::Idx(idx) => Cow::Owned(idx.to_string()),
            Key::Field(field) => Cow::Borrowed(*field),
        }
    }

    fn parse_token(token: &'a str) -> Key<'a> {
        // "01" or "+1" stay mapping keys; a sequence index has one spelling
        let canonical = token == "0" || !token.starts_with('0');
        if canonical && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(idx) = token.parse::<usize>() {
                return Key::Idx(idx);
            }
        }

        Key::Field(token)
    }
}

impl<'a> fmt::Display for Key<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Idx(idx) => write!(f, "{}", idx),
            Key::Field(key) => write!(f, "{}", key),
        }
    }
}

impl<'a> Path<'a> {
    /// Parses `raw` into its segments.
    ///
    /// Fails with [`Error::InvalidPath`] for the empty string and for any
    /// empty segment (leading, trailing or doubled separators).
    pub fn parse(raw: &'a str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::invalid_path(raw, "path is empty"));
        }

        let mut keys = Vec::new();
        for token in raw.split(SEPARATOR) {
            if token.is_empty() {
                return Err(Error::invalid_path(raw, "path contains an empty segment"));
            }
            keys.push(Key::parse_token(token));
        }

        Ok(Path { keys })
    }

    pub(crate) fn root() -> Self {
        Path { keys: vec![] }
    }

    pub(crate) fn append(&self, next: Key<'a>) -> Path<'a> {
        let mut keys = self.keys.clone();
        keys.push(next);
        Path { keys }
    }

    pub fn keys(&self) -> &[Key<'a>] {
        &self.keys
    }
}

impl<'a> fmt::Display for Path<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.keys.is_empty() {
            return write!(f, "(root)");
        }

        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_dotted_path() {
        let path = "a.b.c".dotted_path().unwrap();
        assert_eq!(
            path.keys(),
            &[Key::Field("a"), Key::Field("b"), Key::Field("c")]
        );

        let path = "users.0.tags.12".dotted_path().unwrap();
        assert_eq!(
            path.keys(),
            &[
                Key::Field("users"),
                Key::Idx(0),
                Key::Field("tags"),
                Key::Idx(12),
            ]
        );

        let path = "a.01.-1.1e3".dotted_path().unwrap();
        assert_eq!(
            path.keys(),
            &[
                Key::Field("a"),
                Key::Field("01"),
                Key::Field("-1"),
                Key::Field("1e3"),
            ]
        );

        let path = "with space. padded ".dotted_path().unwrap();
        assert_eq!(
            path.keys(),
            &[Key::Field("with space"), Key::Field(" padded ")]
        );
    }

    #[test]
    fn test_path_validation() {
        assert!("a".dotted_path().is_ok());
        assert!("0".dotted_path().is_ok());

        for raw in ["", ".", "a.", ".a", "a..b", "a.b."] {
            match raw.dotted_path() {
                Err(Error::InvalidPath { path, .. }) => assert_eq!(path, raw),
                other => panic!("expected InvalidPath for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!("a.0.b".dotted_path().unwrap().to_string(), "a.0.b");
        assert_eq!(Path::root().to_string(), "(root)");
        let path = Path::root().append(Key::Field("x"));
        assert_eq!(path.append(Key::Idx(3)).to_string(), "x.3");
    }

    #[test]
    fn test_as_field() {
        assert_eq!(Key::Idx(7).as_field(), "7");
        assert_eq!(Key::Field("name").as_field(), "name");
    }

    #[test]
    fn test_huge_index_is_a_field() {
        let raw = "a.99999999999999999999999999";
        let path = raw.dotted_path().unwrap();
        assert_eq!(path.keys()[1], Key::Field("99999999999999999999999999"));
    }
}
