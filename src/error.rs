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

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while preparing a comparison.
///
/// Equality itself never fails; both variants come from the configured paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A configured path is empty or has an empty segment.
    #[error("invalid path \"{path}\": {reason}")]
    InvalidPath { path: String, reason: &'static str },
    /// A projected write hit a node that cannot host the next segment.
    #[error("path conflict at \"{path}\": segment \"{segment}\" cannot be written")]
    PathConflict { path: String, segment: String },
}

impl Error {
    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        Error::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::invalid_path("a..b", "empty segment");
        assert_eq!(err.to_string(), "invalid path \"a..b\": empty segment");

        let err = Error::PathConflict {
            path: "a.b".to_string(),
            segment: "b".to_string(),
        };
        assert!(err.to_string().starts_with("path conflict at \"a.b\""));
    }
}
