//! Project codes embedded in free-text memo fields.
//!
//! A code is seven ASCII digits starting with `2` (e.g. `2601007`). Memos come
//! straight from the accounting system, so extraction is deterministic regex
//! work: the first word-bounded match wins and anything touching a longer
//! digit or word run is ignored.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b2[0-9]{6}\b").expect("project code pattern is valid"));

/// Canonical 7-character project code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectCode(String);

impl ProjectCode {
    /// Validate a whole string as a project code (no surrounding text allowed).
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let s = raw.trim();
        let valid = s.len() == 7
            && s.starts_with('2')
            && s.bytes().all(|b| b.is_ascii_digit());
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ParseError::InvalidProjectCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProjectCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProjectCode {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProjectCode> for String {
    fn from(code: ProjectCode) -> Self {
        code.0
    }
}

/// Pull the first standalone project code out of a memo.
///
/// Returns `None` for empty text or when no word-bounded match exists;
/// `"Invoice #26010071"` yields nothing because the digit run is too long.
pub fn extract_project_code(text: &str) -> Option<ProjectCode> {
    CODE_RE
        .find(text)
        .map(|m| ProjectCode(m.as_str().to_string()))
}

/// Every distinct code in order of first appearance.
pub fn extract_all_project_codes(text: &str) -> Vec<ProjectCode> {
    let mut out: Vec<ProjectCode> = Vec::new();
    for m in CODE_RE.find_iter(text) {
        let code = ProjectCode(m.as_str().to_string());
        if !out.contains(&code) {
            out.push(code);
        }
    }
    out
}
