//! Pattern lists used for ignore-type filtering and intent/action matching.
//!
//! A pattern is either a literal (case-insensitive full match) or a regular expression.
//! Lists are compiled once into a [`PatternSet`] and evaluated in order; the first match wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Serialized form of a pattern, as found in config files.
///
/// A plain JSON string is a literal; `{"regex": "..."}` is a regular expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Literal(String),
    Regex { regex: String },
}

impl PatternSpec {
    pub fn literal(s: impl Into<String>) -> Self {
        PatternSpec::Literal(s.into())
    }

    pub fn regex(s: impl Into<String>) -> Self {
        PatternSpec::Regex { regex: s.into() }
    }

    /// Compile into a matcher. Literals never fail.
    pub fn compile(&self) -> Result<Pattern, PatternError> {
        match self {
            PatternSpec::Literal(s) => Ok(Pattern::Literal(s.clone())),
            PatternSpec::Regex { regex } => Regex::new(regex)
                .map(Pattern::Regex)
                .map_err(|source| PatternError::InvalidRegex {
                    pattern: regex.clone(),
                    source,
                }),
        }
    }
}

impl From<&str> for PatternSpec {
    fn from(s: &str) -> Self {
        PatternSpec::Literal(s.to_string())
    }
}

impl From<String> for PatternSpec {
    fn from(s: String) -> Self {
        PatternSpec::Literal(s)
    }
}

/// A compiled matcher.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Equal to the value, ignoring ASCII case. No substring or regex semantics.
    Literal(String),
    /// Matches anywhere in the value unless the expression anchors itself.
    Regex(Regex),
}

impl Pattern {
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Pattern::Literal(s) => s.eq_ignore_ascii_case(value),
            Pattern::Regex(re) => re.is_match(value),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(s) => write!(f, "{:?}", s),
            Pattern::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Ordered list of compiled patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile specs in order; fails on the first invalid regex.
    pub fn compile<I, S>(specs: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<PatternSpec>,
    {
        let patterns = specs
            .into_iter()
            .map(|s| s.into().compile())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Single literal pattern.
    pub fn literal(s: impl Into<String>) -> Self {
        Self {
            patterns: vec![Pattern::Literal(s.into())],
        }
    }

    /// First pattern matching `value`, in list order.
    pub fn first_match(&self, value: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.is_match(value))
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.first_match(value).is_some()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_is_full_match_ignoring_case() {
        let set = PatternSet::literal("flight");
        assert!(set.is_match("flight"));
        assert!(set.is_match("FLIGHT"));
        assert!(!set.is_match("book_flight"));
        assert!(!set.is_match("flights"));
    }

    #[test]
    fn literal_is_not_interpreted_as_regex() {
        let set = PatternSet::literal("a.c");
        assert!(set.is_match("a.c"));
        assert!(!set.is_match("abc"));
    }

    #[test]
    fn regex_matches_substring_unless_anchored() {
        let set = PatternSet::compile([PatternSpec::regex("flight")]).unwrap();
        assert!(set.is_match("book_flight"));

        let anchored = PatternSet::compile([PatternSpec::regex("^flight$")]).unwrap();
        assert!(!anchored.is_match("book_flight"));
        assert!(anchored.is_match("flight"));
    }

    #[test]
    fn invalid_regex_fails_at_compile_time() {
        let err = PatternSet::compile([PatternSpec::literal("ok"), PatternSpec::regex("(unclosed")])
            .unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn first_match_respects_order() {
        let set = PatternSet::compile([
            PatternSpec::regex("^direct"),
            PatternSpec::literal("direct_message"),
        ])
        .unwrap();
        let hit = set.first_match("direct_message").unwrap();
        assert!(matches!(hit, Pattern::Regex(_)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn spec_deserializes_string_or_regex_object() {
        let specs: Vec<PatternSpec> =
            serde_json::from_str(r#"["ambient", {"regex": "^bot_"}]"#).unwrap();
        assert_eq!(
            specs,
            vec![PatternSpec::literal("ambient"), PatternSpec::regex("^bot_")]
        );
    }

    #[test]
    fn compile_accepts_plain_strs() {
        let set = PatternSet::compile(["greeting", "farewell"]).unwrap();
        assert!(set.is_match("Farewell"));
        assert!(!set.is_empty());
    }
}
