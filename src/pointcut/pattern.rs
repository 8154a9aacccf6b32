//! Name and namespace patterns used by pointcuts.

use std::fmt;

use super::PointcutError;
use crate::joinpoint::PATH_SEPARATOR;

/// Glob over a single name. `*` matches any run of characters.
///
/// Matching rules:
/// - `*` matches every name
/// - `*Service*` matches "DataService", "ServiceLocator"
/// - `retrieve_*` matches "retrieve_data"
/// - no `*` means exact match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern(String);

impl NamePattern {
    pub fn parse(pattern: &str) -> Result<Self, PointcutError> {
        if pattern.trim().is_empty() {
            return Err(PointcutError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }
        Ok(Self(pattern.to_string()))
    }

    pub fn matches(&self, name: &str) -> bool {
        glob_matches(&self.0, name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single segment of a namespace pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `**` - zero or more segments.
    AnyDepth,
    /// Glob over exactly one segment (`*` alone matches any segment).
    Name(String),
}

/// `::`-separated pattern over an operation's namespace.
///
/// Matching rules:
/// - `app::data` matches exactly "app::data"
/// - `app::*` matches "app::data", "app::business" but not "app" or "app::data::v2"
/// - `app::**` matches "app" and everything below it
/// - `app::data*` matches "app::data", "app::database"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacePattern {
    source: String,
    segments: Vec<Segment>,
}

impl NamespacePattern {
    pub fn parse(pattern: &str) -> Result<Self, PointcutError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(PointcutError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }

        let mut segments = Vec::new();
        for raw in trimmed.split(PATH_SEPARATOR) {
            let segment = raw.trim();
            if segment.is_empty() {
                return Err(PointcutError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: "empty namespace segment".to_string(),
                });
            }
            if segment == "**" {
                // Collapse runs of `**`, they match the same thing as one.
                if segments.last() != Some(&Segment::AnyDepth) {
                    segments.push(Segment::AnyDepth);
                }
            } else {
                segments.push(Segment::Name(segment.to_string()));
            }
        }

        Ok(Self {
            source: trimmed.to_string(),
            segments,
        })
    }

    pub fn matches(&self, namespace: &str) -> bool {
        let parts: Vec<&str> = if namespace.is_empty() {
            Vec::new()
        } else {
            namespace.split(PATH_SEPARATOR).collect()
        };
        segments_match(&self.segments, &parts)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for NamespacePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn segments_match(pattern: &[Segment], parts: &[&str]) -> bool {
    match pattern.split_first() {
        None => parts.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=parts.len()).any(|skip| segments_match(rest, &parts[skip..]))
        }
        Some((Segment::Name(glob), rest)) => match parts.split_first() {
            Some((part, remaining)) => glob_matches(glob, part) && segments_match(rest, remaining),
            None => false,
        },
    }
}

/// Match `text` against a glob where `*` matches any run of characters.
fn glob_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last `*` seen and the text index it was tried against.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
