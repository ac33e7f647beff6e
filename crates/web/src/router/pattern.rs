//! Path patterns made of literal segments and `{name}` parameter segments.

use std::fmt;

use burrow_http::protocol::Params;
use thiserror::Error;

/// A pattern that cannot be registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("pattern '{pattern}' must start with '/'")]
    MissingLeadingSlash { pattern: String },

    #[error("pattern '{pattern}' has unbalanced braces in segment '{segment}'")]
    UnbalancedBrace { pattern: String, segment: String },

    #[error("pattern '{pattern}' has a parameter without name")]
    EmptyParamName { pattern: String },
}

impl RouteError {
    fn missing_leading_slash(pattern: &str) -> Self {
        Self::MissingLeadingSlash { pattern: pattern.to_string() }
    }

    fn unbalanced_brace(pattern: &str, segment: &str) -> Self {
        Self::UnbalancedBrace { pattern: pattern.to_string(), segment: segment.to_string() }
    }

    fn empty_param_name(pattern: &str) -> Self {
        Self::EmptyParamName { pattern: pattern.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

impl Segment {
    fn parse(pattern: &str, segment: &str) -> Result<Self, RouteError> {
        match (segment.strip_prefix('{'), segment.ends_with('}')) {
            (None, false) => Ok(Segment::Literal(segment.to_string())),
            (Some(rest), true) => {
                let name = &rest[..rest.len() - 1];
                if name.is_empty() {
                    return Err(RouteError::empty_param_name(pattern));
                }
                if name.contains(['{', '}']) {
                    return Err(RouteError::unbalanced_brace(pattern, segment));
                }
                Ok(Segment::Param(name.to_string()))
            }
            _ => Err(RouteError::unbalanced_brace(pattern, segment)),
        }
    }
}

/// A parsed route pattern or subrouter prefix.
///
/// `/` is a single empty literal segment, so it matches the path `/` and nothing else.
#[derive(Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(RouteError::missing_leading_slash(pattern));
        };

        let segments = rest.split('/').map(|segment| Segment::parse(pattern, segment)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { raw: pattern.to_string(), segments })
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Matches the whole path, returning the captured parameters.
    pub fn capture(&self, segments: &[&str]) -> Option<Params> {
        if segments.len() != self.segments.len() {
            return None;
        }
        self.capture_segments(segments)
    }

    /// Matches the leading segments of the path, returning the captured parameters and the
    /// segments left over.
    pub fn capture_prefix<'s, 'a>(&self, segments: &'s [&'a str]) -> Option<(Params, &'s [&'a str])> {
        if segments.len() < self.segments.len() {
            return None;
        }
        let (head, rest) = segments.split_at(self.segments.len());
        self.capture_segments(head).map(|params| (params, rest))
    }

    fn capture_segments(&self, segments: &[&str]) -> Option<Params> {
        let mut params = Params::new();
        for (expected, actual) in self.segments.iter().zip(segments) {
            match expected {
                Segment::Literal(literal) if literal == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.insert(name.as_str(), *actual),
            }
        }
        Some(params)
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern").field(&self.raw).finish()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
