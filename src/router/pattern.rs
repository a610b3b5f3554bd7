//! Path patterns with parameterized segments.
//!
//! A pattern is a `/`-separated sequence of segments. A segment written as
//! `{name}` matches any single non-empty request segment and captures it
//! under `name`; every other segment must match literally. Segment counts
//! must agree, so `/api/documents/{id}` matches `/api/documents/42` but not
//! `/api/documents` or `/api/documents/42/meta`.

use crate::protocol::PathParams;

#[derive(Debug)]
pub struct PathPattern {
    segments: Vec<Segment>,
    literal: bool,
}

#[derive(Debug)]
enum Segment {
    Literal(String),
    Param(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(segment.to_string()),
            })
            .collect::<Vec<_>>();

        let literal = segments.iter().all(|segment| matches!(segment, Segment::Literal(_)));
        Self { segments, literal }
    }

    /// Returns true when the pattern contains no parameter segments.
    ///
    /// Literal patterns are served by the exact-match table; only
    /// parameterized ones take part in the ordered pattern scan.
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    /// Matches a request path against this pattern, capturing parameters.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::empty();
        let mut path_segments = path.split('/');

        for segment in &self.segments {
            let candidate = path_segments.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if literal != candidate {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if candidate.is_empty() {
                        return None;
                    }
                    params.insert(name.as_str(), candidate);
                }
            }
        }

        // request path must not have extra segments
        if path_segments.next().is_some() {
            return None;
        }

        Some(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_matches_itself() {
        let pattern = PathPattern::parse("/api/documents");
        assert!(pattern.is_literal());
        assert!(pattern.matches("/api/documents").is_some());
        assert!(pattern.matches("/api/documents/1").is_none());
        assert!(pattern.matches("/api").is_none());
    }

    #[test]
    fn param_segment_captures_value() {
        let pattern = PathPattern::parse("/api/documents/{id}");
        assert!(!pattern.is_literal());

        let params = pattern.matches("/api/documents/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn param_segment_rejects_empty() {
        let pattern = PathPattern::parse("/api/documents/{id}");
        assert!(pattern.matches("/api/documents/").is_none());
    }

    #[test]
    fn multiple_params() {
        let pattern = PathPattern::parse("/api/{collection}/{id}");
        let params = pattern.matches("/api/authors/7").unwrap();
        assert_eq!(params.get("collection"), Some("authors"));
        assert_eq!(params.get("id"), Some("7"));
    }

    #[test]
    fn segment_count_must_agree() {
        let pattern = PathPattern::parse("/api/{collection}");
        assert!(pattern.matches("/api/authors/7").is_none());
        assert!(pattern.matches("/api").is_none());
    }

    #[test]
    fn unterminated_brace_is_literal() {
        let pattern = PathPattern::parse("/api/{id");
        assert!(pattern.is_literal());
        assert!(pattern.matches("/api/{id").is_some());
        assert!(pattern.matches("/api/7").is_none());
    }
}
