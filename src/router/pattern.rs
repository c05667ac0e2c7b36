//! Path Patterns
//!
//! History-mode path patterns: static segments, `:param` segments and a
//! trailing catch-all `:name(.*)*`.

use std::borrow::Cow;
use std::collections::HashMap;

use super::RouterError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A parsed route pattern such as `/project/:id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

const CATCH_ALL_SUFFIX: &str = "(.*)*";

impl PathPattern {
    /// Parse a pattern. Patterns must be absolute; a catch-all may only be
    /// the last segment.
    pub fn parse(pattern: &str) -> Result<Self, RouterError> {
        let invalid = |reason: &str| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix(':') {
                Some(rest) => match rest.strip_suffix(CATCH_ALL_SUFFIX) {
                    Some(name) => {
                        if i + 1 != parts.len() {
                            return Err(invalid("catch-all must be the last segment"));
                        }
                        Segment::CatchAll(param_name(name).ok_or_else(|| invalid("bad parameter name"))?)
                    }
                    None => Segment::Param(param_name(rest).ok_or_else(|| invalid("bad parameter name"))?),
                },
                None => Segment::Static(part.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this pattern matches every path
    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::CatchAll(_)])
    }

    /// Match a path (without query or fragment). Returns the decoded
    /// parameters on success.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts = split_path(path);
        let mut params = HashMap::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(expected) => {
                    let part = parts.get(i)?;
                    if part.is_empty() || !part.eq_ignore_ascii_case(expected) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let part = parts.get(i).filter(|p| !p.is_empty())?;
                    params.insert(name.clone(), decode(part));
                }
                Segment::CatchAll(name) => {
                    let rest = parts.get(i..).unwrap_or_default();
                    let value = rest.iter().map(|p| decode(p)).collect::<Vec<_>>().join("/");
                    params.insert(name.clone(), value);
                    return Some(params);
                }
            }
        }

        if parts.len() == self.segments.len() {
            Some(params)
        } else {
            None
        }
    }

    /// Build a concrete path from parameters. Returns `None` when a
    /// required parameter is missing.
    pub fn build(&self, params: &HashMap<String, String>) -> Option<String> {
        let mut path = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Static(s) => {
                    path.push('/');
                    path.push_str(s);
                }
                Segment::Param(name) => {
                    let value = params.get(name).filter(|v| !v.is_empty())?;
                    path.push('/');
                    path.push_str(&urlencoding::encode(value));
                }
                Segment::CatchAll(name) => {
                    if let Some(value) = params.get(name).filter(|v| !v.is_empty()) {
                        path.push('/');
                        path.push_str(value.trim_start_matches('/'));
                    }
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        Some(path)
    }
}

/// Split a path into segments. Only the leading slash and a single trailing
/// slash are dropped; any other empty segment is kept so that it fails to match.
fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

fn param_name(name: &str) -> Option<String> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then(|| name.to_string())
}

fn decode(part: &str) -> String {
    urlencoding::decode(part)
        .unwrap_or(Cow::Borrowed(part))
        .into_owned()
}

/// Strip the query string and fragment from a location
pub fn path_only(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_matches_only_root() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("").is_some());
        assert!(pattern.matches("/history").is_none());
    }

    #[test]
    fn test_param_segment() {
        let pattern = PathPattern::parse("/project/:id").unwrap();

        let params = pattern.matches("/project/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        let params = pattern.matches("/project/a%20b/").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("a b"));

        assert!(pattern.matches("/project").is_none());
        assert!(pattern.matches("/project/1/2").is_none());
    }

    #[test]
    fn test_empty_segments_do_not_match() {
        let project = PathPattern::parse("/project/:id").unwrap();
        assert!(project.matches("/project//7").is_none());
        assert!(project.matches("/project/7//").is_none());
        assert!(project.matches("/project//").is_none());

        let history = PathPattern::parse("/history").unwrap();
        assert!(history.matches("//history").is_none());
        assert!(history.matches("/history//").is_none());

        let root = PathPattern::parse("/").unwrap();
        assert!(root.matches("//").is_none());
        assert!(root.matches("///").is_none());
    }

    #[test]
    fn test_static_is_case_insensitive() {
        let pattern = PathPattern::parse("/history").unwrap();
        assert!(pattern.matches("/History").is_some());
    }

    #[test]
    fn test_catch_all() {
        let pattern = PathPattern::parse("/:pathMatch(.*)*").unwrap();
        assert!(pattern.is_catch_all());

        let params = pattern.matches("/no/such/page").unwrap();
        assert_eq!(params.get("pathMatch").map(String::as_str), Some("no/such/page"));
        assert!(pattern.matches("/").is_some());
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(PathPattern::parse("project").is_err());
        assert!(PathPattern::parse("/:rest(.*)*/tail").is_err());
        assert!(PathPattern::parse("/project/:").is_err());
    }

    #[test]
    fn test_build() {
        let pattern = PathPattern::parse("/project/:id").unwrap();
        let mut params = HashMap::new();
        assert_eq!(pattern.build(&params), None);

        params.insert("id".to_string(), "7".to_string());
        assert_eq!(pattern.build(&params).as_deref(), Some("/project/7"));

        assert_eq!(PathPattern::parse("/").unwrap().build(&params).as_deref(), Some("/"));
    }

    #[test]
    fn test_path_only() {
        assert_eq!(path_only("/history?page=2#top"), "/history");
        assert_eq!(path_only("/project/1#notes"), "/project/1");
        assert_eq!(path_only("/"), "/");
    }
}
