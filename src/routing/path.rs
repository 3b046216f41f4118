//! Route path syntax.
//!
//! # Rules
//! - A route starts with `/`; `/` alone is the root route
//! - Segments are never empty (no `//`), one trailing `/` is tolerated
//! - A segment holds at most one `:` and the name after it is non-empty
//! - `:` may follow a literal prefix within the segment (`prefix:key`)

use crate::routing::error::{RouteError, RouteResult};

/// Path separator.
pub const SEPARATOR: char = '/';

/// Dynamic segment marker.
pub const MARKER: char = ':';

/// Check that `path` is a well-formed route pattern.
pub fn validate_path(path: &str) -> RouteResult<()> {
    let malformed = |reason| RouteError::Malformed {
        path: path.to_string(),
        reason,
    };

    if !path.starts_with(SEPARATOR) {
        return Err(malformed("must begin with '/'"));
    }
    if !path.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(malformed("only visible ASCII characters are allowed"));
    }
    if path == "/" {
        return Ok(());
    }

    let body = path[1..].strip_suffix(SEPARATOR).unwrap_or(&path[1..]);
    for segment in body.split(SEPARATOR) {
        validate_segment(segment).map_err(malformed)?;
    }
    Ok(())
}

fn validate_segment(segment: &str) -> Result<(), &'static str> {
    if segment.is_empty() {
        return Err("empty segment");
    }
    match (segment.find(MARKER), segment.rfind(MARKER)) {
        (Some(first), Some(last)) if first != last => {
            Err("more than one ':' in a segment")
        }
        (Some(first), _) if first == segment.len() - 1 => {
            Err("':' must be followed by a parameter name")
        }
        _ => Ok(()),
    }
}

/// Join a group prefix and a relative route into an absolute path.
///
/// Duplicate separators collapse and a trailing separator is dropped, so the
/// result of joining two valid pieces is itself a valid route.
pub fn join_paths(base: &str, relative: &str) -> String {
    let mut joined = String::with_capacity(base.len() + relative.len() + 1);
    for segment in base
        .split(SEPARATOR)
        .chain(relative.split(SEPARATOR))
        .filter(|s| !s.is_empty())
    {
        joined.push(SEPARATOR);
        joined.push_str(segment);
    }
    if joined.is_empty() {
        joined.push(SEPARATOR);
    }
    joined
}

/// The dynamic name starting at `rest`, i.e. everything up to the next `/`.
pub(crate) fn name_before_separator(rest: &str) -> &str {
    match rest.find(SEPARATOR) {
        Some(end) => &rest[..end],
        None => rest,
    }
}
