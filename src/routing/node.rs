//! Trie vertex and the per-node matching primitives.
//!
//! A node's `content` is a fragment of one or more registered paths. It may
//! embed `:name` tokens; their positions are cached in `spans` and are always
//! re-derived from `content` after the content changes.

use std::sync::Arc;

use crate::routing::error::{RouteError, RouteResult};
use crate::routing::params::Params;
use crate::routing::path::{name_before_separator, MARKER, SEPARATOR};

/// Byte range of one `:name` token, colon through last name byte (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// The parameter name (without the colon).
    fn name<'a>(&self, content: &'a str) -> &'a str {
        &content[self.start + 1..=self.end]
    }
}

/// Index of a node inside its tree's arena.
pub type NodeId = usize;

#[derive(Debug)]
pub struct Node<H> {
    pub(crate) content: String,
    pub(crate) spans: Vec<Span>,
    pub(crate) handlers: Option<Arc<[H]>>,
    pub(crate) children: Vec<NodeId>,
    /// Non-owning back link, only used to rebuild patterns for diagnostics.
    pub(crate) parent: Option<NodeId>,
    /// The route that created this node, quoted in conflict errors.
    pub(crate) full_path: String,
}

impl<H> Node<H> {
    pub(crate) fn new(
        content: impl Into<String>,
        handlers: Option<Arc<[H]>>,
        full_path: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let spans = parse_spans(&content);
        Self {
            content,
            spans,
            handlers,
            children: Vec::new(),
            parent: None,
            full_path: full_path.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn content(&self) -> &str {
        &self.content
    }

    #[cfg(test)]
    pub(crate) fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub(crate) fn is_route(&self) -> bool {
        self.handlers.is_some()
    }

    pub(crate) fn first_byte(&self) -> u8 {
        self.content.as_bytes()[0]
    }

    pub(crate) fn is_wildcard(&self) -> bool {
        self.first_byte() == MARKER as u8
    }

    /// Length of the prefix `rest` shares with this node's content.
    ///
    /// A `:name` token present in both is consumed as one unit, and the two
    /// names must agree; otherwise the insertion is ambiguous.
    pub(crate) fn common_prefix_len(&self, rest: &str, full_path: &str) -> RouteResult<usize> {
        let content = self.content.as_bytes();
        let route = rest.as_bytes();
        let mut i = 0;

        while i < content.len() && i < route.len() {
            if content[i] != route[i] {
                break;
            }
            if content[i] == MARKER as u8 {
                let existing = name_before_separator(&self.content[i + 1..]);
                let incoming = name_before_separator(&rest[i + 1..]);
                if existing != incoming {
                    return Err(RouteError::Conflict {
                        new_key: format!("{MARKER}{incoming}"),
                        new_path: full_path.to_string(),
                        existing_key: format!("{MARKER}{existing}"),
                        existing_path: self.full_path.clone(),
                    });
                }
                i += existing.len();
            }
            i += 1;
        }

        Ok(i)
    }

    /// Match this node against the start of `path`.
    ///
    /// Returns the number of bytes consumed and the parameters bound by this
    /// node's dynamic spans, or `None` if the node does not match.
    pub(crate) fn match_path(&self, path: &str) -> Option<(usize, Params)> {
        let Some(first) = self.spans.first() else {
            return path
                .starts_with(self.content.as_str())
                .then(|| (self.content.len(), Params::new()));
        };

        if !path.starts_with(&self.content[..first.start]) {
            return None;
        }

        let mut params = Params::new();
        let mut cursor = first.start;
        for (idx, span) in self.spans.iter().enumerate() {
            let gap_end = self
                .spans
                .get(idx + 1)
                .map_or(self.content.len(), |next| next.start);
            let gap = &self.content[span.end + 1..gap_end];
            let rest = &path[cursor..];

            let value_len = if gap.is_empty() {
                rest.find(SEPARATOR).unwrap_or(rest.len())
            } else {
                let at = rest.find(gap)?;
                // values never cross a segment boundary
                if rest[..at].contains(SEPARATOR) {
                    return None;
                }
                at
            };

            params.insert(span.name(&self.content), &rest[..value_len]);
            cursor += value_len + gap.len();
        }

        Some((cursor, params))
    }
}

/// Locate every `:name` token in `content`.
///
/// A token runs from the colon to the byte before the next `/`, or to the end
/// of the content.
pub fn parse_spans(content: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (idx, byte) in content.bytes().enumerate() {
        if byte == MARKER as u8 {
            open = Some(idx);
        } else if byte == SEPARATOR as u8 {
            if let Some(start) = open.take() {
                spans.push(Span { start, end: idx - 1 });
            }
        }
    }
    if let Some(start) = open {
        spans.push(Span {
            start,
            end: content.len() - 1,
        });
    }

    spans
}
