//! Compressed prefix tree for one HTTP method.
//!
//! # Responsibilities
//! - Insert route patterns, merging common prefixes and splitting nodes
//! - Reject duplicate patterns and ambiguous dynamic names
//! - Resolve request paths to a handler chain plus bound parameters
//!
//! # Design Decisions
//! - Nodes live in an arena; links are indices, so parent links never own
//! - Literal children are tried before the wildcard child at every level
//! - Resolution takes `&self` and never mutates, so lookups need no locking

use std::fmt::Write;
use std::sync::Arc;

use crate::routing::error::{RouteError, RouteResult};
use crate::routing::node::{parse_spans, Node, NodeId};
use crate::routing::params::Params;
use crate::routing::path::{validate_path, SEPARATOR};

const ROOT: NodeId = 0;

/// A successful resolution.
#[derive(Debug)]
pub struct Match<H> {
    /// Handler chain of the matched route, shared with the tree.
    pub handlers: Arc<[H]>,
    /// Parameters bound along the matched path.
    pub params: Params,
}

#[derive(Debug)]
pub struct Tree<H> {
    nodes: Vec<Node<H>>,
}

impl<H> Default for Tree<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Tree<H> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(SEPARATOR.to_string(), None, SEPARATOR.to_string())],
        }
    }

    /// Register `handlers` under the pattern `path`.
    pub fn insert(&mut self, path: &str, handlers: Vec<H>) -> RouteResult<()> {
        validate_path(path)?;
        if handlers.is_empty() {
            return Err(RouteError::EmptyHandlers {
                path: path.to_string(),
            });
        }
        let handlers: Arc<[H]> = handlers.into();

        let mut current = ROOT;
        let mut consumed = 0;

        loop {
            let node = &self.nodes[current];
            let shared = node.common_prefix_len(&path[consumed..], path)?;
            consumed += shared;

            if shared < node.content.len() {
                self.split(current, shared);
                if consumed < path.len() {
                    self.add_child(current, Node::new(&path[consumed..], Some(handlers), path));
                } else {
                    self.nodes[current].handlers = Some(handlers);
                }
                return Ok(());
            }

            if consumed == path.len() {
                let node = &mut self.nodes[current];
                if node.is_route() {
                    return Err(RouteError::Duplicate {
                        path: path.to_string(),
                    });
                }
                node.handlers = Some(handlers);
                return Ok(());
            }

            let next = path.as_bytes()[consumed];
            match self.child_by_first_byte(current, next) {
                Some(child) => current = child,
                None => {
                    self.add_child(current, Node::new(&path[consumed..], Some(handlers), path));
                    return Ok(());
                }
            }
        }
    }

    /// Find the route matching `path`, or `None` if nothing is registered there.
    pub fn resolve(&self, path: &str) -> Option<Match<H>> {
        self.resolve_from(ROOT, path)
    }

    fn resolve_from(&self, id: NodeId, path: &str) -> Option<Match<H>> {
        let node = &self.nodes[id];
        let (consumed, mut params) = node.match_path(path)?;

        if consumed == path.len() {
            if let Some(handlers) = node.handlers.clone() {
                return Some(Match { handlers, params });
            }
        }

        // An exhausted path can still end in a wildcard child bound to "".
        let rest = &path[consumed..];
        let next = rest.as_bytes().first().copied();
        let mut literal = None;
        let mut wildcard = None;
        for &child in &node.children {
            let candidate = &self.nodes[child];
            if next == Some(candidate.first_byte()) {
                literal = Some(child);
            } else if candidate.is_wildcard() {
                wildcard = Some(child);
            }
        }

        literal.into_iter().chain(wildcard).find_map(|child| {
            let found = self.resolve_from(child, rest)?;
            params.merge(found.params);
            Some(Match {
                handlers: found.handlers,
                params: std::mem::take(&mut params),
            })
        })
    }

    fn child_by_first_byte(&self, id: NodeId, byte: u8) -> Option<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].first_byte() == byte)
    }

    fn add_child(&mut self, parent: NodeId, mut child: Node<H>) -> NodeId {
        let id = self.nodes.len();
        child.parent = Some(parent);
        self.nodes.push(child);
        self.nodes[parent].children.push(id);
        id
    }

    /// Cut node `id` at byte `at`: the node keeps the prefix and a new child
    /// takes the remainder together with the handlers and children.
    fn split(&mut self, id: NodeId, at: usize) {
        let child_id = self.nodes.len();
        let node = &mut self.nodes[id];

        let tail = node.content.split_off(at);
        node.spans = parse_spans(&node.content);
        let mut child = Node::new(tail, node.handlers.take(), node.full_path.clone());
        child.children = std::mem::replace(&mut node.children, vec![child_id]);
        child.parent = Some(id);

        for &grandchild in &child.children {
            self.nodes[grandchild].parent = Some(child_id);
        }
        self.nodes.push(child);
    }

    /// Every registered pattern, ordered by node creation.
    pub fn routes(&self) -> Vec<String> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_route())
            .map(|(id, _)| self.pattern(id))
            .collect()
    }

    /// Rebuild the full pattern of node `id` by walking its parent links.
    fn pattern(&self, id: NodeId) -> String {
        let mut pieces = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current];
            pieces.push(node.content.as_str());
            cursor = node.parent;
        }
        pieces.iter().rev().copied().collect()
    }

    /// Indented text view of the tree; routable nodes are marked with `*`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(ROOT, 0, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = &self.nodes[id];
        let marker = if node.is_route() { " *" } else { "" };
        let _ = writeln!(out, "{}-> {}{}", "  ".repeat(depth), node.content, marker);
        for &child in &node.children {
            self.dump_node(child, depth + 1, out);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_route()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn node(&self, id: NodeId) -> &Node<H> {
        &self.nodes[id]
    }
}
