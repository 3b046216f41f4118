//! Per-method route table.
//!
//! # Responsibilities
//! - Map each supported HTTP method to its own tree
//! - Register routes and look them up by (method, path)
//! - Report which methods accept a path (for 405 handling by callers)
//!
//! # Design Decisions
//! - Closed method enumeration with a fixed-size array of trees
//! - Methods never share a tree, so cross-method ambiguity cannot arise

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::routing::error::RouteResult;
use crate::routing::tree::{Match, Tree};

/// HTTP methods the router accepts routes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Head,
        Method::Options,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error for method names outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for Method {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnsupportedMethod(s.to_string()))
    }
}

impl TryFrom<&axum::http::Method> for Method {
    type Error = UnsupportedMethod;

    /// Request methods are case-sensitive, unlike config values.
    fn try_from(method: &axum::http::Method) -> Result<Self, Self::Error> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == method.as_str())
            .ok_or_else(|| UnsupportedMethod(method.to_string()))
    }
}

/// One tree per method.
#[derive(Debug)]
pub struct RouteTable<H> {
    trees: [Tree<H>; Method::COUNT],
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self {
            trees: std::array::from_fn(|_| Tree::new()),
        }
    }

    pub fn register(&mut self, method: Method, path: &str, handlers: Vec<H>) -> RouteResult<()> {
        self.trees[method.index()].insert(path, handlers)?;
        tracing::debug!(method = %method, path = %path, "Route registered");
        Ok(())
    }

    pub fn lookup(&self, method: Method, path: &str) -> Option<Match<H>> {
        self.tree(method).resolve(path)
    }

    /// Methods whose tree resolves `path`.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|&m| self.tree(m).resolve(path).is_some())
            .collect()
    }

    pub fn tree(&self, method: Method) -> &Tree<H> {
        &self.trees[method.index()]
    }

    /// All registered `(method, pattern)` pairs.
    pub fn routes(&self) -> Vec<(Method, String)> {
        Method::ALL
            .into_iter()
            .flat_map(|m| self.tree(m).routes().into_iter().map(move |p| (m, p)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.trees.iter().map(Tree::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
