//! Route groups: a shared path prefix plus a shared leading handler chain.

use crate::http::context::{handler, Context, Handler};
use crate::http::engine::Engine;
use crate::routing::{join_paths, Method, RouteResult};

/// Registers routes under `prefix`, each prefixed by the group's handlers.
///
/// A group borrows the engine mutably, so groups are built one at a time
/// during startup.
pub struct RouteGroup<'e> {
    engine: &'e mut Engine,
    prefix: String,
    handlers: Vec<Handler>,
}

impl<'e> RouteGroup<'e> {
    pub(crate) fn new(engine: &'e mut Engine, prefix: String, handlers: Vec<Handler>) -> Self {
        Self {
            engine,
            prefix,
            handlers,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Add handlers to the group chain for routes registered afterwards.
    pub fn append(&mut self, middleware: Handler) -> &mut Self {
        self.handlers.push(middleware);
        self
    }

    /// A nested group: prefixes join, chains concatenate.
    pub fn group(&mut self, prefix: &str, handlers: Vec<Handler>) -> RouteGroup<'_> {
        let prefix = join_paths(&self.prefix, prefix);
        let chain = [self.handlers.clone(), handlers].concat();
        RouteGroup::new(&mut *self.engine, prefix, chain)
    }

    pub fn route<F>(&mut self, method: Method, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        let full_path = join_paths(&self.prefix, path);
        let mut chain = self.handlers.clone();
        chain.push(handler(f));
        self.engine.register(method, &full_path, chain)
    }

    pub fn get<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Get, path, f)
    }

    pub fn post<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Post, path, f)
    }

    pub fn put<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Put, path, f)
    }

    pub fn delete<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Delete, path, f)
    }

    pub fn patch<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Patch, path, f)
    }

    pub fn head<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Head, path, f)
    }

    pub fn options<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Options, path, f)
    }
}
